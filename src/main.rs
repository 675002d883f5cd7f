use clap::{Parser, Subcommand};
use simple_thumb::config::{self, ThumbConfig};
use simple_thumb::imaging::{FormatTag, Image, ImageBackend, RustBackend};
use simple_thumb::output;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "simple-thumb")]
#[command(about = "Thumbnail images, fix their EXIF orientation, save or stream them")]
#[command(long_about = "\
Thumbnail images, fix their EXIF orientation, save or stream them

Supported formats: BMP, GIF, JPEG, PNG, WBMP, WebP. The input format is
detected from file content, never from the extension.

  simple-thumb info photo.jpg
  simple-thumb thumbnail photo.jpg thumbs/ --max 200
  simple-thumb orient photo.jpg upright.jpg
  simple-thumb display photo.jpg --format webp > response.txt

Run 'simple-thumb gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Output format override shared by the writing commands.
#[derive(clap::Args, Clone)]
struct FormatArgs {
    /// Output format: bmp, gif, jpg, png, wbmp or webp (default: keep source format)
    #[arg(long)]
    format: Option<FormatTag>,
}

#[derive(Subcommand)]
enum Command {
    /// Show dimensions, format and EXIF orientation of an image
    Info { file: PathBuf },
    /// Write a bounded, upright copy of an image
    Thumbnail {
        file: PathBuf,
        /// Output file, or a directory to keep the source file name
        output: PathBuf,
        /// Bound on the longer side in pixels [default: thumbnail.max_size]
        #[arg(long)]
        max: Option<u32>,
        #[command(flatten)]
        format: FormatArgs,
        /// Skip EXIF orientation
        #[arg(long)]
        no_orient: bool,
    },
    /// Write a copy with the EXIF orientation applied
    Orient {
        file: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Write a CGI-style response (headers, blank line, image) to stdout
    Display {
        file: PathBuf,
        /// Bound on the longer side in pixels [default: thumbnail.max_size]
        #[arg(long)]
        max: Option<u32>,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;
    let backend = config.backend();

    match cli.command {
        Command::Info { file } => {
            let probe = backend.probe(&file)?;
            let orientation = backend.read_orientation(&file);
            output::print_info(&file, &probe, &orientation);
        }
        Command::Thumbnail {
            file,
            output: target,
            max,
            format,
            no_orient,
        } => {
            let max_size = max.unwrap_or(config.thumbnail.max_size);
            let auto_orient = config.thumbnail.auto_orient && !no_orient;
            let mut thumb = prepare(&backend, &config, &file, Some(max_size), auto_orient)?;
            select_format(&mut thumb, &config, format.format);
            let written = thumb.save(&backend, output_path(&file, &target))?;
            output::print_written(&file, &written, &thumb);
        }
        Command::Orient {
            file,
            output: target,
            format,
        } => {
            let mut upright = prepare(&backend, &config, &file, None, true)?;
            select_format(&mut upright, &config, format.format);
            let written = upright.save(&backend, output_path(&file, &target))?;
            output::print_written(&file, &written, &upright);
        }
        Command::Display { file, max, format } => {
            let max_size = max.unwrap_or(config.thumbnail.max_size);
            let mut thumb = prepare(
                &backend,
                &config,
                &file,
                Some(max_size),
                config.thumbnail.auto_orient,
            )?;
            select_format(&mut thumb, &config, format.format);
            let stdout = std::io::stdout();
            thumb.display_with(&backend, &config.temp_files(), stdout.lock())?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `file`, orient it if asked, and bound it to `max_size` if given.
fn prepare(
    backend: &RustBackend,
    config: &ThumbConfig,
    file: &Path,
    max_size: Option<u32>,
    orient: bool,
) -> Result<Image, Box<dyn std::error::Error>> {
    let mut image = Image::load(backend, file)?;
    if orient {
        image = image.apply_exif_orientation(backend)?;
    }
    if let Some(max_size) = max_size {
        image = image.thumbnail(backend, max_size)?;
    }
    tracing::debug!(
        file = %file.display(),
        width = image.width(),
        height = image.height(),
        filter = %config.thumbnail.filter,
        "prepared image"
    );
    Ok(image)
}

/// A directory target keeps the input's file name. Derived handles have no
/// source path of their own, so the name is taken from the command line.
fn output_path(file: &Path, target: &Path) -> PathBuf {
    match file.file_name() {
        Some(name) if target.is_dir() => target.join(name),
        _ => target.to_path_buf(),
    }
}

/// The command-line format wins over the config file; otherwise the image
/// keeps the format it was loaded with.
fn select_format(image: &mut Image, config: &ThumbConfig, cli_format: Option<FormatTag>) {
    if let Some(format) = cli_format.or(config.output_format()) {
        image.set_format(format);
    }
}

/// Send `tracing` events to stderr, keeping stdout free for `display`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
