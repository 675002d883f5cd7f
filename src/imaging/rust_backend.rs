//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Detect format | `image::guess_format` + WBMP header check |
//! | Probe size | `image::ImageReader::into_dimensions` / WBMP header |
//! | Decode (BMP, GIF, JPEG, PNG, WebP) | `image` crate decoders |
//! | Decode / encode WBMP | custom [`wbmp`](super::wbmp) codec |
//! | Resample | `DynamicImage::resize_exact` with the configured [`Filter`] |
//! | Flip / rotate | `DynamicImage::{fliph, flipv, rotate90, rotate180, rotate270}` |
//! | Encode JPEG | `JpegEncoder` at the configured [`Quality`] |
//! | Encode WebP | `WebPEncoder::new_lossless` (the only WebP encoder `image` ships) |
//! | EXIF orientation | `kamadak-exif` |

use super::backend::{Dimensions, ImageBackend, ImageError, Probe, ensure_allocatable};
use super::format::{self, FormatTag};
use super::orientation::{ExifOrientation, Orientation, Transform};
use super::params::{Filter, Quality};
use super::wbmp;
use image::codecs::{bmp::BmpEncoder, gif::GifEncoder, jpeg::JpegEncoder, png::PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Enough leading bytes for every magic number and a WBMP header.
const HEADER_PROBE_LEN: u64 = 32;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend {
    filter: Filter,
    quality: Quality,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

/// Open a source file, mapping every failure to `NotFound`.
fn open_source(path: &Path) -> Result<File, ImageError> {
    if !path.is_file() {
        return Err(ImageError::NotFound(path.to_path_buf()));
    }
    File::open(path).map_err(|_| ImageError::NotFound(path.to_path_buf()))
}

fn read_header(path: &Path) -> Result<Vec<u8>, ImageError> {
    let mut header = Vec::with_capacity(HEADER_PROBE_LEN as usize);
    open_source(path)?
        .take(HEADER_PROBE_LEN)
        .read_to_end(&mut header)?;
    Ok(header)
}

fn decode_error(path: &Path, reason: impl ToString) -> ImageError {
    ImageError::Decode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn decode_wbmp(path: &Path) -> Result<DynamicImage, ImageError> {
    let data = std::fs::read(path)?;
    wbmp::decode(&data)
        .map(DynamicImage::ImageLuma8)
        .map_err(|e| decode_error(path, e))
}

fn decode_with(path: &Path, codec: image::ImageFormat) -> Result<DynamicImage, ImageError> {
    let reader = BufReader::new(open_source(path)?);
    ImageReader::with_format(reader, codec)
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Write `bitmap` through one of the `image` crate encoders, converting to a
/// color type the encoder accepts first.
fn encode_to<W: Write>(
    bitmap: &DynamicImage,
    format: FormatTag,
    quality: Quality,
    writer: &mut W,
) -> Result<(), ImageError> {
    let result = match format {
        FormatTag::Bmp => DynamicImage::ImageRgba8(bitmap.to_rgba8())
            .write_with_encoder(BmpEncoder::new(writer)),
        FormatTag::Gif => {
            let mut encoder = GifEncoder::new(writer);
            encoder.encode_frame(image::Frame::new(bitmap.to_rgba8()))
        }
        FormatTag::Jpeg => DynamicImage::ImageRgb8(bitmap.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(writer, quality.value() as u8)),
        FormatTag::Png => match bitmap {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgba8(bitmap.to_rgba8())
                    .write_with_encoder(PngEncoder::new(writer))
            }
            _ => bitmap.write_with_encoder(PngEncoder::new(writer)),
        },
        FormatTag::Webp => DynamicImage::ImageRgba8(bitmap.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(writer)),
        FormatTag::Wbmp => {
            let bytes = wbmp::encode(bitmap)
                .map_err(|e| ImageError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
            writer.write_all(&bytes)?;
            Ok(())
        }
    };
    result.map_err(ImageError::from_encoder)
}

/// Staging files for `encode`, created with the mode `File::create` would use.
/// `NamedTempFile` defaults to owner-only, which the rename would keep.
fn scratch_builder() -> tempfile::Builder<'static, 'static> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".simple-thumb-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder
}

/// Read the EXIF orientation with kamadak-exif.
fn read_exif_orientation(path: &Path) -> ExifOrientation {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return ExifOrientation::Unreadable(e.to_string()),
    };
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return ExifOrientation::Absent,
        Err(e) => return ExifOrientation::Unreadable(e.to_string()),
    };
    let Some(field) = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) else {
        return ExifOrientation::Absent;
    };
    match field.value.get_uint(0) {
        Some(value) => Orientation::from_exif(value)
            .map(ExifOrientation::Tagged)
            .unwrap_or(ExifOrientation::Invalid(value)),
        None => ExifOrientation::Unreadable(format!(
            "Orientation has a non-integer value: {}",
            field.display_value()
        )),
    }
}

impl ImageBackend for RustBackend {
    fn blank(&self, width: u32, height: u32) -> Result<DynamicImage, ImageError> {
        ensure_allocatable(width, height)?;
        Ok(DynamicImage::new_rgba8(width, height))
    }

    fn probe(&self, path: &Path) -> Result<Probe, ImageError> {
        let header = read_header(path)?;
        let format = format::detect(&header)?;

        let dimensions = match format.codec() {
            None => {
                let parsed = wbmp::read_header(&header)
                    .ok_or_else(|| decode_error(path, wbmp::WbmpError::Header))?;
                Dimensions {
                    width: parsed.width,
                    height: parsed.height,
                }
            }
            Some(codec) => {
                let reader = BufReader::new(open_source(path)?);
                let (width, height) = ImageReader::with_format(reader, codec)
                    .into_dimensions()
                    .map_err(|e| decode_error(path, e))?;
                Dimensions { width, height }
            }
        };

        Ok(Probe { dimensions, format })
    }

    fn decode(&self, path: &Path, format: FormatTag) -> Result<DynamicImage, ImageError> {
        match format.codec() {
            None => decode_wbmp(path),
            Some(codec) => decode_with(path, codec),
        }
    }

    fn encode(
        &self,
        bitmap: &DynamicImage,
        format: FormatTag,
        path: &Path,
    ) -> Result<(), ImageError> {
        // Encode next to the target and rename over it, so a failed encode
        // leaves whatever was at `path` untouched.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = scratch_builder().tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            encode_to(bitmap, format, self.quality, &mut writer)?;
            writer.flush()?;
        }
        staged.persist(path).map_err(|e| ImageError::Io(e.error))?;
        Ok(())
    }

    fn resample(
        &self,
        bitmap: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ImageError> {
        ensure_allocatable(width, height)?;
        Ok(bitmap.resize_exact(width, height, self.filter.to_image_filter()))
    }

    fn transform(&self, bitmap: DynamicImage, step: Transform) -> DynamicImage {
        match step {
            Transform::FlipHorizontal => bitmap.fliph(),
            Transform::FlipVertical => bitmap.flipv(),
            Transform::Rotate90 => bitmap.rotate90(),
            Transform::Rotate180 => bitmap.rotate180(),
            Transform::Rotate270 => bitmap.rotate270(),
        }
    }

    fn read_orientation(&self, path: &Path) -> ExifOrientation {
        // Only JPEG, PNG and WebP containers carry EXIF among the supported
        // formats; asking kamadak-exif about the others reports a parse error.
        match read_header(path).and_then(|h| format::detect(&h)) {
            Ok(FormatTag::Jpeg | FormatTag::Png | FormatTag::Webp) => read_exif_orientation(path),
            Ok(_) => ExifOrientation::Absent,
            Err(e) => ExifOrientation::Unreadable(e.to_string()),
        }
    }
}
