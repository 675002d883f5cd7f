//! CLI output formatting.
//!
//! Every command that reports to the terminal has a `format_*` function
//! (returns `Vec<String>`) for testability and a `print_*` wrapper that
//! writes to stdout. Format functions are pure: no I/O, no side effects.
//!
//! The `display` command prints nothing here; its stdout is the response.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Format: jpg (image/jpeg)
//!     Size: 4032x3024
//!     Orientation: 6 (rotate 90° clockwise)
//! ```
//!
//! ## Thumbnail / Orient
//!
//! ```text
//! photo.jpg → thumbs/photo.jpg
//!     Size: 300x400
//!     Format: jpg
//! ```

use crate::imaging::{Dimensions, ExifOrientation, FormatTag, Image, Orientation, Probe};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn size(dimensions: Dimensions) -> String {
    format!("{}x{}", dimensions.width, dimensions.height)
}

fn describe_orientation(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Normal => "upright",
        Orientation::MirrorHorizontal => "mirrored horizontally",
        Orientation::Rotate180 => "rotate 180°",
        Orientation::MirrorVertical => "mirrored vertically",
        Orientation::MirrorHorizontalRotate270 => "mirrored, rotate 270° clockwise",
        Orientation::Rotate90 => "rotate 90° clockwise",
        Orientation::MirrorHorizontalRotate90 => "mirrored, rotate 90° clockwise",
        Orientation::Rotate270 => "rotate 270° clockwise",
    }
}

/// One-line summary of an EXIF orientation reading.
pub fn format_orientation(reading: &ExifOrientation) -> String {
    match reading {
        ExifOrientation::Absent => "none".to_string(),
        ExifOrientation::Unreadable(reason) => format!("unreadable ({reason})"),
        ExifOrientation::Tagged(o) => format!("{} ({})", o.exif_value(), describe_orientation(*o)),
        ExifOrientation::Invalid(value) => format!("{value} (out of range, ignored)"),
    }
}

/// Format the `info` command output.
pub fn format_info(path: &Path, probe: &Probe, orientation: &ExifOrientation) -> Vec<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    vec![
        name,
        format!(
            "{}Format: {} ({})",
            indent(1),
            probe.format,
            probe.format.mime_type()
        ),
        format!("{}Size: {}", indent(1), size(probe.dimensions)),
        format!("{}Orientation: {}", indent(1), format_orientation(orientation)),
    ]
}

pub fn print_info(path: &Path, probe: &Probe, orientation: &ExifOrientation) {
    for line in format_info(path, probe, orientation) {
        println!("{}", line);
    }
}

/// Format the result of writing `image` from `source` to `written`.
pub fn format_written(source: &Path, written: &Path, image: &Image) -> Vec<String> {
    let format = image
        .format()
        .map(FormatTag::extension)
        .unwrap_or("unknown");
    vec![
        format!("{} → {}", source.display(), written.display()),
        format!("{}Size: {}", indent(1), size(image.dimensions())),
        format!("{}Format: {}", indent(1), format),
    ]
}

pub fn print_written(source: &Path, written: &Path, image: &Image) {
    for line in format_written(source, written, image) {
        println!("{}", line);
    }
}
