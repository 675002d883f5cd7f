//! The closed set of formats a handle can decode and encode.
//!
//! Detection is by content, never by file extension: the first bytes of the
//! file are matched against the `image` crate's magic-number table, and WBMP
//! (which has no magic number) is recognised by its header shape.

use super::backend::ImageError;
use super::wbmp;
use std::fmt;
use std::str::FromStr;

/// MIME type reported for content nothing recognises.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Encoding format stored on a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Bmp,
    Gif,
    Jpeg,
    Png,
    Wbmp,
    Webp,
}

impl FormatTag {
    pub const ALL: [FormatTag; 6] = [
        FormatTag::Bmp,
        FormatTag::Gif,
        FormatTag::Jpeg,
        FormatTag::Png,
        FormatTag::Wbmp,
        FormatTag::Webp,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            FormatTag::Bmp => "image/bmp",
            FormatTag::Gif => "image/gif",
            FormatTag::Jpeg => "image/jpeg",
            FormatTag::Png => "image/png",
            FormatTag::Wbmp => "image/vnd.wap.wbmp",
            FormatTag::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FormatTag::Bmp => "bmp",
            FormatTag::Gif => "gif",
            FormatTag::Jpeg => "jpg",
            FormatTag::Png => "png",
            FormatTag::Wbmp => "wbmp",
            FormatTag::Webp => "webp",
        }
    }

    /// The `image` crate codec behind this tag. `None` for WBMP, which the
    /// crate handles with its own codec.
    pub fn codec(self) -> Option<image::ImageFormat> {
        match self {
            FormatTag::Bmp => Some(image::ImageFormat::Bmp),
            FormatTag::Gif => Some(image::ImageFormat::Gif),
            FormatTag::Jpeg => Some(image::ImageFormat::Jpeg),
            FormatTag::Png => Some(image::ImageFormat::Png),
            FormatTag::Wbmp => None,
            FormatTag::Webp => Some(image::ImageFormat::WebP),
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FormatTag {
    type Err = ImageError;

    /// Parse a user-facing name (`"jpg"`, `"JPEG"`, `"webp"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bmp" => Ok(FormatTag::Bmp),
            "gif" => Ok(FormatTag::Gif),
            "jpg" | "jpeg" => Ok(FormatTag::Jpeg),
            "png" => Ok(FormatTag::Png),
            "wbmp" => Ok(FormatTag::Wbmp),
            "webp" => Ok(FormatTag::Webp),
            other => Err(ImageError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Identify the format of a file from its leading bytes.
///
/// Known-but-unsupported formats (TIFF, ICO, ...) fail with their MIME type;
/// unrecognised content fails with [`UNKNOWN_MIME`].
pub fn detect(header: &[u8]) -> Result<FormatTag, ImageError> {
    match image::guess_format(header) {
        Ok(image::ImageFormat::Bmp) => Ok(FormatTag::Bmp),
        Ok(image::ImageFormat::Gif) => Ok(FormatTag::Gif),
        Ok(image::ImageFormat::Jpeg) => Ok(FormatTag::Jpeg),
        Ok(image::ImageFormat::Png) => Ok(FormatTag::Png),
        Ok(image::ImageFormat::WebP) => Ok(FormatTag::Webp),
        Ok(other) => Err(ImageError::UnsupportedFormat(
            other.to_mime_type().to_string(),
        )),
        Err(_) if wbmp::read_header(header).is_some() => Ok(FormatTag::Wbmp),
        Err(_) => Err(ImageError::UnsupportedFormat(UNKNOWN_MIME.to_string())),
    }
}
