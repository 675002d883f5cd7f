//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the capability interface for every pixel
//! operation a handle needs: allocate, probe, decode, encode, resample,
//! transform, and read the EXIF orientation. The handle logic (aspect math,
//! orientation table, format dispatch, path bookkeeping) never touches pixels
//! directly, so it can be exercised against a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::format::FormatTag;
use super::orientation::{ExifOrientation, Transform};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("File \"{}\" does not exist or is not readable", .0.display())]
    NotFound(PathBuf),
    #[error("Type \"{0}\" is not supported")]
    UnsupportedFormat(String),
    #[error("Cannot allocate a {width}x{height} image")]
    Allocation { width: u32, height: u32 },
    #[error("{0}")]
    Precondition(&'static str),
    #[error("Failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageError {
    /// Encoder failures surface as I/O errors, whatever the codec reported.
    pub(crate) fn from_encoder(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => ImageError::Io(e),
            other => ImageError::Io(std::io::Error::other(other)),
        }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of a header probe: size and format, without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub dimensions: Dimensions,
    pub format: FormatTag,
}

/// Bytes per pixel of the true-color buffers handles allocate.
const BYTES_PER_PIXEL: u64 = 4;

/// Reject dimensions that cannot be allocated: zero on either side, or a
/// buffer larger than the `image` crate's default allocation ceiling.
pub fn ensure_allocatable(width: u32, height: u32) -> Result<(), ImageError> {
    let ceiling = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let bytes = u64::from(width) * u64::from(height) * BYTES_PER_PIXEL;
    if width == 0 || height == 0 || bytes > ceiling {
        return Err(ImageError::Allocation { width, height });
    }
    Ok(())
}

/// Trait for image processing backends.
///
/// Every operation returns a fresh bitmap or writes a file; none mutates a
/// bitmap the caller still holds. [`transform`](Self::transform) takes its
/// input by value because the handle always passes a buffer it copied for
/// that purpose.
pub trait ImageBackend {
    /// Allocate a blank true-color bitmap.
    fn blank(&self, width: u32, height: u32) -> Result<DynamicImage, ImageError>;

    /// Read size and format from the file header.
    fn probe(&self, path: &Path) -> Result<Probe, ImageError>;

    /// Fully decode a file whose format has already been detected.
    fn decode(&self, path: &Path, format: FormatTag) -> Result<DynamicImage, ImageError>;

    /// Encode `bitmap` as `format` and write it to `path`.
    fn encode(&self, bitmap: &DynamicImage, format: FormatTag, path: &Path)
    -> Result<(), ImageError>;

    /// Resample into a new bitmap of exactly `width`x`height`.
    fn resample(
        &self,
        bitmap: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ImageError>;

    /// Apply one flip or clockwise rotation.
    fn transform(&self, bitmap: DynamicImage, step: Transform) -> DynamicImage;

    /// Look for an EXIF `Orientation` tag in the file. Never fails: missing
    /// or broken metadata is reported through the returned value.
    fn read_orientation(&self, path: &Path) -> ExifOrientation;
}
