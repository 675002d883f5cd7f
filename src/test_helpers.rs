//! Shared test utilities for the simple-thumb test suite.
//!
//! Provides synthetic fixtures: in-memory images with a recognisable
//! gradient, files in every supported format, and JPEGs carrying a
//! hand-built EXIF block.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! std::fs::write(&path, jpeg_with_exif_orientation(300, 200, 6)).unwrap();
//! ```

use crate::imaging::{FormatTag, ImageBackend, RustBackend};
use image::{DynamicImage, ImageEncoder, RgbaImage};
use std::path::Path;

// =========================================================================
// In-memory images
// =========================================================================

/// An opaque RGBA gradient; every pixel differs from its neighbours.
pub fn create_test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128, 255])
    }))
}

/// Encode a test image of the given size to `path` in `format`.
pub fn write_test_image(path: &Path, format: FormatTag, width: u32, height: u32) {
    RustBackend::new()
        .encode(&create_test_image(width, height), format, path)
        .unwrap();
}

// =========================================================================
// EXIF fixtures
// =========================================================================

/// Encode a baseline JPEG with no metadata.
pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = create_test_image(width, height).to_rgb8();
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// A JPEG with an APP1 segment holding `payload`, inserted right after SOI.
pub fn jpeg_with_raw_app1(width: u32, height: u32, payload: &[u8]) -> Vec<u8> {
    let jpeg = plain_jpeg(width, height);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "encoder must start with SOI");

    let seg_len = u16::try_from(payload.len() + 2).unwrap();
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&seg_len.to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Minimal big-endian EXIF block: IFD0 with a single `Orientation` SHORT.
pub fn exif_orientation_block(orientation: u16) -> Vec<u8> {
    let mut block = Vec::new();
    block.extend_from_slice(b"Exif\0\0");
    // TIFF header: "MM", magic 42, IFD0 at offset 8
    block.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    // One entry
    block.extend_from_slice(&1u16.to_be_bytes());
    // Tag 0x0112, type SHORT (3), count 1, value left-justified
    block.extend_from_slice(&0x0112u16.to_be_bytes());
    block.extend_from_slice(&3u16.to_be_bytes());
    block.extend_from_slice(&1u32.to_be_bytes());
    block.extend_from_slice(&orientation.to_be_bytes());
    block.extend_from_slice(&[0x00, 0x00]);
    // No next IFD
    block.extend_from_slice(&0u32.to_be_bytes());
    block
}

/// A JPEG tagged with the given EXIF orientation.
pub fn jpeg_with_exif_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    jpeg_with_raw_app1(width, height, &exif_orientation_block(orientation))
}
