//! Minimal WBMP (Wireless Bitmap, type 0) codec.
//!
//! The `image` crate has no WBMP support, so this module covers the one
//! variant anyone still produces:
//!
//! ```text
//! TypeField       multi-byte int, must be 0
//! FixHeaderField  1 byte, must be 0 (no extension headers)
//! Width           multi-byte int
//! Height          multi-byte int
//! Data            1 bit per pixel, MSB first, rows padded to a byte, 1 = white
//! ```
//!
//! Multi-byte ints carry 7 bits per byte, most significant group first, with
//! the high bit set on every byte except the last.

use image::{DynamicImage, GrayImage, Luma};
use thiserror::Error;

/// Largest side accepted during detection, and so the largest side written.
/// Anything bigger is far more likely to be an unrelated file that happens to
/// start with two zero bytes.
pub const MAX_DIMENSION: u32 = 2048;

/// Luminance at or above which a pixel is written as white.
const WHITE_THRESHOLD: u8 = 128;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WbmpError {
    #[error("not a type 0 WBMP header")]
    Header,
    #[error("pixel data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("{width}x{height} exceeds the {MAX_DIMENSION}px WBMP limit")]
    TooLarge { width: u32, height: u32 },
}

/// Parsed WBMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    /// Offset of the first pixel byte.
    pub data_offset: usize,
}

/// Read a multi-byte int starting at `pos`. Returns the value and the offset
/// just past it. At most four bytes (28 bits) are accepted.
fn read_multibyte(data: &[u8], mut pos: usize) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for _ in 0..4 {
        let byte = *data.get(pos)?;
        pos += 1;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Some((value, pos));
        }
    }
    None
}

fn write_multibyte(out: &mut Vec<u8>, mut value: u32) {
    let mut groups = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        groups.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(groups.iter().rev());
}

/// Parse the header, or `None` if the bytes do not look like a type 0 WBMP.
pub fn read_header(data: &[u8]) -> Option<Header> {
    let (kind, pos) = read_multibyte(data, 0)?;
    if kind != 0 || *data.get(pos)? != 0 {
        return None;
    }
    let (width, pos) = read_multibyte(data, pos + 1)?;
    let (height, pos) = read_multibyte(data, pos)?;
    let valid = |side: u32| (1..=MAX_DIMENSION).contains(&side);
    if !valid(width) || !valid(height) {
        return None;
    }
    Some(Header {
        width,
        height,
        data_offset: pos,
    })
}

/// Decode a complete WBMP file into an 8-bit grayscale bitmap.
pub fn decode(data: &[u8]) -> Result<GrayImage, WbmpError> {
    let header = read_header(data).ok_or(WbmpError::Header)?;
    let row_bytes = header.width.div_ceil(8) as usize;
    let expected = row_bytes * header.height as usize;
    let pixels = &data[header.data_offset..];
    if pixels.len() < expected {
        return Err(WbmpError::Truncated {
            expected,
            found: pixels.len(),
        });
    }

    Ok(GrayImage::from_fn(header.width, header.height, |x, y| {
        let byte = pixels[y as usize * row_bytes + (x / 8) as usize];
        let bit = (byte >> (7 - (x % 8))) & 1;
        Luma([if bit == 1 { 255 } else { 0 }])
    }))
}

/// Encode any bitmap as a type 0 WBMP, thresholding luminance.
///
/// Sides above [`MAX_DIMENSION`] are refused: [`read_header`] would not
/// recognise the result.
pub fn encode(img: &DynamicImage) -> Result<Vec<u8>, WbmpError> {
    let (width, height) = (img.width(), img.height());
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(WbmpError::TooLarge { width, height });
    }
    let gray = img.to_luma8();
    let row_bytes = width.div_ceil(8) as usize;

    let mut out = vec![0x00, 0x00];
    write_multibyte(&mut out, width);
    write_multibyte(&mut out, height);

    let body_start = out.len();
    out.resize(body_start + row_bytes * height as usize, 0);
    for (x, y, Luma([value])) in gray.enumerate_pixels() {
        if *value >= WHITE_THRESHOLD {
            out[body_start + y as usize * row_bytes + (x / 8) as usize] |= 0x80 >> (x % 8);
        }
    }
    Ok(out)
}
