//! # Simple Thumb
//!
//! Load an image, make a bounded thumbnail of it, put it upright according to
//! its EXIF orientation, then save it or stream it as a response.
//!
//! # Architecture: Handle + Backend
//!
//! An [`imaging::Image`] is a stateful handle: one decoded bitmap plus the
//! bookkeeping needed to write it back out. Every pixel operation goes through
//! an [`imaging::ImageBackend`] passed explicitly to each call:
//!
//! ```text
//! Image::load ──► apply_exif_orientation ──► thumbnail ──► save / display
//!    (probe + decode)     (new handle)        (new handle)   (bind / stream)
//! ```
//!
//! Transforms return new handles and never touch the receiver, so the same
//! loaded image can feed several thumbnails. The handle logic (aspect math,
//! orientation table, path bookkeeping) is tested against a recording mock
//! backend; [`imaging::RustBackend`] does the real work with the `image` and
//! `kamadak-exif` crates.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The image handle, formats, EXIF orientation, backend trait and its pure-Rust implementation |
//! | [`response`] | `Content-Type` / `Content-Length` header block for streamed images |
//! | [`config`] | `config.toml` loading, validation and merging onto stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content Sniffing Over Extensions
//!
//! Formats are detected from the first bytes of the file. A PNG named
//! `photo.jpg` loads as PNG and is saved as PNG unless a format is set.
//!
//! ## Scratch Files Die With the Handle
//!
//! Displaying an image that was never written to disk saves it to a fresh
//! temp file first. The file is owned by the handle as a
//! [`tempfile::TempPath`], and `display` consumes the handle, so the file is
//! gone by the time `display` returns, on success or failure.
//!
//! ## EXIF Is Read From the Source File
//!
//! Decoded bitmaps carry no metadata. Orientation is re-read from the file a
//! handle was loaded from, which is why derived handles (thumbnails, oriented
//! copies) cannot be oriented again.

pub mod config;
pub mod imaging;
pub mod output;
pub mod response;

#[cfg(test)]
pub(crate) mod test_helpers;
