//! Image handles and the pixel work behind them.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::guess_format` + `ImageReader::into_dimensions`, custom WBMP header parser |
//! | **Decode / encode** | `image` codecs (BMP, GIF, JPEG, PNG, WebP), custom WBMP codec |
//! | **Thumbnail** | `DynamicImage::resize_exact` (Lanczos3 by default) |
//! | **EXIF orientation** | `kamadak-exif` + `fliph` / `flipv` / `rotate*` |
//! | **Scratch files** | `tempfile::TempPath` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Format / orientation / params**: Data describing images and operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Handle**: [`Image`], the stateful handle combining calculations + backend

pub mod backend;
mod calculations;
pub mod format;
mod handle;
pub mod orientation;
mod params;
pub mod rust_backend;
mod wbmp;

pub use backend::{Dimensions, ImageBackend, ImageError, Probe};
pub use calculations::calculate_thumbnail_dimensions;
pub use format::FormatTag;
pub use handle::{DEFAULT_TEMP_PREFIX, Displayed, Image, TempFiles};
pub use orientation::{ExifOrientation, Orientation, Transform};
pub use params::{Filter, Quality};
pub use rust_backend::RustBackend;
