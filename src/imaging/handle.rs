//! The image handle.
//!
//! An [`Image`] owns one decoded bitmap plus the metadata needed to write it
//! back out: where it came from, which format to encode it in, where it was
//! last saved, and an optional scratch file for display-only flows.
//!
//! Transforms are copy-on-transform: [`Image::thumbnail`] and
//! [`Image::apply_exif_orientation`] return a new handle and leave the
//! receiver untouched. [`Image::save`] and [`Image::display`] are the only
//! operations that change a handle's file bookkeeping, and `display`
//! consumes the handle.
//!
//! ```text
//! create / load ──► thumbnail / apply_exif_orientation ──► save ──► display
//!                   (new handles)                         (path bound) (terminal)
//! ```
//!
//! Every pixel operation goes through an [`ImageBackend`], passed explicitly
//! to each call.

use super::backend::{Dimensions, ImageBackend, ImageError};
use super::calculations::{calculate_thumbnail_dimensions, oriented_dimensions};
use super::format::FormatTag;
use super::orientation::ExifOrientation;
use crate::response::ResponseHeaders;
use image::DynamicImage;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Prefix of scratch files created by [`Image::display`].
pub const DEFAULT_TEMP_PREFIX: &str = "simple_thumb_";

/// Where [`Image::display_with`] creates its scratch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempFiles {
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for TempFiles {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
            prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

/// What [`Image::display`] sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displayed {
    /// The file that was streamed. For display-only flows this is the
    /// scratch file, already deleted by the time the caller sees it.
    pub path: PathBuf,
    pub headers: ResponseHeaders,
    /// Body bytes written after the header block.
    pub body_bytes: u64,
}

/// One decoded image plus its file bookkeeping.
pub struct Image {
    bitmap: DynamicImage,
    width: u32,
    height: u32,
    source_path: Option<PathBuf>,
    format: Option<FormatTag>,
    last_saved_path: Option<PathBuf>,
    first_source_path: Option<PathBuf>,
    /// Format of the bytes at the bound path, as decoded or last written.
    bound_format: Option<FormatTag>,
    /// Deleted on drop.
    temp_file: Option<TempPath>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color", &self.bitmap.color())
            .field("source_path", &self.source_path)
            .field("format", &self.format)
            .field("last_saved_path", &self.last_saved_path)
            .field("first_source_path", &self.first_source_path)
            .field("bound_format", &self.bound_format)
            .field("temp_file", &self.temp_file.as_deref())
            .finish()
    }
}

impl Image {
    /// Wrap a bitmap. Width and height are always read from the bitmap itself.
    fn from_bitmap(bitmap: DynamicImage, format: Option<FormatTag>) -> Self {
        Self {
            width: bitmap.width(),
            height: bitmap.height(),
            bitmap,
            source_path: None,
            format,
            last_saved_path: None,
            first_source_path: None,
            bound_format: None,
            temp_file: None,
        }
    }

    /// Allocate a blank true-color image.
    pub fn create(backend: &impl ImageBackend, width: u32, height: u32) -> Result<Self, ImageError> {
        let bitmap = backend.blank(width, height)?;
        Ok(Self::from_bitmap(bitmap, None))
    }

    /// Probe and decode an image file.
    ///
    /// The format comes from the file's content, not its extension.
    pub fn load(backend: &impl ImageBackend, path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let probe = backend.probe(path)?;
        let bitmap = backend.decode(path, probe.format)?;

        if (bitmap.width(), bitmap.height())
            != (probe.dimensions.width, probe.dimensions.height)
        {
            tracing::debug!(
                path = %path.display(),
                probed = ?probe.dimensions,
                decoded = ?(bitmap.width(), bitmap.height()),
                "decoded size differs from header"
            );
        }
        tracing::debug!(path = %path.display(), format = %probe.format, "loaded image");

        let mut image = Self::from_bitmap(bitmap, Some(probe.format));
        image.source_path = Some(path.to_path_buf());
        image.bound_format = Some(probe.format);
        Ok(image)
    }

    /// A copy bounded to `max_size` on its larger side, aspect preserved.
    ///
    /// Images already within bounds are copied pixel for pixel. The result
    /// keeps the format but not the source path.
    pub fn thumbnail(&self, backend: &impl ImageBackend, max_size: u32) -> Result<Self, ImageError> {
        if max_size == 0 {
            return Err(ImageError::Precondition(
                "Thumbnail size must be at least one pixel.",
            ));
        }

        let bitmap = match calculate_thumbnail_dimensions((self.width, self.height), max_size) {
            Some((width, height)) => {
                tracing::debug!(
                    from = ?(self.width, self.height),
                    to = ?(width, height),
                    "resampling thumbnail"
                );
                backend.resample(&self.bitmap, width, height)?
            }
            None => self.bitmap.clone(),
        };

        Ok(Self::from_bitmap(bitmap, self.format))
    }

    /// A copy with the source file's EXIF orientation applied.
    ///
    /// The orientation is re-read from [`source_path`](Self::source_path),
    /// never from the bitmap. Missing or unreadable metadata yields an
    /// unchanged copy.
    pub fn apply_exif_orientation(&self, backend: &impl ImageBackend) -> Result<Self, ImageError> {
        let Some(source) = self.source_path.as_deref() else {
            return Err(ImageError::Precondition(
                "File must be defined before applying EXIF orientation.",
            ));
        };

        let reading = backend.read_orientation(source);
        match &reading {
            ExifOrientation::Unreadable(reason) => {
                tracing::warn!(path = %source.display(), %reason, "ignoring unreadable EXIF block");
            }
            ExifOrientation::Invalid(value) => {
                tracing::warn!(path = %source.display(), value, "ignoring out-of-range EXIF orientation");
            }
            ExifOrientation::Absent | ExifOrientation::Tagged(_) => {}
        }

        let mut bitmap = self.bitmap.clone();
        if let Some(orientation) = reading.orientation() {
            tracing::debug!(path = %source.display(), ?orientation, "applying EXIF orientation");
            for step in orientation.steps() {
                bitmap = backend.transform(bitmap, *step);
            }
            debug_assert_eq!(
                (bitmap.width(), bitmap.height()),
                oriented_dimensions((self.width, self.height), orientation.swaps_axes())
            );
        }

        Ok(Self::from_bitmap(bitmap, self.format))
    }

    /// Encode the image to `path` and bind the handle to it.
    ///
    /// If `path` is an existing directory the source file's name is appended.
    /// Without a format the image is written as PNG, and the handle keeps PNG
    /// as its format from then on. Nothing on the handle changes when encoding
    /// fails. Returns the path actually written.
    pub fn save(
        &mut self,
        backend: &impl ImageBackend,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, ImageError> {
        let mut target = path.as_ref().to_path_buf();
        if target.is_dir() {
            let name = self
                .source_path
                .as_deref()
                .and_then(Path::file_name)
                .ok_or(ImageError::Precondition(
                    "Cannot save into a directory without a source file name.",
                ))?;
            target.push(name);
        }

        let format = self.format.unwrap_or(FormatTag::Png);
        backend.encode(&self.bitmap, format, &target)?;
        tracing::debug!(path = %target.display(), %format, "saved image");

        if self.first_source_path.is_none() {
            self.first_source_path = self.bound_path().map(Path::to_path_buf);
        }
        self.last_saved_path = Some(target.clone());
        self.format = Some(format);
        self.bound_format = Some(format);
        Ok(target)
    }

    /// Stream the image as a response, using the system temp directory for
    /// the scratch file if one is needed.
    pub fn display<W: Write>(self, backend: &impl ImageBackend, out: W) -> Result<Displayed, ImageError> {
        self.display_with(backend, &TempFiles::default(), out)
    }

    /// Stream the image as a response: `Content-Type`, `Content-Length`, a
    /// blank line, then the bytes of the file bound to the handle.
    ///
    /// A handle with no file yet, or whose format was changed since that file
    /// was written, is first saved to a fresh scratch file so the header
    /// always describes the bytes sent. The handle is consumed; the scratch
    /// file is deleted when this returns.
    /// Every error is raised before the first header byte is written.
    pub fn display_with<W: Write>(
        mut self,
        backend: &impl ImageBackend,
        temp: &TempFiles,
        mut out: W,
    ) -> Result<Displayed, ImageError> {
        if self.needs_scratch_file() {
            let scratch = tempfile::Builder::new()
                .prefix(&temp.prefix)
                .tempfile_in(&temp.dir)?
                .into_temp_path();
            let scratch_path = scratch.to_path_buf();
            self.temp_file = Some(scratch);
            self.save(backend, &scratch_path)?;
        }

        let (Some(path), Some(format)) = (
            self.bound_path().map(Path::to_path_buf),
            self.bound_format,
        ) else {
            return Err(ImageError::Precondition(
                "File (and type) must be defined before displaying the image.",
            ));
        };

        let mut file = File::open(&path)?;
        let headers = ResponseHeaders::new(format.mime_type(), file.metadata()?.len());

        headers.write_cgi(&mut out)?;
        let body_bytes = io::copy(&mut file, &mut out)?;
        out.flush()?;
        tracing::debug!(path = %path.display(), body_bytes, "displayed image");

        Ok(Displayed {
            path,
            headers,
            body_bytes,
        })
    }

    /// Set the format used by the next [`save`](Self::save).
    pub fn set_format(&mut self, format: FormatTag) {
        self.format = Some(format);
    }

    /// The file currently standing for this image: the last save, or the
    /// file it was loaded from.
    fn bound_path(&self) -> Option<&Path> {
        self.last_saved_path
            .as_deref()
            .or(self.source_path.as_deref())
    }

    /// No file is bound, or the bound file is in a different format from
    /// the one the handle would now encode.
    fn needs_scratch_file(&self) -> bool {
        match (self.bound_path(), self.bound_format) {
            (Some(_), Some(written)) => self.format.is_some_and(|wanted| wanted != written),
            _ => true,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    pub fn bitmap(&self) -> &DynamicImage {
        &self.bitmap
    }

    pub fn format(&self) -> Option<FormatTag> {
        self.format
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn last_saved_path(&self) -> Option<&Path> {
        self.last_saved_path.as_deref()
    }

    /// First path ever bound to the handle. Kept for bookkeeping only.
    pub fn first_source_path(&self) -> Option<&Path> {
        self.first_source_path.as_deref()
    }

    pub fn temp_file_path(&self) -> Option<&Path> {
        self.temp_file.as_deref()
    }
}
