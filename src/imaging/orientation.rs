//! EXIF orientation table.
//!
//! Maps the eight EXIF `Orientation` values to the sequence of flips and
//! clockwise rotations that bring the stored pixels upright:
//!
//! | Value | Steps | Swaps axes |
//! |---|---|---|
//! | 1 | none | no |
//! | 2 | mirror horizontal | no |
//! | 3 | rotate 180° | no |
//! | 4 | mirror vertical | no |
//! | 5 | mirror horizontal, rotate 270° | yes |
//! | 6 | rotate 90° | yes |
//! | 7 | mirror horizontal, rotate 90° | yes |
//! | 8 | rotate 270° | yes |

/// One pixel transform step, executed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    FlipHorizontal,
    FlipVertical,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Transform {
    pub fn swaps_axes(self) -> bool {
        matches!(self, Transform::Rotate90 | Transform::Rotate270)
    }
}

/// EXIF orientation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    MirrorHorizontal,
    Rotate180,
    MirrorVertical,
    MirrorHorizontalRotate270,
    Rotate90,
    MirrorHorizontalRotate90,
    Rotate270,
}

impl Orientation {
    /// Parse a raw tag value. Values outside 1..=8 are not orientations.
    pub fn from_exif(value: u32) -> Option<Self> {
        Some(match value {
            1 => Orientation::Normal,
            2 => Orientation::MirrorHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::MirrorVertical,
            5 => Orientation::MirrorHorizontalRotate270,
            6 => Orientation::Rotate90,
            7 => Orientation::MirrorHorizontalRotate90,
            8 => Orientation::Rotate270,
            _ => return None,
        })
    }

    pub fn exif_value(self) -> u32 {
        match self {
            Orientation::Normal => 1,
            Orientation::MirrorHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::MirrorVertical => 4,
            Orientation::MirrorHorizontalRotate270 => 5,
            Orientation::Rotate90 => 6,
            Orientation::MirrorHorizontalRotate90 => 7,
            Orientation::Rotate270 => 8,
        }
    }

    /// Steps to apply, in order.
    pub fn steps(self) -> &'static [Transform] {
        use Transform::*;
        match self {
            Orientation::Normal => &[],
            Orientation::MirrorHorizontal => &[FlipHorizontal],
            Orientation::Rotate180 => &[Rotate180],
            Orientation::MirrorVertical => &[FlipVertical],
            Orientation::MirrorHorizontalRotate270 => &[FlipHorizontal, Rotate270],
            Orientation::Rotate90 => &[Rotate90],
            Orientation::MirrorHorizontalRotate90 => &[FlipHorizontal, Rotate90],
            Orientation::Rotate270 => &[Rotate270],
        }
    }

    pub fn swaps_axes(self) -> bool {
        self.steps().iter().filter(|s| s.swaps_axes()).count() % 2 == 1
    }
}

/// Outcome of looking for an orientation tag in a file.
///
/// Only [`ExifOrientation::Tagged`] leads to a transform; the other cases
/// produce an unchanged copy. `Unreadable` is kept apart from `Absent` so
/// callers can report a corrupt metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExifOrientation {
    /// No EXIF block, or a block without an `Orientation` field.
    Absent,
    /// An EXIF block exists but could not be parsed.
    Unreadable(String),
    /// An `Orientation` field with a valid value.
    Tagged(Orientation),
    /// An `Orientation` field whose value is outside 1..=8.
    Invalid(u32),
}

impl ExifOrientation {
    /// The orientation to apply, if any.
    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            ExifOrientation::Tagged(o) => Some(*o),
            _ => None,
        }
    }
}
