//! EXIF orientation model.
//!
//! Maps the 8 EXIF orientation values to the pixel transform that produces the
//! upright image, and to whether that transform exchanges width and height.
//!
//! [`Orientation::effect`] is the only place the table lives. Size reporting
//! ([`crate::decode::read_size`]) and pixel correction ([`apply_orientation`])
//! both read from it, so they cannot disagree about which tags swap dimensions.
//!
//! See: https://exiftool.org/TagNames/EXIF.html

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// EXIF orientation values (1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

/// Geometric operation applied to a decoded buffer to make it upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelTransform {
    Identity,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Mirror across the top-left to bottom-right diagonal.
    Transpose,
    /// Rotate 90 degrees clockwise.
    Rotate90,
    /// Mirror across the top-right to bottom-left diagonal.
    Transverse,
    /// Rotate 270 degrees clockwise.
    Rotate270,
}

/// What correcting an orientation does to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientationEffect {
    /// Transform that turns the stored pixel grid into the displayed image.
    pub transform: PixelTransform,
    /// True when the displayed image has width and height exchanged.
    pub dimensions_swapped: bool,
}

impl OrientationEffect {
    /// The effect of `Orientation::Normal`.
    pub const IDENTITY: OrientationEffect = OrientationEffect {
        transform: PixelTransform::Identity,
        dimensions_swapped: false,
    };

    /// Whether applying this effect leaves the image untouched.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.transform == PixelTransform::Identity
    }

    /// Apply the size part of the effect to raw `(width, height)`.
    #[inline]
    pub fn oriented_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.dimensions_swapped {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl Orientation {
    /// The correction this orientation calls for.
    pub fn effect(self) -> OrientationEffect {
        let (transform, dimensions_swapped) = match self {
            Orientation::Normal => (PixelTransform::Identity, false),
            Orientation::FlipHorizontal => (PixelTransform::FlipHorizontal, false),
            Orientation::Rotate180 => (PixelTransform::Rotate180, false),
            Orientation::FlipVertical => (PixelTransform::FlipVertical, false),
            Orientation::Transpose => (PixelTransform::Transpose, true),
            Orientation::Rotate90CW => (PixelTransform::Rotate90, true),
            Orientation::Transverse => (PixelTransform::Transverse, true),
            Orientation::Rotate270CW => (PixelTransform::Rotate270, true),
        };
        OrientationEffect {
            transform,
            dimensions_swapped,
        }
    }

    /// Returns true if this orientation swaps width and height dimensions.
    ///
    /// Rotations of 90° and 270° (and their flip variants Transpose/Transverse)
    /// swap the image dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        self.effect().dimensions_swapped
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Effect of a raw EXIF orientation tag. Unknown tags have no effect.
#[inline]
pub fn effect_of(tag: u32) -> OrientationEffect {
    Orientation::from(tag).effect()
}

/// Apply EXIF orientation transformation to an image.
pub fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    apply_transform(img, orientation.effect().transform)
}

/// Apply a single pixel transform.
pub fn apply_transform(img: DynamicImage, transform: PixelTransform) -> DynamicImage {
    match transform {
        PixelTransform::Identity => img,
        PixelTransform::FlipHorizontal => img.fliph(),
        PixelTransform::Rotate180 => img.rotate180(),
        PixelTransform::FlipVertical => img.flipv(),
        PixelTransform::Transpose => img.rotate90().fliph(),
        PixelTransform::Rotate90 => img.rotate90(),
        PixelTransform::Transverse => img.rotate270().fliph(),
        PixelTransform::Rotate270 => img.rotate270(),
    }
}
