//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orientation::{effect_of, Orientation};

/// Error types for image decoding operations.
///
/// These never reach callers of [`crate::ImageSource`]; the pipeline logs them
/// and reports the request as absent.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The location cannot be opened by this codec (e.g. a remote URL).
    #[error("Unsupported location: {0}")]
    UnsupportedLocation(String),

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    IoError(String),

    /// EXIF parsing error.
    #[error("EXIF error: {0}")]
    ExifError(String),

    /// No embedded thumbnail found.
    #[error("No embedded thumbnail found")]
    NoThumbnail,

    /// Thumbnail requested with a zero target size.
    #[error("Invalid thumbnail size: {0}")]
    InvalidSize(u32),
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::IoError(err.to_string())
    }
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// How eagerly a caller wants the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageDeliveryMode {
    /// Favor latency: cheaper resampling.
    #[default]
    Progressive,
    /// Favor quality: the best resampling available.
    Best,
}

/// How a thumbnail is meant to be placed in its target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageContentMode {
    /// The whole image is visible inside the target.
    #[default]
    AspectFit,
    /// The image covers the target and may be cropped by the caller.
    AspectFill,
}

/// Size in pixels, as the image is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntrinsicSize {
    pub width: u32,
    pub height: u32,
}

impl IntrinsicSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the longest edge.
    #[inline]
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Properties a codec reports without decoding pixel data.
///
/// Any field may be missing; callers decide what a gap means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageProperties {
    /// Stored pixel width (before orientation correction).
    pub width: Option<u32>,
    /// Stored pixel height (before orientation correction).
    pub height: Option<u32>,
    /// Raw EXIF orientation tag.
    pub orientation: Option<u32>,
}

impl ImageProperties {
    /// Orientation described by the tag, `Normal` when there is none.
    pub fn orientation(&self) -> Orientation {
        self.orientation.map(Orientation::from).unwrap_or_default()
    }

    /// Displayed size, or `None` when either dimension is unknown.
    pub fn oriented_size(&self) -> Option<IntrinsicSize> {
        let (width, height) = (self.width?, self.height?);
        let effect = effect_of(self.orientation.unwrap_or(1));
        let (width, height) = effect.oriented_dimensions(width, height);
        Some(IntrinsicSize { width, height })
    }
}

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a DecodedImage from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
