//! Image resizing used for thumbnail generation.
//!
//! All functions return new images without modifying the input.

use image::DynamicImage;

use super::{DecodeError, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidSize` if either target dimension is zero.
pub fn resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DynamicImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidSize(width.min(height)));
    }

    // Fast path: if dimensions match, just clone
    if image.width() == width && image.height() == height {
        return Ok(image.clone());
    }

    Ok(image.resize_exact(width, height, filter.to_image_filter()))
}

/// Resize an image so its longest edge is at most `max_edge`, preserving
/// aspect ratio. Images that already fit are returned unchanged; nothing is
/// upscaled.
///
/// # Errors
///
/// Returns `DecodeError::InvalidSize` if `max_edge` is zero.
pub fn resize_to_fit(
    image: &DynamicImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DynamicImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidSize(max_edge));
    }

    let (src_width, src_height) = (image.width(), image.height());

    if src_width <= max_edge && src_height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(src_width, src_height, max_edge);

    resize(image, new_width, new_height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
pub fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
