//! Synchronous request bodies: size, full decode, thumbnail and raw bytes.
//!
//! Each function runs on a background worker. Failures are logged and
//! reported as `None`; nothing here returns an error to the caller.

use image::DynamicImage;
use tracing::debug;

use super::codec::{Codec, ThumbnailOptions};
use super::{DecodeError, FilterType, ImageContentMode, ImageDeliveryMode, IntrinsicSize};
use crate::location::ResourceLocation;
use crate::orientation::apply_orientation;

/// Resampling filters picked per delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    pub progressive: FilterType,
    pub best: FilterType,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            progressive: FilterType::Bilinear,
            best: FilterType::Lanczos3,
        }
    }
}

impl FilterPolicy {
    pub fn filter_for(&self, mode: ImageDeliveryMode) -> FilterType {
        match mode {
            ImageDeliveryMode::Progressive => self.progressive,
            ImageDeliveryMode::Best => self.best,
        }
    }
}

/// Options handed to the codec for a thumbnail of `target` size.
///
/// The longest target edge bounds the thumbnail; orientation is always baked
/// in and the primary image is always the source.
pub fn thumbnail_options(
    target: IntrinsicSize,
    content_mode: ImageContentMode,
    delivery_mode: ImageDeliveryMode,
    filters: &FilterPolicy,
) -> ThumbnailOptions {
    ThumbnailOptions {
        max_pixel_size: target.max_dimension(),
        apply_transform: true,
        from_image_always: true,
        filter: filters.filter_for(delivery_mode),
        content_mode,
    }
}

/// Displayed size of the image, read without decoding pixel data.
///
/// `None` when the resource cannot be opened or either dimension is missing.
pub fn read_size<C: Codec>(codec: &C, location: &ResourceLocation) -> Option<IntrinsicSize> {
    let props = codec
        .open(location)
        .and_then(|handle| codec.read_properties(&handle));
    let props = log_absent(props, "size", location)?;

    let size = props.oriented_size();
    if size.is_none() {
        debug!(%location, ?props, "image dimensions unavailable");
    }
    size
}

/// Full resolution image with EXIF orientation applied.
pub fn decode_full<C: Codec>(codec: &C, location: &ResourceLocation) -> Option<DynamicImage> {
    log_absent(try_decode_full(codec, location), "full image", location)
}

fn try_decode_full<C: Codec>(
    codec: &C,
    location: &ResourceLocation,
) -> Result<DynamicImage, DecodeError> {
    let handle = codec.open(location)?;
    // Without readable properties the image is used as stored.
    let orientation = codec
        .read_properties(&handle)
        .map(|props| props.orientation())
        .unwrap_or_default();
    let image = codec.decode(&handle)?;

    if orientation.effect().is_identity() {
        Ok(image)
    } else {
        Ok(apply_orientation(image, orientation))
    }
}

/// Thumbnail produced by the codec itself, bounded by `options.max_pixel_size`.
pub fn decode_thumbnail<C: Codec>(
    codec: &C,
    location: &ResourceLocation,
    options: &ThumbnailOptions,
) -> Option<DynamicImage> {
    let result = if options.max_pixel_size == 0 {
        Err(DecodeError::InvalidSize(0))
    } else {
        codec
            .open(location)
            .and_then(|handle| codec.decode_thumbnail(&handle, options))
    };
    log_absent(result, "thumbnail", location)
}

/// Encoded bytes of the resource, verbatim.
pub fn read_raw_bytes(location: &ResourceLocation) -> Option<Vec<u8>> {
    log_absent(location.read_bytes(), "raw bytes", location)
}

fn log_absent<T>(
    result: Result<T, DecodeError>,
    what: &str,
    location: &ResourceLocation,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(%location, error = %err, "{what} unavailable");
            None
        }
    }
}
