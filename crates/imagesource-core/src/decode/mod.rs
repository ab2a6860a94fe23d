//! Image decoding pipeline.
//!
//! This module provides functionality for:
//! - Reading orientation-corrected dimensions without a full decode
//! - Full resolution decoding with EXIF orientation applied
//! - Codec-native thumbnails bounded by a maximum pixel size
//! - Reading the encoded bytes of a resource verbatim
//!
//! # Architecture
//!
//! Everything here is synchronous and is meant to run on a background
//! worker (see [`crate::executor`]). Decoding goes through the [`Codec`]
//! trait; [`ImageCodec`] is the implementation backed by the `image` crate.
//!
//! Every operation returns `Option`: a failure at any step is logged at
//! `debug` level and reported as `None`.

mod codec;
#[cfg(test)]
pub(crate) mod fake;
mod pipeline;
mod resize;
mod types;

pub use codec::{Codec, EncodedImage, ImageCodec, ThumbnailOptions};
pub use pipeline::{
    decode_full, decode_thumbnail, read_raw_bytes, read_size, thumbnail_options, FilterPolicy,
};
pub use resize::{calculate_fit_dimensions, resize, resize_to_fit};
pub use types::{
    DecodeError, DecodedImage, FilterType, ImageContentMode, ImageDeliveryMode, ImageProperties,
    IntrinsicSize,
};
