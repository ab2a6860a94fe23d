//! imagesource core - asynchronous, orientation-correct image access
//!
//! This crate loads still images identified by a path or `file://` URI without
//! blocking the caller's thread. A request returns immediately and its result
//! handler later runs on a delivery context (typically a UI loop), exactly once,
//! with `None` when the image could not be read.
//!
//! # Module Structure
//!
//! - `orientation` - EXIF orientation tags, their pixel transforms and size effects
//! - `decode` - Codec seam and the synchronous size/decode/thumbnail/bytes pipeline
//! - `executor` - Background worker pool, delivery queue and request dispatch
//! - `source` - The `ImageSource` trait and the URI-backed `UrlImageSource`
//! - `location` - Resource locations
//! - `config` - TOML configuration
//! - `logging` - Tracing subscriber setup
//!
//! # Usage
//!
//! ```ignore
//! use imagesource_core::{
//!     DeliveryQueue, ExecutionContext, ExecutorConfig, ImageSource, IntrinsicSize,
//!     UrlImageSource,
//! };
//!
//! let delivery = DeliveryQueue::new();
//! let context = ExecutionContext::with_pool(&ExecutorConfig::default(), &delivery)?;
//!
//! let source = UrlImageSource::new("/photos/IMG_0001.jpg", context);
//! source.image_size(|size| println!("{size:?}"));
//!
//! // On the delivery thread's loop:
//! delivery.run_pending();
//! ```

pub mod config;
pub mod decode;
pub mod executor;
pub mod location;
pub mod logging;
pub mod orientation;
pub mod source;

pub use config::{ConfigError, ExecutorConfig, SourceConfig, ThumbnailConfig};
pub use decode::{
    Codec, DecodeError, DecodedImage, FilterPolicy, FilterType, ImageCodec, ImageContentMode,
    ImageDeliveryMode, ImageProperties, IntrinsicSize, ThumbnailOptions,
};
pub use executor::{
    BackgroundPool, DeliveryContext, DeliveryQueue, ExecutionContext, Executor, ExecutorError,
    Job,
};
pub use location::ResourceLocation;
pub use orientation::{apply_orientation, effect_of, Orientation, OrientationEffect, PixelTransform};
pub use source::{FromDecoded, ImageSource, UrlImageSource};

