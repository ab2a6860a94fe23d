//! Image sources: the asynchronous request surface.
//!
//! An [`ImageSource`] answers four kinds of request (full image, raw bytes,
//! displayed size, fitted thumbnail). Every request returns immediately; the
//! result handler later runs exactly once on the delivery context, with
//! `None` when the request could not be satisfied.

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::trace;

use crate::config::SourceConfig;
use crate::decode::{
    self, Codec, DecodedImage, FilterPolicy, ImageCodec, ImageContentMode, ImageDeliveryMode,
    IntrinsicSize,
};
use crate::executor::ExecutionContext;
use crate::location::ResourceLocation;

/// Image representations that can be built from a decoded pixel buffer.
pub trait FromDecoded: Sized + Send + 'static {
    fn from_decoded(image: DynamicImage) -> Option<Self>;
}

impl FromDecoded for DynamicImage {
    fn from_decoded(image: DynamicImage) -> Option<Self> {
        Some(image)
    }
}

impl FromDecoded for RgbImage {
    fn from_decoded(image: DynamicImage) -> Option<Self> {
        Some(image.into_rgb8())
    }
}

impl FromDecoded for RgbaImage {
    fn from_decoded(image: DynamicImage) -> Option<Self> {
        Some(image.into_rgba8())
    }
}

impl FromDecoded for DecodedImage {
    fn from_decoded(image: DynamicImage) -> Option<Self> {
        let decoded = DecodedImage::from_rgb_image(image.into_rgb8());
        (!decoded.is_empty()).then_some(decoded)
    }
}

/// A still image that can be loaded asynchronously.
///
/// Handlers run on the delivery context of the source's
/// [`ExecutionContext`], once per call. Requests are independent and may
/// complete in any order.
pub trait ImageSource: Send + Sync + 'static {
    /// Encoded bytes of the image, verbatim.
    fn full_resolution_image_data<H>(&self, handler: H)
    where
        H: FnOnce(Option<Vec<u8>>) + Send + 'static,
        Self: Sized;

    /// Displayed size, with EXIF orientation taken into account.
    fn image_size<H>(&self, handler: H)
    where
        H: FnOnce(Option<IntrinsicSize>) + Send + 'static,
        Self: Sized;

    /// The whole image, upright.
    fn full_resolution_image<T, H>(&self, delivery_mode: ImageDeliveryMode, handler: H)
    where
        T: FromDecoded,
        H: FnOnce(Option<T>) + Send + 'static,
        Self: Sized;

    /// An upright thumbnail whose longest edge matches the longest edge of `size`.
    fn image_fitting_size<T, H>(
        &self,
        size: IntrinsicSize,
        content_mode: ImageContentMode,
        delivery_mode: ImageDeliveryMode,
        handler: H,
    ) where
        T: FromDecoded,
        H: FnOnce(Option<T>) + Send + 'static,
        Self: Sized;

    /// Whether `other` refers to the same image.
    fn is_equal_to(&self, other: &dyn ImageSource) -> bool;

    /// Location read by a URI-backed source. Sources reporting the same
    /// location are the same image, whatever codec reads it.
    fn resource_location(&self) -> Option<&ResourceLocation> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Image source backed by a path or `file://` URI.
pub struct UrlImageSource<C: Codec = ImageCodec> {
    location: ResourceLocation,
    codec: Arc<C>,
    context: ExecutionContext,
    filters: FilterPolicy,
}

impl UrlImageSource<ImageCodec> {
    pub fn new(location: impl Into<ResourceLocation>, context: ExecutionContext) -> Self {
        Self::with_codec(location, Arc::new(ImageCodec::new()), context)
    }
}

impl<C: Codec> UrlImageSource<C> {
    pub fn with_codec(
        location: impl Into<ResourceLocation>,
        codec: Arc<C>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            location: location.into(),
            codec,
            context,
            filters: FilterPolicy::default(),
        }
    }

    /// Use `filters` to pick thumbnail resampling per delivery mode.
    pub fn with_filters(mut self, filters: FilterPolicy) -> Self {
        self.filters = filters;
        self
    }

    /// Apply the thumbnail settings from `config`.
    pub fn configured(self, config: &SourceConfig) -> Self {
        self.with_filters(config.thumbnail.filter_policy())
    }

    pub fn location(&self) -> &ResourceLocation {
        &self.location
    }
}

impl<C: Codec> std::fmt::Debug for UrlImageSource<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlImageSource")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl<C: Codec> Clone for UrlImageSource<C> {
    fn clone(&self) -> Self {
        Self {
            location: self.location.clone(),
            codec: Arc::clone(&self.codec),
            context: self.context.clone(),
            filters: self.filters,
        }
    }
}

impl<C: Codec> PartialEq for UrlImageSource<C> {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl<C: Codec> Eq for UrlImageSource<C> {}

impl<C: Codec> Hash for UrlImageSource<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl<C: Codec> ImageSource for UrlImageSource<C> {
    fn full_resolution_image_data<H>(&self, handler: H)
    where
        H: FnOnce(Option<Vec<u8>>) + Send + 'static,
    {
        let location = self.location.clone();
        trace!(%location, "dispatching raw bytes request");
        self.context
            .dispatch(move || decode::read_raw_bytes(&location), handler);
    }

    fn image_size<H>(&self, handler: H)
    where
        H: FnOnce(Option<IntrinsicSize>) + Send + 'static,
    {
        let location = self.location.clone();
        let codec = Arc::clone(&self.codec);
        trace!(%location, "dispatching size request");
        self.context
            .dispatch(move || decode::read_size(&*codec, &location), handler);
    }

    fn full_resolution_image<T, H>(&self, _delivery_mode: ImageDeliveryMode, handler: H)
    where
        T: FromDecoded,
        H: FnOnce(Option<T>) + Send + 'static,
    {
        let location = self.location.clone();
        let codec = Arc::clone(&self.codec);
        trace!(%location, "dispatching full image request");
        self.context.dispatch(
            move || decode::decode_full(&*codec, &location).and_then(T::from_decoded),
            handler,
        );
    }

    fn image_fitting_size<T, H>(
        &self,
        size: IntrinsicSize,
        content_mode: ImageContentMode,
        delivery_mode: ImageDeliveryMode,
        handler: H,
    ) where
        T: FromDecoded,
        H: FnOnce(Option<T>) + Send + 'static,
    {
        let location = self.location.clone();
        let codec = Arc::clone(&self.codec);
        let options = decode::thumbnail_options(size, content_mode, delivery_mode, &self.filters);
        trace!(%location, max_pixel_size = options.max_pixel_size, "dispatching thumbnail request");
        self.context.dispatch(
            move || {
                decode::decode_thumbnail(&*codec, &location, &options).and_then(T::from_decoded)
            },
            handler,
        );
    }

    fn is_equal_to(&self, other: &dyn ImageSource) -> bool {
        other.resource_location() == Some(&self.location)
    }

    fn resource_location(&self) -> Option<&ResourceLocation> {
        Some(&self.location)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
