//! In-memory codec double for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use image::{DynamicImage, Rgb, RgbImage};

use super::codec::{Codec, ThumbnailOptions};
use super::resize::resize_to_fit;
use super::{DecodeError, ImageProperties};
use crate::location::ResourceLocation;
use crate::orientation::{apply_orientation, Orientation};

/// Which pixels a thumbnail was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThumbnailSource {
    Original,
    EmbeddedPreview,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeImage {
    width: u32,
    height: u32,
    orientation: Option<u32>,
    has_width: bool,
    has_height: bool,
    properties_readable: bool,
    decodable: bool,
    embedded_preview: bool,
}

impl FakeImage {
    /// Colour of the stored top-left pixel.
    pub(crate) const MARKER: [u8; 3] = [255, 0, 0];
    const FILL: [u8; 3] = [0, 0, 255];
    const PREVIEW_EDGE: u32 = 16;

    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            orientation: None,
            has_width: true,
            has_height: true,
            properties_readable: true,
            decodable: true,
            embedded_preview: false,
        }
    }

    pub(crate) fn with_orientation(mut self, tag: u32) -> Self {
        self.orientation = Some(tag);
        self
    }

    pub(crate) fn without_height(mut self) -> Self {
        self.has_height = false;
        self
    }

    pub(crate) fn without_properties(mut self) -> Self {
        self.properties_readable = false;
        self
    }

    pub(crate) fn undecodable(mut self) -> Self {
        self.decodable = false;
        self
    }

    pub(crate) fn with_embedded_preview(mut self) -> Self {
        self.embedded_preview = true;
        self
    }

    fn pixels(&self) -> DynamicImage {
        let img = RgbImage::from_fn(self.width, self.height, |x, y| {
            if x == 0 && y == 0 {
                Rgb(Self::MARKER)
            } else {
                Rgb(Self::FILL)
            }
        });
        DynamicImage::ImageRgb8(img)
    }
}

/// Codec over a fixed table of fake images, recording what it was asked to do.
#[derive(Debug, Default)]
pub(crate) struct FakeCodec {
    images: HashMap<ResourceLocation, FakeImage>,
    full_decodes: AtomicUsize,
    thumbnail_requests: Mutex<Vec<ThumbnailOptions>>,
    thumbnail_sources: Mutex<Vec<ThumbnailSource>>,
}

impl FakeCodec {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, location: &str, image: FakeImage) {
        self.images.insert(ResourceLocation::from(location), image);
    }

    pub(crate) fn full_decodes(&self) -> usize {
        self.full_decodes.load(Ordering::SeqCst)
    }

    pub(crate) fn thumbnail_requests(&self) -> Vec<ThumbnailOptions> {
        self.thumbnail_requests.lock().unwrap().clone()
    }

    pub(crate) fn thumbnail_sources(&self) -> Vec<ThumbnailSource> {
        self.thumbnail_sources.lock().unwrap().clone()
    }
}

impl Codec for FakeCodec {
    type Handle = FakeImage;

    fn open(&self, location: &ResourceLocation) -> Result<FakeImage, DecodeError> {
        self.images
            .get(location)
            .cloned()
            .ok_or_else(|| DecodeError::IoError(format!("no such resource: {location}")))
    }

    fn read_properties(&self, handle: &FakeImage) -> Result<ImageProperties, DecodeError> {
        if !handle.properties_readable {
            return Err(DecodeError::ExifError("unreadable".to_string()));
        }
        Ok(ImageProperties {
            width: handle.has_width.then_some(handle.width),
            height: handle.has_height.then_some(handle.height),
            orientation: handle.orientation,
        })
    }

    fn decode(&self, handle: &FakeImage) -> Result<DynamicImage, DecodeError> {
        self.full_decodes.fetch_add(1, Ordering::SeqCst);
        if !handle.decodable {
            return Err(DecodeError::CorruptedFile("fake".to_string()));
        }
        Ok(handle.pixels())
    }

    fn decode_thumbnail(
        &self,
        handle: &FakeImage,
        options: &ThumbnailOptions,
    ) -> Result<DynamicImage, DecodeError> {
        self.thumbnail_requests.lock().unwrap().push(*options);
        if !handle.decodable {
            return Err(DecodeError::CorruptedFile("fake".to_string()));
        }

        let (source, pixels) = if handle.embedded_preview && !options.from_image_always {
            let edge = FakeImage::PREVIEW_EDGE;
            (
                ThumbnailSource::EmbeddedPreview,
                DynamicImage::new_rgb8(edge, edge),
            )
        } else {
            (ThumbnailSource::Original, handle.pixels())
        };
        self.thumbnail_sources.lock().unwrap().push(source);

        let pixels = if options.apply_transform {
            let orientation = handle.orientation.map(Orientation::from).unwrap_or_default();
            apply_orientation(pixels, orientation)
        } else {
            pixels
        };
        resize_to_fit(&pixels, options.max_pixel_size, options.filter)
    }
}
