//! Codec seam and the `image`/`kamadak-exif` backed implementation.
//!
//! The pipeline only talks to [`Codec`]. A handle is opened fresh for every
//! request and dropped when the request finishes, so nothing mutable is
//! shared between requests.

use std::io::Cursor;

use exif::{Exif, In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use super::resize::resize_to_fit;
use super::{DecodeError, FilterType, ImageContentMode, ImageProperties};
use crate::location::ResourceLocation;
use crate::orientation::{apply_orientation, Orientation};

/// Options for codec-native thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailOptions {
    /// Longest edge of the produced thumbnail, in pixels.
    pub max_pixel_size: u32,
    /// Bake the EXIF orientation into the thumbnail.
    pub apply_transform: bool,
    /// Always scale down the primary image, never an embedded preview.
    pub from_image_always: bool,
    /// Resampling filter used when scaling.
    pub filter: FilterType,
    /// Placement hint. Codecs may ignore it.
    pub content_mode: ImageContentMode,
}

impl ThumbnailOptions {
    pub fn new(max_pixel_size: u32) -> Self {
        Self {
            max_pixel_size,
            apply_transform: true,
            from_image_always: true,
            filter: FilterType::default(),
            content_mode: ImageContentMode::default(),
        }
    }
}

/// Decoder capability the pipeline is built on.
pub trait Codec: Send + Sync + 'static {
    /// An opened resource, ready to be inspected or decoded.
    type Handle;

    /// Create a decoder for the resource.
    fn open(&self, location: &ResourceLocation) -> Result<Self::Handle, DecodeError>;

    /// Read dimensions and orientation without decoding pixel data.
    fn read_properties(&self, handle: &Self::Handle) -> Result<ImageProperties, DecodeError>;

    /// Decode the primary image at full resolution, exactly as stored.
    fn decode(&self, handle: &Self::Handle) -> Result<DynamicImage, DecodeError>;

    /// Decode a scaled thumbnail.
    fn decode_thumbnail(
        &self,
        handle: &Self::Handle,
        options: &ThumbnailOptions,
    ) -> Result<DynamicImage, DecodeError>;
}

/// Encoded bytes of an opened resource, with the format sniffed from them.
pub struct EncodedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    exif: Option<Exif>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("len", &self.bytes.len())
            .field("format", &self.format)
            .field("has_exif", &self.exif.is_some())
            .finish()
    }
}

impl EncodedImage {
    /// Sniff the format and parse EXIF from in-memory bytes.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::InvalidFormat` if the bytes are not a known image format.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let format = image::guess_format(&bytes).map_err(|_| DecodeError::InvalidFormat)?;
        // Damaged EXIF leaves the pixels readable; carry on without it.
        let exif = read_exif(&bytes).unwrap_or_else(|err| {
            debug!(?format, error = %err, "ignoring unreadable EXIF");
            None
        });
        Ok(Self {
            bytes,
            format,
            exif,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Raw EXIF orientation tag, if the file has one.
    pub fn orientation_tag(&self) -> Option<u32> {
        let exif = self.exif.as_ref()?;
        exif.get_field(Tag::Orientation, In::PRIMARY)?
            .value
            .get_uint(0)
    }

    /// JPEG bytes of the thumbnail stored in the EXIF IFD1, if any.
    fn embedded_thumbnail(&self) -> Option<&[u8]> {
        let exif = self.exif.as_ref()?;
        let offset = exif
            .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
            .value
            .get_uint(0)? as usize;
        let length = exif
            .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
            .value
            .get_uint(0)? as usize;
        if length == 0 {
            return None;
        }
        exif.buf().get(offset..offset.checked_add(length)?)
    }
}

/// Parse the EXIF block of an encoded image.
///
/// `Ok(None)` when the container has no EXIF at all.
fn read_exif(bytes: &[u8]) -> Result<Option<Exif>, DecodeError> {
    match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(err) => Err(DecodeError::ExifError(err.to_string())),
    }
}

/// [`Codec`] over the `image` crate, with EXIF read by `kamadak-exif`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode_embedded(&self, handle: &EncodedImage) -> Result<DynamicImage, DecodeError> {
        let jpeg = handle.embedded_thumbnail().ok_or(DecodeError::NoThumbnail)?;
        image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg)
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
    }
}

impl Codec for ImageCodec {
    type Handle = EncodedImage;

    fn open(&self, location: &ResourceLocation) -> Result<EncodedImage, DecodeError> {
        EncodedImage::from_bytes(location.read_bytes()?)
    }

    fn read_properties(&self, handle: &EncodedImage) -> Result<ImageProperties, DecodeError> {
        let dimensions = ImageReader::with_format(Cursor::new(&handle.bytes), handle.format)
            .into_dimensions()
            .ok();
        Ok(ImageProperties {
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            orientation: handle.orientation_tag(),
        })
    }

    fn decode(&self, handle: &EncodedImage) -> Result<DynamicImage, DecodeError> {
        image::load_from_memory_with_format(&handle.bytes, handle.format)
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
    }

    fn decode_thumbnail(
        &self,
        handle: &EncodedImage,
        options: &ThumbnailOptions,
    ) -> Result<DynamicImage, DecodeError> {
        if options.max_pixel_size == 0 {
            return Err(DecodeError::InvalidSize(options.max_pixel_size));
        }

        let source = if options.from_image_always {
            self.decode(handle)?
        } else {
            match self.decode_embedded(handle) {
                Ok(preview) => preview,
                Err(_) => self.decode(handle)?,
            }
        };

        let source = if options.apply_transform {
            let orientation = handle
                .orientation_tag()
                .map(Orientation::from)
                .unwrap_or_default();
            apply_orientation(source, orientation)
        } else {
            source
        };

        resize_to_fit(&source, options.max_pixel_size, options.filter)
    }
}
