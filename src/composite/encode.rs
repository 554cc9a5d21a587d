use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

use crate::foundation::core::{RasterImage, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::foundation::math::{flatten_premul_over, premultiply_rgba8_in_place};

/// JPEG quality used for page composites unless overridden.
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// A lossily encoded composite (JPEG bytes plus pixel dimensions).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    width: u32,
    height: u32,
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    /// Wrap existing JPEG bytes, reading the dimensions from the header.
    pub fn from_jpeg(bytes: Vec<u8>) -> SketchResult<Self> {
        let (width, height) = image::ImageReader::with_format(
            Cursor::new(bytes.as_slice()),
            image::ImageFormat::Jpeg,
        )
        .into_dimensions()
        .map_err(|e| SketchError::decode(format!("read jpeg header: {e}")))?;
        Ok(Self {
            width,
            height,
            bytes: bytes.into(),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded JPEG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode back into a raster (opaque, since JPEG carries no alpha).
    pub fn decode(&self) -> SketchResult<RasterImage> {
        decode_image(&self.bytes)
    }
}

/// Flatten `image` onto an opaque `matte` and encode it as JPEG at `quality` (1..=100).
///
/// The matte's alpha channel is ignored.
pub fn encode_jpeg(image: &RasterImage, quality: u8, matte: Rgba8) -> SketchResult<EncodedImage> {
    if !(1..=100).contains(&quality) {
        return Err(SketchError::validation("jpeg quality must be in 1..=100"));
    }
    let matte = [matte.r, matte.g, matte.b];
    let mut rgb = Vec::with_capacity(image.data().len() / 4 * 3);
    for px in image.data().chunks_exact(4) {
        rgb.extend_from_slice(&flatten_premul_over([px[0], px[1], px[2], px[3]], matte));
    }

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(&rgb, image.width(), image.height(), ExtendedColorType::Rgb8)
        .map_err(|e| SketchError::encode(format!("jpeg encode: {e}")))?;

    Ok(EncodedImage {
        width: image.width(),
        height: image.height(),
        bytes: buf.into(),
    })
}

/// Decode encoded image bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> SketchResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);
    RasterImage::from_premul(width, height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/encode.rs"]
mod tests;
