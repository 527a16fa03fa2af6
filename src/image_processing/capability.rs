//! Startup check for the imaging formats the converter depends on.
//!
//! Decoders are feature-gated in the `image` crate and the WebP encoder links
//! against libwebp, so a misconfigured build is caught here before any file is
//! touched.

use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use super::encode::{encode_rgba, EncodeSettings};

/// Input formats that must be decodable
pub const REQUIRED_DECODERS: &[(&str, ImageFormat)] = &[
    ("PNG", ImageFormat::Png),
    ("JPEG", ImageFormat::Jpeg),
    ("WebP", ImageFormat::WebP),
];

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{0} decoding is not enabled in this build")]
    MissingDecoder(&'static str),

    #[error("WebP encoder self-test failed: {0}")]
    EncoderSelfTest(String),

    #[error("WebP encoder output could not be decoded")]
    DecoderSelfTest(#[source] image::ImageError),

    #[error("WebP round trip returned a {0}x{1} image instead of 1x1")]
    RoundTripMismatch(u32, u32),
}

/// What the probe verified
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub decoders: Vec<&'static str>,
    pub self_test_bytes: usize,
}

/// Verify that every required decoder is compiled in and that a 1x1 RGBA
/// image survives a WebP encode/decode round trip.
pub fn probe() -> Result<Capabilities, CapabilityError> {
    let mut decoders = Vec::with_capacity(REQUIRED_DECODERS.len());
    for (name, format) in REQUIRED_DECODERS {
        if !format.reading_enabled() {
            return Err(CapabilityError::MissingDecoder(name));
        }
        decoders.push(*name);
    }

    let pixel = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 128]));
    let bytes = encode_rgba(&pixel, EncodeSettings::Lossless)
        .map_err(|e| CapabilityError::EncoderSelfTest(format!("{:#}", e)))?;

    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::WebP)
        .map_err(CapabilityError::DecoderSelfTest)?;
    let (width, height) = decoded.dimensions();
    if (width, height) != (1, 1) {
        return Err(CapabilityError::RoundTripMismatch(width, height));
    }

    Ok(Capabilities {
        decoders,
        self_test_bytes: bytes.len(),
    })
}
