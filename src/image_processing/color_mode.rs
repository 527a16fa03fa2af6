use image::DynamicImage;
use serde::Serialize;
use strum_macros::Display;

/// Pixel representation used when encoding an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// 8-bit RGB, no transparency
    #[strum(serialize = "RGB")]
    Opaque,
    /// 8-bit RGBA
    #[strum(serialize = "RGBA")]
    AlphaCapable,
}

/// Decide the output color mode for a decoded image.
///
/// Anything carrying an alpha channel keeps it. Paletted PNGs with a `tRNS`
/// chunk are expanded to RGBA by the decoder, so they land here as well.
pub fn classify(img: &DynamicImage) -> ColorMode {
    if img.color().has_alpha() {
        ColorMode::AlphaCapable
    } else {
        ColorMode::Opaque
    }
}
