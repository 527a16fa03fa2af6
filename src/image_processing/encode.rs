use anyhow::{Context, Result};
use image::{RgbImage, RgbaImage};
use std::io::Write;
use std::path::Path;

/// Quality used for lossy output when no explicit value is given.
/// Also passed as compression effort in lossless mode.
pub const DEFAULT_QUALITY: u8 = 80;

/// libwebp speed/size trade-off, 6 is the slowest and smallest
pub const ENCODER_METHOD: i32 = 6;

/// How WebP output is compressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeSettings {
    #[default]
    Lossless,
    Lossy { quality: u8 },
}

impl EncodeSettings {
    pub fn from_flags(lossy: bool, quality: Option<u8>) -> Self {
        if lossy {
            EncodeSettings::Lossy {
                quality: quality.unwrap_or(DEFAULT_QUALITY),
            }
        } else {
            EncodeSettings::Lossless
        }
    }

    fn lossless(&self) -> bool {
        matches!(self, EncodeSettings::Lossless)
    }

    fn quality(&self) -> f32 {
        match self {
            EncodeSettings::Lossless => DEFAULT_QUALITY as f32,
            EncodeSettings::Lossy { quality } => *quality as f32,
        }
    }
}

/// Encode an opaque image as WebP
pub fn encode_rgb(img: &RgbImage, settings: EncodeSettings) -> Result<Vec<u8>> {
    let encoder = webp::Encoder::from_rgb(img.as_raw(), img.width(), img.height());
    encode_with(encoder, settings)
}

/// Encode an image with alpha channel as WebP
pub fn encode_rgba(img: &RgbaImage, settings: EncodeSettings) -> Result<Vec<u8>> {
    let encoder = webp::Encoder::from_rgba(img.as_raw(), img.width(), img.height());
    encode_with(encoder, settings)
}

/// Encoder configuration for `settings`
pub fn webp_config(settings: EncodeSettings) -> Result<webp::WebPConfig> {
    let mut config = webp::WebPConfig::new()
        .map_err(|_| anyhow::anyhow!("Failed to initialize WebP encoder configuration"))?;

    let lossless = settings.lossless();
    config.lossless = i32::from(lossless);
    config.alpha_compression = i32::from(!lossless);
    config.quality = settings.quality();
    config.method = ENCODER_METHOD;

    Ok(config)
}

fn encode_with(encoder: webp::Encoder<'_>, settings: EncodeSettings) -> Result<Vec<u8>> {
    let config = webp_config(settings)?;
    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| anyhow::anyhow!("WebP encoding failed: {:?}", e))?;
    Ok(memory.to_vec())
}

/// Write `bytes` to `path` through a temporary sibling file.
///
/// The temporary lives in the same directory so the final rename stays on one
/// filesystem. If anything fails the temporary is removed and `path` keeps its
/// previous content.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".webp-square-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    temp.write_all(bytes)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush temporary file for {}", path.display()))?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
