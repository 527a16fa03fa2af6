use anyhow::{Context, Result};
use image::GenericImageView;
use std::path::Path;

use super::color_mode::{classify, ColorMode};
use super::encode::{encode_rgb, encode_rgba, write_atomically};
use super::resize::{fit_within, resize_if_needed};
use super::{FileOutcome, ProcessingConfig, SkipReason};
use crate::utils::derive_output_path;

/// Convert a single PNG/JPEG file to WebP next to the source.
///
/// The decoded buffers are owned by this function and dropped before it
/// returns, whatever the outcome.
pub fn convert_file(input_path: &Path, config: &ProcessingConfig) -> Result<FileOutcome> {
    let output_path = derive_output_path(input_path);

    if output_path.exists() && !config.overwrite {
        return Ok(FileOutcome::Skipped {
            output_path,
            reason: SkipReason::OutputExists,
        });
    }

    let img = image::open(input_path)
        .with_context(|| format!("Failed to open image: {}", input_path.display()))?;

    let color_mode = classify(&img);
    let (width, height) = fit_within(img.dimensions(), config.max_width, config.max_height);

    let bytes = match color_mode {
        ColorMode::Opaque => {
            let rgb = resize_if_needed(img.into_rgb8(), width, height)?;
            encode_rgb(&rgb, config.encode)?
        }
        ColorMode::AlphaCapable => {
            let rgba = resize_if_needed(img.into_rgba8(), width, height)?;
            encode_rgba(&rgba, config.encode)?
        }
    };

    write_atomically(&output_path, &bytes)
        .with_context(|| format!("Failed to save WebP: {}", output_path.display()))?;

    Ok(FileOutcome::Converted {
        output_path,
        color_mode,
        dimensions: (width, height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::EncodeSettings;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png_rgb(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([200, 40, 40]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    fn open_webp(path: &Path) -> image::DynamicImage {
        let bytes = std::fs::read(path).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::WebP).unwrap()
    }

    #[test]
    fn test_convert_opaque_png() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        write_png_rgb(&input, 40, 30);

        let outcome = convert_file(&input, &ProcessingConfig::default()).unwrap();

        let output = dir.path().join("photo.webp");
        match outcome {
            FileOutcome::Converted {
                output_path,
                color_mode,
                dimensions,
            } => {
                assert_eq!(output_path, output);
                assert_eq!(color_mode, ColorMode::Opaque);
                assert_eq!(dimensions, (40, 30));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let decoded = open_webp(&output);
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.to_rgb8().get_pixel(10, 10), &Rgb([200, 40, 40]));
    }

    #[test]
    fn test_convert_jpeg_with_uppercase_extension() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("holiday.JPEG");
        RgbImage::from_pixel(16, 16, Rgb([10, 120, 220]))
            .save_with_format(&input, ImageFormat::Jpeg)
            .unwrap();

        convert_file(&input, &ProcessingConfig::default()).unwrap();

        assert_eq!(open_webp(&dir.path().join("holiday.webp")).dimensions(), (16, 16));
    }

    /// 4x4 indexed PNG: left half uses the opaque index 1, right half the
    /// fully transparent index 0 declared in the tRNS chunk
    fn write_indexed_png_with_trns(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 4, 4);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(vec![0, 0, 0, 30, 160, 90]);
        encoder.set_trns(vec![0u8, 255]);

        let indices: Vec<u8> = (0..16).map(|i| if i % 4 < 2 { 1 } else { 0 }).collect();
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&indices).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_palette_png_with_trns_is_alpha_capable() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("palette.png");
        write_indexed_png_with_trns(&input);

        let outcome = convert_file(&input, &ProcessingConfig::default()).unwrap();
        assert!(matches!(
            outcome,
            FileOutcome::Converted {
                color_mode: ColorMode::AlphaCapable,
                dimensions: (4, 4),
                ..
            }
        ));

        let decoded = open_webp(&dir.path().join("palette.webp"));
        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.get_pixel(3, 0)[3], 0);
        assert_eq!(decoded.get_pixel(0, 0), Rgba([30, 160, 90, 255]));
    }

    #[test]
    fn test_transparent_png_keeps_alpha() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("logo.png");
        RgbaImage::from_fn(50, 50, |x, _| {
            if x < 25 {
                Rgba([0, 0, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
        .save_with_format(&input, ImageFormat::Png)
        .unwrap();

        let outcome = convert_file(&input, &ProcessingConfig::default()).unwrap();
        assert!(matches!(
            outcome,
            FileOutcome::Converted {
                color_mode: ColorMode::AlphaCapable,
                ..
            }
        ));

        let decoded = open_webp(&dir.path().join("logo.webp"));
        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.get_pixel(40, 10)[3], 0);
        assert_eq!(decoded.get_pixel(10, 10)[3], 255);
    }

    #[test]
    fn test_existing_output_is_skipped_and_untouched() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        write_png_rgb(&input, 20, 20);
        let output = dir.path().join("photo.webp");
        std::fs::write(&output, b"not really a webp").unwrap();

        let outcome = convert_file(&input, &ProcessingConfig::default()).unwrap();

        assert!(matches!(
            outcome,
            FileOutcome::Skipped {
                reason: SkipReason::OutputExists,
                ..
            }
        ));
        assert_eq!(std::fs::read(&output).unwrap(), b"not really a webp");
    }

    #[test]
    fn test_existing_output_is_replaced_with_overwrite() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        write_png_rgb(&input, 20, 20);
        let output = dir.path().join("photo.webp");
        std::fs::write(&output, b"stale").unwrap();

        let config = ProcessingConfig {
            overwrite: true,
            ..ProcessingConfig::default()
        };
        convert_file(&input, &config).unwrap();

        assert_eq!(open_webp(&output).dimensions(), (20, 20));
    }

    #[test]
    fn test_max_dimensions_downscale_only() {
        let dir = TempDir::new().unwrap();
        let big = dir.path().join("big.png");
        let small = dir.path().join("small.png");
        write_png_rgb(&big, 400, 200);
        write_png_rgb(&small, 50, 20);

        let config = ProcessingConfig {
            max_width: Some(100),
            max_height: Some(100),
            encode: EncodeSettings::Lossy { quality: 75 },
            ..ProcessingConfig::default()
        };
        convert_file(&big, &config).unwrap();
        convert_file(&small, &config).unwrap();

        assert_eq!(open_webp(&dir.path().join("big.webp")).dimensions(), (100, 50));
        assert_eq!(open_webp(&dir.path().join("small.webp")).dimensions(), (50, 20));
    }

    #[test]
    fn test_corrupt_input_reports_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"definitely not a png").unwrap();

        let err = convert_file(&input, &ProcessingConfig::default()).unwrap_err();

        assert!(format!("{:#}", err).contains("broken.png"));
        assert!(!dir.path().join("broken.webp").exists());
    }
}
