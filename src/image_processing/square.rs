use anyhow::{Context, Result};
use image::{imageops, DynamicImage, GenericImageView, Pixel, Rgb, RgbImage, RgbaImage};
use std::path::Path;

use super::encode::{encode_rgb, write_atomically};
use super::resize::{fit_square, resize_if_needed};
use super::{ColorMode, FileOutcome, ProcessingConfig, SkipReason};

/// Padding color for the square canvas
pub const CANVAS_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Rewrite a WebP file in place as a `square_size`x`square_size` image.
///
/// The picture is scaled to fit the square (small images are enlarged),
/// centered and flattened onto a white canvas. The original file is only
/// replaced once the new one has been fully written.
pub fn square_file(input_path: &Path, config: &ProcessingConfig) -> Result<FileOutcome> {
    let size = config.square_size;

    let img = image::open(input_path)
        .with_context(|| format!("Failed to open image: {}", input_path.display()))?;
    let (width, height) = img.dimensions();

    if width == size && height == size && !config.square_overwrite {
        return Ok(FileOutcome::Skipped {
            output_path: input_path.to_path_buf(),
            reason: SkipReason::AlreadySquare(size),
        });
    }

    let (fit_width, fit_height) = fit_square((width, height), size);
    let fitted = resize_if_needed(img.into_rgba8(), fit_width, fit_height)?;

    let canvas = compose_on_canvas(&fitted, size);
    drop(fitted);

    let bytes = encode_rgb(&canvas, config.encode)?;
    write_atomically(input_path, &bytes)
        .with_context(|| format!("Failed to save WebP: {}", input_path.display()))?;

    Ok(FileOutcome::Converted {
        output_path: input_path.to_path_buf(),
        color_mode: ColorMode::Opaque,
        dimensions: (size, size),
    })
}

/// Top-left offset that centers a `width`x`height` image on the square.
/// Odd remainders round towards the top-left corner.
pub fn centered_offset(width: u32, height: u32, size: u32) -> (u32, u32) {
    (
        size.saturating_sub(width) / 2,
        size.saturating_sub(height) / 2,
    )
}

/// Paste `img` centered onto a white `size`x`size` canvas, using its alpha
/// channel as the blend mask. The result carries no alpha.
pub fn compose_on_canvas(img: &RgbaImage, size: u32) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(size, size, CANVAS_COLOR.to_rgba());
    let (left, top) = centered_offset(img.width(), img.height(), size);

    // Pixels falling outside the canvas are clipped
    imageops::overlay(&mut canvas, img, left as i64, top as i64);

    DynamicImage::ImageRgba8(canvas).into_rgb8()
}
