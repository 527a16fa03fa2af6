use anyhow::Result;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{ImageBuffer, Pixel, Rgb, Rgba};

/// Pixel layouts that can be handed to `fast_image_resize` without conversion
pub trait ResizablePixel: Pixel<Subpixel = u8> {
    const PIXEL_TYPE: PixelType;
}

impl ResizablePixel for Rgb<u8> {
    const PIXEL_TYPE: PixelType = PixelType::U8x3;
}

impl ResizablePixel for Rgba<u8> {
    const PIXEL_TYPE: PixelType = PixelType::U8x4;
}

/// Dimensions that fit `(width, height)` inside the optional bounds.
///
/// A missing bound falls back to the image's own dimension. The result is never
/// larger than the source: images that already fit are returned unchanged.
pub fn fit_within(
    dimensions: (u32, u32),
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    let (width, height) = dimensions;
    let bound_width = max_width.unwrap_or(width);
    let bound_height = max_height.unwrap_or(height);

    if width <= bound_width && height <= bound_height {
        return dimensions;
    }

    let scale = (bound_width as f64 / width as f64).min(bound_height as f64 / height as f64);
    scaled_dimensions(dimensions, scale)
}

/// Dimensions that fit `(width, height)` inside a `size`x`size` square.
///
/// Unlike [`fit_within`] this also enlarges images smaller than the square.
pub fn fit_square(dimensions: (u32, u32), size: u32) -> (u32, u32) {
    let (width, height) = dimensions;
    if width == 0 || height == 0 {
        return dimensions;
    }

    let scale = (size as f64 / width as f64).min(size as f64 / height as f64);
    scaled_dimensions(dimensions, scale)
}

fn scaled_dimensions((width, height): (u32, u32), scale: f64) -> (u32, u32) {
    let scaled = |dim: u32| ((dim as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Resize an image to exact dimensions with a Lanczos3 filter
///
/// RGBA buffers are resized with premultiplied alpha so transparent pixels
/// don't bleed their color into the visible edges.
pub fn resize_image<P: ResizablePixel>(
    img: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
) -> Result<ImageBuffer<P, Vec<u8>>> {
    let (src_width, src_height) = img.dimensions();

    if src_width == width && src_height == height {
        return Ok(img.clone());
    }
    if src_width == 0 || src_height == 0 {
        return Err(anyhow::anyhow!("Source image has zero size"));
    }
    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!(
            "Target size must be non-zero, got {}x{}",
            width,
            height
        ));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), P::PIXEL_TYPE)?;
    let mut dst_image = Image::new(width, height, P::PIXEL_TYPE);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer.resize(&src_image, &mut dst_image, Some(&options))?;

    ImageBuffer::from_raw(width, height, dst_image.buffer().to_vec()).ok_or_else(|| {
        anyhow::anyhow!("Resized buffer does not match {}x{}", width, height)
    })
}

/// Like [`resize_image`] but takes ownership, skipping the copy when the
/// buffer already has the requested size.
pub fn resize_if_needed<P: ResizablePixel>(
    img: ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
) -> Result<ImageBuffer<P, Vec<u8>>> {
    if img.dimensions() == (width, height) {
        Ok(img)
    } else {
        resize_image(&img, width, height)
    }
}
