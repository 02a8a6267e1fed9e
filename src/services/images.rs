//! News photos are stored as WebP scaled down to the landing page layout.

use anyhow::Context;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, ImageEncoder};

pub const MAX_WIDTH: u32 = 1200;
pub const MAX_HEIGHT: u32 = 800;
pub const WEBP_EXTENSION: &str = "webp";

/// Landscape images are capped by width, portrait and square ones by height.
pub fn target_size(width: u32, height: u32) -> (u32, u32) {
    let scale = |side: u32, limit: u32, whole: u32| -> u32 {
        ((f64::from(side) * f64::from(limit)) / f64::from(whole)).round().max(1.0) as u32
    };
    if width > height {
        if width > MAX_WIDTH {
            return (MAX_WIDTH, scale(height, MAX_WIDTH, width));
        }
    } else if height > MAX_HEIGHT {
        return (scale(width, MAX_HEIGHT, height), MAX_HEIGHT);
    }
    (width, height)
}

/// Decodes any supported format, downsizes per `target_size` and re-encodes as WebP.
pub fn compress_to_webp(bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).context("failed to decode image")?;
    let src = DynamicImage::ImageRgba8(decoded.to_rgba8());
    let (width, height) = target_size(src.width(), src.height());

    let mut dst = Image::new(width, height, PixelType::U8x4);
    Resizer::new()
        .resize(&src, &mut dst, None)
        .context("failed to resize image")?;

    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(dst.buffer(), width, height, ColorType::Rgba8.into())
        .context("failed to encode webp")?;
    Ok(out)
}
