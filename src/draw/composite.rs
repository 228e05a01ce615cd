use crate::draw::model::Color;
use crate::draw::render::fill;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageResult, RgbaImage};

/// Copy `raster` onto a fresh buffer of the same size that was first filled
/// with `background`, so the result carries no transparency.
pub fn flatten_over_background(raster: &RgbaImage, background: Color) -> RgbaImage {
    let mut output = RgbaImage::new(raster.width(), raster.height());
    fill(&mut output, background);
    blend_in_place(&mut output, raster);
    output
}

pub fn encode_png(raster: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        raster.as_raw(),
        raster.width(),
        raster.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Flatten and encode the raster into the PNG asset that gets uploaded.
pub fn export_png(raster: &RgbaImage, background: Color) -> ImageResult<Vec<u8>> {
    encode_png(&flatten_over_background(raster, background))
}

fn blend_in_place(base: &mut RgbaImage, top: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(top.pixels()) {
        dst.0 = blend_pixel(dst.0, src.0);
    }
}

fn blend_pixel(bottom: [u8; 4], top: [u8; 4]) -> [u8; 4] {
    let sa = top[3] as f32 / 255.0;
    let da = bottom[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return [0, 0, 0, 0];
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    [
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}
