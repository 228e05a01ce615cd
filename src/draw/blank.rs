use crate::draw::composite::encode_png;
use crate::draw::model::Color;
use crate::draw::render::fill;
use image::{ImageResult, RgbaImage};

pub fn blank_reference(width: u32, height: u32, background: Color) -> RgbaImage {
    let mut reference = RgbaImage::new(width, height);
    fill(&mut reference, background);
    reference
}

/// Whether `raster` is indistinguishable from an untouched surface.
///
/// Both rasters go through the same PNG encoder and the encoded bytes are
/// compared, so any single differing pixel makes the canvas non-blank.
pub fn is_blank(raster: &RgbaImage, background: Color) -> ImageResult<bool> {
    let reference = blank_reference(raster.width(), raster.height(), background);
    Ok(encode_png(&reference)? == encode_png(raster)?)
}
