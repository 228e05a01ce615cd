use crate::draw::model::Color;
use image::RgbaImage;

/// Inclusive pixel bounds touched by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl DirtyRect {
    /// Bounds of the segment `a`-`b` grown by `pad` on every side.
    pub fn around(a: (i32, i32), b: (i32, i32), pad: i32) -> Self {
        Self {
            left: a.0.min(b.0) - pad,
            top: a.1.min(b.1) - pad,
            right: a.0.max(b.0) + pad,
            bottom: a.1.max(b.1) + pad,
        }
    }

    /// Intersect with a `width` x `height` raster.
    pub fn clip(self, width: u32, height: u32) -> Option<Self> {
        let clipped = Self {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width as i32 - 1),
            bottom: self.bottom.min(height as i32 - 1),
        };
        (clipped.left <= clipped.right && clipped.top <= clipped.bottom).then_some(clipped)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top + 1).max(0) as u32
    }
}

/// Fill every pixel of `raster` with `color`.
pub fn fill(raster: &mut RgbaImage, color: Color) {
    let rgba = color.to_array();
    for px in raster.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

/// Paint a straight segment with a round brush, so consecutive segments join
/// and end with round caps.
///
/// Returns the area that was touched, clipped to the raster, or `None` when
/// the segment lies entirely outside it.
pub fn draw_segment(
    raster: &mut RgbaImage,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    let brush = RoundBrush::new(stroke_width);
    let dirty = DirtyRect::around(start, end, brush.reach).clip(raster.width(), raster.height())?;

    let mut painted = false;
    for center in LineWalk::new(start, end) {
        painted |= brush.stamp(raster, center, color);
    }
    painted.then_some(dirty)
}

/// Horizontal spans of a filled circle, one per row offset.
struct RoundBrush {
    reach: i32,
    spans: Vec<(i32, i32)>,
}

impl RoundBrush {
    fn new(stroke_width: u32) -> Self {
        let radius = (stroke_width.max(1) as f32 / 2.0).max(0.5);
        let reach = radius.floor() as i32;
        let spans = (-reach..=reach)
            .filter_map(|dy| {
                let half = (radius * radius - (dy * dy) as f32).sqrt().floor() as i32;
                (half >= 0).then_some((dy, half))
            })
            .collect();
        Self { reach, spans }
    }

    /// Paint the brush centred on `center`. Returns whether any pixel was
    /// inside the raster.
    fn stamp(&self, raster: &mut RgbaImage, center: (i32, i32), color: Color) -> bool {
        let (width, height) = (raster.width() as i32, raster.height() as i32);
        let stride = width as usize * 4;
        let rgba = color.to_array();
        let pixels: &mut [u8] = &mut **raster;

        let mut hit = false;
        for &(dy, half) in &self.spans {
            let y = center.1 + dy;
            if !(0..height).contains(&y) {
                continue;
            }
            let from = (center.0 - half).max(0);
            let to = (center.0 + half).min(width - 1);
            if from > to {
                continue;
            }
            let row = y as usize * stride;
            let span = &mut pixels[row + from as usize * 4..row + (to as usize + 1) * 4];
            for px in span.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
            hit = true;
        }
        hit
    }
}

/// Integer points of the line from `start` to `end`, both included.
struct LineWalk {
    at: (i32, i32),
    end: (i32, i32),
    step: (i32, i32),
    delta: (i32, i32),
    err: i32,
    done: bool,
}

impl LineWalk {
    fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        let delta = ((end.0 - start.0).abs(), -(end.1 - start.1).abs());
        Self {
            at: start,
            end,
            step: ((end.0 - start.0).signum(), (end.1 - start.1).signum()),
            delta,
            err: delta.0 + delta.1,
            done: false,
        }
    }
}

impl Iterator for LineWalk {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.at;
        if current == self.end {
            self.done = true;
            return Some(current);
        }
        let doubled = self.err * 2;
        if doubled >= self.delta.1 {
            self.err += self.delta.1;
            self.at.0 += self.step.0;
        }
        if doubled <= self.delta.0 {
            self.err += self.delta.0;
            self.at.1 += self.step.1;
        }
        Some(current)
    }
}
