#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba(color.to_array())
    }
}

/// A point in surface-local coordinates. Only meaningful while a stroke is
/// active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub width: u32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 2,
            color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStyle {
    pub background: Color,
    pub stroke: StrokeStyle,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            stroke: StrokeStyle::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_point_rounds_to_nearest_pixel() {
        assert_eq!(StrokePoint::new(1.4, 2.6).to_pixel(), (1, 3));
        assert_eq!(StrokePoint::new(-0.6, 0.4).to_pixel(), (-1, 0));
    }

    #[test]
    fn default_style_is_black_on_white() {
        let style = SurfaceStyle::default();
        assert_eq!(style.background, Color::WHITE);
        assert_eq!(style.stroke.color, Color::BLACK);
        assert_eq!(style.stroke.width, 2);
    }
}
