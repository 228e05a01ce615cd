use crate::draw::input::{normalize, InputPhase, SurfaceEvent, SurfaceRect};
use crate::draw::model::{StrokePoint, SurfaceStyle};
use crate::draw::render::{draw_segment, fill, DirtyRect};
use crate::draw::state::{can_transition, DrawingState};
use image::RgbaImage;

/// Owns the raster the user paints on and the stroke state machine.
///
/// Strokes are painted straight into the raster as they arrive; nothing about
/// a stroke survives beyond its pixels.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    raster: RgbaImage,
    style: SurfaceStyle,
    state: DrawingState,
    last_point: Option<StrokePoint>,
    revision: u64,
}

impl DrawingSurface {
    pub fn new(width: u32, height: u32, style: SurfaceStyle) -> Self {
        let mut surface = Self {
            raster: RgbaImage::new(width, height),
            style,
            state: DrawingState::Idle,
            last_point: None,
            revision: 0,
        };
        surface.initialize();
        surface
    }

    /// Paint the background and reset stroke state.
    pub fn initialize(&mut self) {
        fill(&mut self.raster, self.style.background);
        self.state = DrawingState::Idle;
        self.last_point = None;
        self.bump_revision();
    }

    pub fn begin_stroke(&mut self, point: StrokePoint) {
        if self.state.is_drawing() {
            tracing::debug!("stroke started while drawing; closing previous stroke");
            self.end_stroke();
        }
        self.transition(DrawingState::Drawing);
        self.last_point = Some(point);
    }

    /// Append a segment to the active stroke and paint it.
    ///
    /// Input received while no stroke is active is dropped.
    pub fn extend_stroke(&mut self, point: StrokePoint) -> Option<DirtyRect> {
        if !self.state.is_drawing() {
            return None;
        }
        let from = self.last_point.replace(point).unwrap_or(point);
        let dirty = draw_segment(
            &mut self.raster,
            from.to_pixel(),
            point.to_pixel(),
            self.style.stroke.color,
            self.style.stroke.width,
        );
        if dirty.is_some() {
            self.bump_revision();
        }
        dirty
    }

    pub fn end_stroke(&mut self) {
        if self.state.is_drawing() {
            self.transition(DrawingState::Idle);
        }
        self.last_point = None;
    }

    /// Repaint the whole raster with the background, discarding every stroke.
    pub fn reset(&mut self) {
        fill(&mut self.raster, self.style.background);
        self.bump_revision();
    }

    /// Feed one normalized input event into the stroke state machine and
    /// return the pixels it painted, if any.
    ///
    /// `rect` is `None` while the surface is not laid out; events are then
    /// ignored.
    pub fn apply(&mut self, event: &SurfaceEvent, rect: Option<SurfaceRect>) -> Option<DirtyRect> {
        let rect = rect?;
        let point = event.input.as_ref().and_then(|input| normalize(input, rect));
        match (event.phase, point) {
            (InputPhase::Start, Some(point)) => {
                self.begin_stroke(point);
                None
            }
            (InputPhase::Move, Some(point)) => self.extend_stroke(point),
            (InputPhase::End, _) => {
                self.end_stroke();
                None
            }
            (_, None) => None,
        }
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn style(&self) -> SurfaceStyle {
        self.style
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Incremented on every pixel mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn transition(&mut self, to: DrawingState) {
        debug_assert!(can_transition(self.state, to));
        self.state = to;
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
