use crate::draw::input::{InputAdapter, SurfaceRect};
use crate::draw::render::DirtyRect;
use crate::draw::surface::DrawingSurface;
use eframe::egui::{self, pos2, Color32, Rect, Sense, Stroke, TextureHandle, TextureOptions};
use image::RgbaImage;

/// Shows the drawing surface and feeds pointer/touch input into it.
#[derive(Default)]
pub struct CanvasPanel {
    adapter: InputAdapter,
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
}

impl CanvasPanel {
    pub fn ui(&mut self, ui: &mut egui::Ui, surface: &mut DrawingSurface) {
        let (width, height) = surface.dimensions();
        let (rect, _response) = ui.allocate_exact_size(
            egui::vec2(width as f32, height as f32),
            Sense::click_and_drag(),
        );

        let surface_rect = SurfaceRect::from(rect);
        let events = ui.input(|i| i.events.clone());
        let revision_before = surface.revision();
        let mut dirty: Option<DirtyRect> = None;
        for event in self.adapter.translate(&events, surface_rect) {
            if let Some(painted) = surface.apply(&event, Some(surface_rect)) {
                dirty = Some(dirty.map_or(painted, |d| d.union(painted)));
            }
        }

        self.sync_texture(ui.ctx(), surface, revision_before, dirty);
        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        ui.painter()
            .rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::BLACK));
    }

    /// Upload only the painted region when the texture was current before
    /// this frame's strokes; otherwise upload the whole raster.
    fn sync_texture(
        &mut self,
        ctx: &egui::Context,
        surface: &DrawingSurface,
        revision_before: u64,
        dirty: Option<DirtyRect>,
    ) {
        if self.texture.is_some() && self.uploaded_revision == Some(surface.revision()) {
            return;
        }
        let incremental = self.uploaded_revision == Some(revision_before);
        let raster = surface.raster();
        match (&mut self.texture, dirty) {
            (Some(texture), Some(dirty)) if incremental => texture.set_partial(
                [dirty.left as usize, dirty.top as usize],
                region_image(raster, dirty),
                TextureOptions::NEAREST,
            ),
            (Some(texture), _) => texture.set(full_image(raster), TextureOptions::NEAREST),
            (None, _) => {
                self.texture = Some(ctx.load_texture(
                    "sketch-surface",
                    full_image(raster),
                    TextureOptions::NEAREST,
                ))
            }
        }
        self.uploaded_revision = Some(surface.revision());
    }
}

fn full_image(raster: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [raster.width() as usize, raster.height() as usize],
        raster.as_raw(),
    )
}

/// Copy of the pixels inside `dirty`, which must already be clipped to the
/// raster.
fn region_image(raster: &RgbaImage, dirty: DirtyRect) -> egui::ColorImage {
    let region = image::imageops::crop_imm(
        raster,
        dirty.left as u32,
        dirty.top as u32,
        dirty.width(),
        dirty.height(),
    )
    .to_image();
    egui::ColorImage::from_rgba_unmultiplied(
        [region.width() as usize, region.height() as usize],
        region.as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{Color, StrokePoint, SurfaceStyle};

    #[test]
    fn region_image_copies_only_the_dirty_pixels() {
        let mut surface = DrawingSurface::new(40, 30, SurfaceStyle::default());
        surface.begin_stroke(StrokePoint::new(10.0, 10.0));
        let dirty = surface
            .extend_stroke(StrokePoint::new(20.0, 12.0))
            .expect("painted");

        let region = region_image(surface.raster(), dirty);
        assert_eq!(
            region.size,
            [dirty.width() as usize, dirty.height() as usize]
        );
        assert!(region.size[0] < 40 && region.size[1] < 30);

        let [r, g, b, a] = Color::BLACK.to_array();
        let black = Color32::from_rgba_unmultiplied(r, g, b, a);
        let local = (10 - dirty.left) as usize + (10 - dirty.top) as usize * region.size[0];
        assert_eq!(region.pixels[local], black);
    }
}
