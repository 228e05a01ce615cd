mod canvas_panel;
pub mod queue_panel;

pub use canvas_panel::CanvasPanel;

use crate::backend::QueueBackend;
use crate::draw::model::{Color, StrokeStyle, SurfaceStyle};
use crate::draw::surface::DrawingSurface;
use crate::queue::sync::QueueSync;
use crate::settings::Settings;
use crate::submit::Submitter;
use eframe::egui::{self, Color32};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often the UI wakes up on its own to expire status messages.
const IDLE_REPAINT: Duration = Duration::from_millis(250);

pub struct SketchApp {
    surface: DrawingSurface,
    canvas: CanvasPanel,
    submitter: Submitter,
    queue: QueueSync,
    pub author: String,
}

impl SketchApp {
    pub fn new(ctx: &egui::Context, settings: &Settings, backend: Arc<dyn QueueBackend>) -> Self {
        let repaint_ctx = ctx.clone();
        let queue = QueueSync::mount(
            Arc::clone(&backend),
            settings.poll_interval(),
            Some(Box::new(move || repaint_ctx.request_repaint())),
        );
        let submitter = Submitter::new(
            backend,
            Box::new(queue.refresh_handle()),
            settings.submit_config(),
        );
        let style = SurfaceStyle {
            background: Color::WHITE,
            stroke: StrokeStyle {
                width: settings.stroke_width.max(1),
                color: Color::BLACK,
            },
        };
        Self {
            surface: DrawingSurface::new(settings.canvas_width, settings.canvas_height, style),
            canvas: CanvasPanel::default(),
            submitter,
            queue,
            author: String::new(),
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.queue.pump();
        self.submitter.poll(&mut self.surface, now);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Draw Something");

            ui.horizontal(|ui| {
                let label = if self.submitter.config().require_name {
                    "Name:"
                } else {
                    "Name (optional):"
                };
                ui.label(label);
                ui.add(egui::TextEdit::singleline(&mut self.author).hint_text("Enter your name"));
            });

            self.canvas.ui(ui, &mut self.surface);

            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    self.surface.reset();
                }
                let submit =
                    ui.add_enabled(!self.submitter.is_busy(), egui::Button::new("Submit"));
                if submit.clicked() {
                    self.submitter.submit(&self.surface, &self.author, now);
                }
            });

            if let Some(status) = self.submitter.status(now) {
                ui.colored_label(Color32::RED, status);
            }

            ui.separator();
            queue_panel::ui(ui, &self.queue);
        });

        ctx.request_repaint_after(IDLE_REPAINT);
    }
}
