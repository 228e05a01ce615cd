use crate::queue::model::QueueStatus;
use crate::queue::sync::{QueueDisplay, QueueSync};
use eframe::egui::{self, Color32, RichText};

pub const LOADING_TEXT: &str = "Loading queue...";
pub const EMPTY_TEXT: &str = "No drawings in queue";

fn status_color(status: QueueStatus) -> Color32 {
    match status {
        QueueStatus::Pending => Color32::GRAY,
        QueueStatus::Processing => Color32::from_rgb(200, 140, 0),
        QueueStatus::Completed => Color32::from_rgb(0, 140, 60),
        QueueStatus::Failed => Color32::RED,
        QueueStatus::Unknown => Color32::DARK_GRAY,
    }
}

pub fn ui(ui: &mut egui::Ui, queue: &QueueSync) {
    ui.heading("Drawing Queue");
    match queue.display() {
        QueueDisplay::Loading => {
            ui.label(LOADING_TEXT);
        }
        QueueDisplay::Empty => {
            ui.label(EMPTY_TEXT);
        }
        QueueDisplay::Items(items) => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for item in items {
                        ui.label(
                            RichText::new(format!("• {}", item.display_line()))
                                .color(status_color(item.status)),
                        );
                    }
                });
        }
    }
}
