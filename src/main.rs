use sketch_queue::backend::{HttpBackend, QueueBackend};
use sketch_queue::gui::SketchApp;
use sketch_queue::logging;
use sketch_queue::settings::Settings;

use eframe::egui;
use std::path::Path;
use std::sync::Arc;

const SETTINGS_FILE: &str = "settings.json";

fn spawn_health_probe(backend: Arc<HttpBackend>) {
    std::thread::spawn(move || match backend.health() {
        Ok(()) => tracing::info!(url = %backend.base_url(), "backend reachable"),
        Err(err) => tracing::warn!(url = %backend.base_url(), "backend not reachable: {err}"),
    });
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let first_run = !Path::new(SETTINGS_FILE).exists();
    let mut settings = Settings::load(SETTINGS_FILE)?;
    if first_run {
        settings.save(SETTINGS_FILE)?;
    }
    settings.apply_env();
    logging::init(settings.debug_logging, settings.log_file.as_deref());
    if first_run {
        tracing::info!(path = SETTINGS_FILE, "wrote default settings");
    }
    tracing::info!(
        backend = %settings.backend_url,
        require_name = settings.require_name,
        "starting sketch queue"
    );

    let http = Arc::new(HttpBackend::new(&settings.backend_url, settings.request_timeout())?);
    spawn_health_probe(Arc::clone(&http));
    let backend: Arc<dyn QueueBackend> = http;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 720.0])
            .with_min_inner_size([340.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sketch Queue",
        native_options,
        Box::new(move |cc| Box::new(SketchApp::new(&cc.egui_ctx, &settings, backend))),
    )
    .map_err(|err| anyhow::anyhow!("gui failed: {err}"))
}
