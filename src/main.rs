mod app;
mod backend;
mod collab;
mod config;
mod data;
mod gui;
mod log;
mod platform;

use app::SeqEditorApp;
use config::Settings;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!("Starting MRI Sequence Editor v{}", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            ::log::error!("{}; continuing with default settings", e);
            Settings::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("MRI Sequence Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "MRI Sequence Editor",
        options,
        Box::new(|cc| Ok(Box::new(SeqEditorApp::new(cc, settings)))),
    )
}
