mod gui;
mod visual_engine;

use log::{debug, info};
use pulsefx::config::AnalyserConfig;
use pulsefx::controller::SessionController;

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    let analyser_config = AnalyserConfig::default();
    let session = SessionController::new(analyser_config.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 760.0])
            .with_title("PULSE Controller"),
        ..Default::default()
    };

    debug!("Launching GUI...");
    let result = eframe::run_native(
        "PULSE beat visualizer",
        options,
        Box::new(move |_cc| Ok(Box::new(gui::AppState::new(session, analyser_config)))),
    );

    info!("Clean shutdown complete");

    result
}
