mod app;
mod colormap;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::VirViewApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Data directory: first CLI argument, defaulting to ./data.
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    // The viewer cannot render without its backing arrays; a failed load is
    // fatal (only the VIS detilt cube is optional, handled in the loader).
    let bundle = match data::loader::load_bundle(&data_dir) {
        Ok(bundle) => bundle,
        Err(e) => {
            log::error!("cannot start without data bundle: {e:#}");
            eprintln!("Error loading {}: {e:#}", data_dir.display());
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "VIR Cube Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(VirViewApp::new(bundle)))),
    )
}
