#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = drawing_pad::DrawingConfig::load_or_default();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Drawing Pad")
            .with_inner_size([480.0, 800.0])
            .with_min_inner_size([320.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Drawing Pad",
        native_options,
        Box::new(|cc| Ok(Box::new(drawing_pad::DrawingApp::new(cc, config)))),
    )
}
