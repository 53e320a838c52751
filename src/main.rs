mod config;
mod controller;
mod gui;
mod mode_selector;
mod preferences;
mod progress;
mod settings_panel;
mod storage;
mod theme;
mod timer;
mod utils;

use log::info;

#[tokio::main]
async fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();
    info!("Starting pomodoro timer");

    let config = config::Config::load();
    let store = storage::JsonFileStore::open(&config.data_dir);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("pomodoro")
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "pomodoro",
        options,
        Box::new(move |cc| Box::new(gui::PomodoroApp::new(cc, &config, store))),
    )
}
