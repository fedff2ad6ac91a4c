mod app;
mod charts;
mod color;
mod config;
mod data;
mod selection;
mod state;
mod ui;

use anyhow::Context;
use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::discover().unwrap_or_else(|e| {
        log::error!("Falling back to default config: {e:#}");
        DashboardConfig::default()
    });
    let data_dir = config.data_dir.clone();

    let mut state = AppState::new(config).context("starting dashboard")?;
    if let Some(dir) = data_dir.filter(|d| d.is_dir()) {
        state.load_folder(&dir)?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "World Happiness Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
