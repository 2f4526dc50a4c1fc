mod app;

use anyhow::Context;
use covidx_core::ServiceConfig;
use directories_next::ProjectDirs;
use eframe::NativeOptions;
use std::path::PathBuf;

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "covidx", "CovidX").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = match ServiceConfig::load(config_path().as_deref()).context("loading config") {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("{e:#}; falling back to default endpoints");
            ServiceConfig::default()
        }
    };
    tracing::info!(
        "detection: {}, prediction: {}",
        config.detection_url,
        config.prediction_url
    );

    let options = NativeOptions::default();
    if let Err(e) = eframe::run_native(
        "CovidX",
        options,
        Box::new(move |_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(app::UiApp::new(config)))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}
