// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod drivers;
mod engine;
mod gui;
mod plotter;
mod types;
use anyhow::Context;
use eframe::egui;
use config::PlotterConfig;
use plotter::Plotter;
// Entry point
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = PlotterConfig::load()?;
    let plotter = Plotter::new(&config).context("failed to initialize plotter")?;
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 700.0])
        .with_min_inner_size([800.0, 500.0])
        .with_title("Michelin-Plotter");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Michelin-Plotter",
        options,
        Box::new(move |_cc| Box::new(gui::PlotterApp::new(plotter, &config))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
