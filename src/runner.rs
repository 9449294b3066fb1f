//! Runs the preview app

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, run_native};
use egui::ViewportBuilder;
use log::debug;

use crate::{Args, preview::PreviewApp};

const APP_ID: &str = "csv-preview";
const WINDOW_TITLE: &str = "CSV preview";
/// Initial window size in logical pixels
const WINDOW_SIZE: [f32; 2] = [700.0, 600.0];

/// Runs the preview app, opening `args.path` first if one was given
pub fn run_preview(args: Args) -> Result<()> {
    debug!("Starting with {:?}", args);
    let mut app = PreviewApp::new(args.page_size);
    if let Some(path) = args.path {
        app.open_file(path);
    }

    let viewport = ViewportBuilder::default()
        .with_app_id(APP_ID)
        .with_title(WINDOW_TITLE)
        .with_inner_size(WINDOW_SIZE);
    let native_options = NativeOptions {
        viewport,
        ..Default::default()
    };
    run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|_| anyhow!("Failed to run native app"))?;

    Ok(())
}
