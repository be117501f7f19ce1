// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box labeler
//!
//! A cross-platform desktop application for drawing class-labeled bounding
//! boxes over a directory of images, producing object-detection datasets.

mod app;
mod config;
mod interaction;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::LabelerApp;
use clap::Parser;
use config::Config;
use std::path::PathBuf;

/// Draw and persist bounding box annotations over a directory of images.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Image directory (a folder picker is shown when omitted)
    dir: Option<PathBuf>,

    /// Settings file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Annotation file, overriding the settings file
    #[arg(long)]
    annotations: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.annotations {
        config.annotation_file = path;
    }

    let dir = match cli.dir {
        Some(dir) => dir,
        None => match rfd::FileDialog::new()
            .set_title("Select Image Directory")
            .pick_folder()
        {
            Some(dir) => dir,
            None => {
                log::info!("No directory selected, exiting");
                return Ok(());
            }
        },
    };

    let images = io::media::scan_directory(&dir, &config.extensions)?;
    if images.is_empty() {
        let message = format!("No images found in {}", dir.display());
        log::error!("{}", message);
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title("No images")
            .set_description(message.as_str())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
        std::process::exit(1);
    }

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([640.0, 480.0])
            .with_title(format!("Bounding Box Labeler - {}", dir.display())),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "bbox-labeler",
        options,
        Box::new(move |_cc| Ok(Box::new(LabelerApp::new(images, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
