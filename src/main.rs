mod app;
mod config;
mod content;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use crate::config::{EngineConfig, load_config};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding projects/_index.json, contacts.json and about.json.
    #[arg(long, default_value = "content")]
    content_dir: PathBuf,
    /// JSON file overriding any of the engine tuning tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for reproducible wandering.
    #[arg(long)]
    seed: Option<u64>,
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => load_config(path).context("loading engine config"),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = match engine_config(&args) {
        Ok(config) => config,
        Err(error) => {
            error!("{error:#}");
            std::process::exit(2);
        }
    };
    if !args.content_dir.is_dir() {
        warn!(
            "content directory {} does not exist; sections will stay empty",
            args.content_dir.display()
        );
    }
    info!("serving content from {}", args.content_dir.display());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "wandergraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::GraphApp::new(
                cc,
                args.content_dir.clone(),
                config.clone(),
                args.seed,
            )))
        }),
    )
}
