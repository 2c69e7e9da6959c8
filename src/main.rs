#![forbid(unsafe_code)]

mod config;
mod constants;
mod gui;
mod ledger;
mod media;
mod session;
mod theme;
mod watcher;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

/// Label media files into two classes, one at a time, recording a bias score
/// per file into a CSV ledger.
#[derive(Debug, Parser)]
#[command(name = "media-labeler", version, about)]
struct Args {
    /// Theme file to load instead of the default one under the home directory
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Log verbosity: trace, debug, info, warn or error (LOG_LEVEL env var
    /// works too)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level_name = args
        .log_level
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    let log_level = match level_name.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // A missing or unparseable theme is a fatal startup failure.
    let theme_path = match args.theme {
        Some(path) => path,
        None => constants::app::default_theme_path()
            .ok_or_else(|| anyhow!("home directory could not be resolved"))?,
    };
    let theme = theme::Theme::load(&theme_path)
        .with_context(|| format!("couldn't load application theme: {}", theme_path.display()))?;
    info!(theme = %theme_path.display(), "theme loaded");

    gui::run(theme)
}
