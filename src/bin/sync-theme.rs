// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use bootstrap::{
    path::{default_alacritty_config, default_vscodium_settings},
    theme::sync_theme,
};

use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Copy terminal colors and font from Alacritty into VSCodium.
#[derive(Debug, Clone, Parser)]
#[command(about, version)]
struct Cli {
    /// Path to Alacritty's YAML configuration.
    #[arg(long, value_name = "path")]
    pub alacritty: Option<PathBuf>,

    /// Path to VSCodium's user settings.
    #[arg(long, value_name = "path")]
    pub vscodium: Option<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let alacritty = match cli.alacritty {
        Some(path) => path,
        None => default_alacritty_config()?,
    };
    let vscodium = match cli.vscodium {
        Some(path) => path,
        None => default_vscodium_settings()?,
    };

    sync_theme(alacritty, vscodium)?;

    Ok(())
}
