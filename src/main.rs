// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use bootstrap::{
    interrupt,
    path::{default_config_file, home_dir},
    prompt::{InquirePrompter, LinePrompter},
    system::HostSystem,
    Provisioner, RunConfiguration, Runner, Settings, Step, StepKind,
};

use anyhow::Result;
use clap::Parser;
use std::{
    io::{stdin, stdout, IsTerminal},
    path::PathBuf,
    process::exit,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(about, version)]
struct Cli {
    /// If specified, do not actually run the steps.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Path to settings file.
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Directory holding package lists and shell configuration.
    #[arg(long, value_name = "path")]
    pub data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
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

    let cli = Cli::parse();

    // INVARIANT: Listen for Ctrl-C before the first prompt shows up.
    let _listener = match interrupt::listen() {
        Ok(listener) => listener,
        Err(error) => {
            error!("failed to listen for interrupts: {error:?}");
            exit(1)
        }
    };

    match tokio::task::spawn_blocking(move || run(cli)).await {
        Ok(Ok(())) => exit(0),
        Ok(Err(error)) => error!("{error:?}"),
        Err(error) => error!("{error:?}"),
    }

    exit(1)
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = match cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_or_default(default_config_file()?)?,
    };
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }
    let paths = settings.resolve(home_dir()?)?;

    println!("Welcome to the bootstrap script");
    println!("This script is made to work on Arch linux and its derivatives.");
    if cli.dry_run {
        info!("dry run, no step will be performed");
    }

    let runner = Runner::new(RunConfiguration {
        dry_run: cli.dry_run,
    });
    let steps = Step::sequence(StepKind::ALL);
    let mut provisioner = Provisioner::new(paths, HostSystem::new());

    let result = if stdin().is_terminal() {
        runner.run(steps, &mut InquirePrompter::new(), &mut provisioner, &mut stdout())
    } else {
        let mut prompter = LinePrompter::new(stdin().lock(), stdout());
        runner.run(steps, &mut prompter, &mut provisioner, &mut stdout())
    };

    match result {
        Ok(summary) => {
            if summary.dry_run {
                info!("announced {} step(s), performed none", summary.announced.len());
            } else {
                info!("finished {} step(s)", summary.performed.len());
            }
            Ok(())
        }
        Err(error) if error.is_interrupted() => interrupt::acknowledge(),
        Err(error) => Err(error.into()),
    }
}
