// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

//! The `hawk` binary: argument and environment surface around the core.

mod controller;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use controller::{RunOutcome, RuntimeOptions, run};

/// Exit code for persistent terminal write failure.
const EXIT_RENDER_ERROR: u8 = 1;
/// Exit code for usage / argument errors (clap exits with 2 automatically).
#[allow(dead_code)]
const EXIT_USAGE_ERROR: u8 = 2;
/// Exit code when a termination signal ends the run.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "hawk",
    version,
    about = "Terminal renderer for JSON-RPC instrumented applications",
    long_about = "Reads line-delimited JSON-RPC 2.0 from stdin, renders a live \
                  multi-view terminal interface, and replies to the emitting \
                  application on stdout.\n\nUsage: my-app | hawk --app my-app"
)]
struct Cli {
    /// Application name shown in the header.
    #[arg(long, env = "HAWK_APP_NAME", default_value = "hawk")]
    app: String,

    /// Configuration file path (reserved).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Internal log level written to stderr (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Echo the protocol conversation to stderr at debug level.
    #[arg(long)]
    debug: bool,

    /// Color theme (reserved; only the built-in palette ships).
    #[arg(long, env = "HAWK_THEME")]
    theme: Option<String>,

    /// Auto-detect plain log lines on stdin (reserved).
    #[arg(long, env = "HAWK_AUTO_DETECT")]
    auto_detect: bool,

    /// Render tick rate in frames per second, clamped to [1, 120].
    #[arg(long, env = "HAWK_REFRESH_RATE", default_value_t = 60)]
    refresh_rate: u32,
}

impl Cli {
    fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            app_name: self.app.clone(),
            refresh_rate: self.refresh_rate.clamp(1, 120),
        }
    }

    /// The tracing filter derived from `--log-level` and `--debug`.
    fn log_filter(&self) -> String {
        if self.debug {
            format!("{},hawk::protocol=debug", self.log_level)
        } else {
            self.log_level.clone()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout belongs to the reply channel. Once the
    // alternate screen is up, stray log writes vanish with it on exit.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(cli.log_filter()).unwrap_or_else(|_| {
            eprintln!("warning: unrecognized --log-level {:?}, using warn", cli.log_level);
            EnvFilter::new("warn")
        }))
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), "--config is reserved and currently ignored");
    }
    if cli.theme.is_some() || cli.auto_detect {
        tracing::debug!("theme and auto-detect are reserved and currently ignored");
    }

    match run(cli.runtime_options()).await? {
        RunOutcome::Quit => Ok(ExitCode::SUCCESS),
        RunOutcome::Interrupted => Ok(ExitCode::from(EXIT_INTERRUPTED)),
        RunOutcome::RenderFailed => Ok(ExitCode::from(EXIT_RENDER_ERROR)),
    }
}
