//! DMN Evaluator
//!
//! Accepts email-like payloads (or routing classifications), normalizes them
//! into decision input records and relays each to a remote DMN decision
//! engine.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /evaluate
//!     ─────────────────▶ http ──▶ pipeline ──▶ payload (normalize)
//!                                     │
//!                                     ▼
//!                                   relay ──▶ engine ──────────▶ Decision
//!                                     │        (reqwest)           Engine
//!     { evaluated_at,                 ▼
//!       results }    ◀──────────── envelopes
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;

use dmn_evaluator::config::load_config;
use dmn_evaluator::lifecycle::startup;
use dmn_evaluator::observability::logging;

#[derive(Parser)]
#[command(name = "dmn-evaluator", version, about = "DMN email routing evaluator")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "DMN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("dmn-evaluator v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
