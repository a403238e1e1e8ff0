//! # wirecheck-cli
//!
//! Binary entry point for the Wirecheck harness.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Configuration loading (file plus environment overrides)
//! - The `serve` loop exposing the responder and test surface over HTTP
//! - One-shot test execution via `wirecheck run`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::future::IntoFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use wirecheck_core::{HarnessConfig, RelayConsumer};
use wirecheck_server::{build_router, build_state, AppState};

/// Wirecheck - black-box test harness for webhook-driven call flows
#[derive(Parser, Debug)]
#[command(name = "wirecheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, default_value = "wirecheck.yml", global = true)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the responder endpoints and wait for run requests (default)
    Serve,

    /// Run the registered tests once and exit nonzero on failure
    Run {
        /// Run a single test label instead of the whole registry
        #[arg(long)]
        test: Option<String>,
    },

    /// Load the configuration, report warnings and list the registry
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Run { test }) => run_command(config, test).await,
        Some(Commands::Check) => check_command(config),
        Some(Commands::Serve) | None => serve_command(config).await,
    }
}

/// Loads the config file (when present), applies environment overrides and
/// logs validation warnings. Missing settings degrade capabilities, they
/// never abort startup.
fn load_config(path: &Path) -> Result<HarnessConfig> {
    let mut config = if path.exists() {
        HarnessConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?
    } else {
        warn!("Config file {:?} not found, using defaults", path);
        HarnessConfig::default()
    };
    config.apply_env();

    for warning in config.validate() {
        warn!("{warning}");
    }
    Ok(config)
}

async fn serve_command(config: HarnessConfig) -> Result<()> {
    let http_port = config.target.http_port;
    let alt_port = config.target.alt_port;
    let relay_context = config.relay.context.clone();

    let state = build_state(config)?;
    info!(
        tests = state.runner.registry().len(),
        "Test registry assembled"
    );

    // The relay transport feeds inbound calls through this channel. The
    // sender stays alive for the process lifetime so the consumer keeps
    // listening even while no transport is attached.
    let _relay_feed = match relay_context {
        Some(context) => {
            let (tx, rx) = mpsc::channel(8);
            tokio::spawn(RelayConsumer::new(context, rx).run());
            Some(tx)
        }
        None => None,
    };

    let primary = bind(&state, http_port).await?;
    if alt_port != http_port {
        let alternate = bind(&state, alt_port).await?;
        tokio::try_join!(primary, alternate)?;
    } else {
        primary.await?;
    }
    Ok(())
}

/// Binds one listener and returns the serve future for it.
async fn bind(
    state: &Arc<AppState>,
    port: u16,
) -> Result<impl std::future::Future<Output = std::io::Result<()>>> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    info!(port, "Listening");
    Ok(axum::serve(listener, build_router(Arc::clone(state))).into_future())
}

async fn run_command(config: HarnessConfig, test: Option<String>) -> Result<()> {
    let selector = test.or_else(|| config.run_only.clone());
    let state = build_state(config)?;

    match selector {
        Some(label) => {
            let outcome = state.runner.run_one(&label).await?;
            match &outcome.result {
                Ok(()) => {
                    println!("Test {} completed successfully.", outcome.label);
                    Ok(())
                }
                Err(err) => anyhow::bail!("Test {} failed: {err}", outcome.label),
            }
        }
        None => {
            let report = state.runner.run_all().await;
            if report.all_passed() {
                println!("All {} tests completed successfully.", report.executed());
                Ok(())
            } else {
                let failed = report.first_failure().unwrap_or("<unknown>");
                anyhow::bail!(
                    "Test {failed} failed after {} of the registered tests ran.",
                    report.executed()
                )
            }
        }
    }
}

fn check_command(config: HarnessConfig) -> Result<()> {
    let state = build_state(config)?;
    println!("Registered tests:");
    for test in state.runner.registry().all() {
        let kind = if test.driver.is_some() {
            "driver"
        } else {
            "responder-only"
        };
        println!("  {:<32} {kind}", test.label);
    }
    println!(
        "Driver configuration {}complete.",
        if state.config.drivers_ready() { "" } else { "in" }
    );
    Ok(())
}
