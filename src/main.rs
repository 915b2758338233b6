//! salesboard - Product Sales Dashboard & Housing Chart API

use anyhow::Context;
use clap::Parser;
use salesboard::config::{Cli, Command, DashboardArgs, ServeArgs};
use salesboard::server::{self, ApiState};
use salesboard::{gui, Dashboard, HousingTable, SalesTable};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level());
    debug!("{cli:?}");

    let result = match cli.command() {
        Command::Dashboard(args) => run_dashboard(args),
        Command::Serve(args) => run_server(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_dashboard(args: &DashboardArgs) -> anyhow::Result<()> {
    // The window only opens once the whole dataset has loaded.
    let table = SalesTable::load(args.data(), args.encodings())
        .with_context(|| format!("Failed to load sales data from {}", args.data().display()))?;
    let dashboard =
        Dashboard::new(table, args.top_n()).context("Failed to rank product lines")?;
    info!("Dropdown options: {:?}", dashboard.options());

    let dataset = args
        .data()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    gui::run(dashboard, dataset).map_err(|e| anyhow::anyhow!("Dashboard window failed: {e}"))
}

fn run_server(args: &ServeArgs) -> anyhow::Result<()> {
    let housing = HousingTable::load(args.data(), args.encodings()).with_context(|| {
        format!("Failed to load housing data from {}", args.data().display())
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    runtime
        .block_on(server::run(args.addr(), ApiState::new(housing)))
        .with_context(|| format!("Housing API on {} stopped", args.addr()))
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // RUST_LOG does not exist; use the requested level for this crate only.
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
