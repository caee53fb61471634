use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sei_wallet_tracker::api::{self, AppState};
use sei_wallet_tracker::cli::{Cli, Commands};
use sei_wallet_tracker::report::{Dashboard, ReportOptions};
use sei_wallet_tracker::source::ScanRange;
use sei_wallet_tracker::{config, tracker};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr) // stdout is reserved for `fetch` output
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load()?;
    let sources = tracker::build_sources(&cfg)?;
    let report = ReportOptions {
        value_decimals: cfg.value_decimals,
        ..ReportOptions::default()
    };

    match cli.command {
        Commands::Serve { port } => {
            let state = AppState {
                sources,
                scan_blocks: cfg.scan_blocks,
                report,
            };
            let port = port.unwrap_or(cfg.port);

            info!("Sei wallet tracker starting...");
            tokio::select! {
                res = api::serve(port, state) => match res {
                    Ok(()) => info!("API exited cleanly"),
                    Err(e) => error!("API error: {:?}", e),
                },
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping...");
                }
            }
            info!("Sei wallet tracker stopped.");
        }
        Commands::Fetch { address, rpc, blocks } => {
            let range = ScanRange::Latest {
                blocks: blocks.unwrap_or(cfg.scan_blocks),
            };
            let (source, result) =
                tracker::fetch_and_normalize(&sources, &address, !rpc, range).await?;
            let dashboard = Dashboard::build(address.trim(), source, &result, &report);
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
    }

    Ok(())
}
