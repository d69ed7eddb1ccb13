//! `wgled` - scan-driven shelf indicator console
//!
//! ```text
//! wgled [CONFIG.toml]
//! ```
//!
//! Log level is taken from `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wgled::{Beacon, Config, Controller, Workflow};
use wgled_transport::{Transport, UdpTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::resolve(path).context("failed to load configuration")?;

    let mut transport = UdpTransport::new()
        .with_bind_addr(config.board.bind_address.clone())
        .with_broadcast(true);
    transport
        .bind()
        .await
        .with_context(|| format!("failed to bind UDP socket on {}", config.board.bind_address))?;

    let board = config.board_identity();
    info!(
        board = %board,
        transport = %transport.describe(),
        policy = %config.workflow.release_policy,
        "Controller ready"
    );

    let controller = Arc::new(
        Controller::new(board, config.board.door, Arc::new(transport))
            .with_release_policy(config.workflow.release_policy),
    );
    let beacon = Beacon::spawn(controller.clone(), config.beacon_config());
    let catalog = config.catalog()?;

    println!("Scan a product code to import, or a tag to export.");
    for (product, indicator) in catalog.products() {
        println!("  {} -> indicator {}", product, indicator);
    }
    println!(
        "Type '{}' after picking an item, '{}' to quit.",
        config.workflow.confirm_token, config.workflow.exit_token
    );

    let workflow = Workflow::new(catalog, config.scan_tokens(), controller, beacon);
    wgled::console::run(workflow, BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
