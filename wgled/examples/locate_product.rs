//! Locate a product: look it up in the catalog and light its indicator once
//!
//! ```text
//! cargo run --example locate_product -- PRD3 [CONFIG.toml]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use wgled::{Config, Controller, Error};
use wgled_transport::UdpTransport;

#[tokio::main]
async fn main() -> wgled::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let code = args.next().unwrap_or_else(|| "PRD1".to_string());
    let config = Config::resolve(args.next().map(PathBuf::from))?;

    let catalog = config.catalog()?;
    let (product, indicator) = catalog
        .lookup(code.trim())
        .ok_or_else(|| Error::Config(format!("product '{}' is not in the catalog", code)))?;

    let mut transport = UdpTransport::new()
        .with_bind_addr(config.board.bind_address.clone())
        .with_broadcast(true);
    transport.bind().await?;

    let controller = Controller::new(config.board_identity(), config.board.door, Arc::new(transport));

    println!("Locating product '{}' on indicator {}...", product, indicator);
    let sequence = controller.activate(indicator).await?;
    println!("✓ Indicator {} lit (seq {})", indicator, sequence);

    Ok(())
}
