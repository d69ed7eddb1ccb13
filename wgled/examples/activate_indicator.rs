//! One-shot connectivity test: light a single indicator and exit
//!
//! ```text
//! BOARD_IP=192.168.0.10 INDICATOR=3 cargo run --example activate_indicator
//! ```
//!
//! Set `LED_ON=1` to send the LED-on frame (function 0xA0) instead.

use std::sync::Arc;

use wgled::{BoardIdentity, Controller, IndicatorId};
use wgled_transport::UdpTransport;

#[tokio::main]
async fn main() -> wgled::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // Change to your board address and serial
    let ip = std::env::var("BOARD_IP").unwrap_or_else(|_| "255.255.255.255".to_string());
    let serial = std::env::var("BOARD_SERIAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(175_111_864);
    let indicator = std::env::var("INDICATOR")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(IndicatorId::new)
        .unwrap_or(IndicatorId::new(1));

    let mut transport = UdpTransport::new().with_broadcast(true);
    transport.bind().await?;

    let board = BoardIdentity::new(ip, 60000, serial);
    println!("Activating indicator {} on {}...", indicator, board);

    let controller = Controller::new(board, 1, Arc::new(transport));
    let sequence = if std::env::var_os("LED_ON").is_some() {
        controller.led_on(indicator).await?
    } else {
        controller.activate(indicator).await?
    };

    println!("✓ Frame sent (seq {})", sequence);
    Ok(())
}
