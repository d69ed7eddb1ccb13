//! # wgled
//!
//! Shelf-indicator control for scan-driven warehouse workflows over the
//! 64-byte UDP protocol spoken by Wiegand access-controller boards.
//!
//! ## Features
//!
//! - Type-safe frame encoding with a process-wide sequence counter
//! - Async/await API using Tokio
//! - Locate beacon that keeps one indicator lit until confirmed
//! - Import/export workflow driven by product and RFID tag scans
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wgled::{Beacon, Config, Controller, Workflow};
//! use wgled_transport::UdpTransport;
//!
//! #[tokio::main]
//! async fn main() -> wgled::Result<()> {
//!     let config = Config::default();
//!
//!     let mut transport = UdpTransport::new().with_broadcast(true);
//!     transport.bind().await?;
//!
//!     let controller = Arc::new(
//!         Controller::new(config.board_identity(), config.board.door, Arc::new(transport))
//!             .with_release_policy(config.workflow.release_policy),
//!     );
//!     let beacon = Beacon::spawn(controller.clone(), config.beacon_config());
//!     let mut workflow = Workflow::new(config.catalog()?, config.scan_tokens(), controller, beacon);
//!
//!     println!("{}", workflow.handle("PRD1").await);
//!     println!("{}", workflow.handle("TAG-0001").await);
//!
//!     workflow.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod beacon;
pub mod catalog;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod workflow;

#[cfg(test)]
mod testing;

// Re-exports
pub use beacon::{Beacon, BeaconConfig, StopOutcome};
pub use catalog::ProductCatalog;
pub use config::Config;
pub use controller::{Controller, Delivery, ReleasePolicy};
pub use error::{Error, Result};
pub use workflow::{Outcome, Scan, ScanTokens, Workflow, WorkflowState};

// Re-export types
pub use wgled_core::{BoardIdentity, CommandFrame, IndicatorId, SequenceCounter};
pub use wgled_types::{Association, ProductId, TagId};
