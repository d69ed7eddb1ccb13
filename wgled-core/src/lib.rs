//! # wgled-core
//!
//! Core protocol implementation for UDP access-controller boards driving
//! relay/LED indicators.
//!
//! This crate provides the low-level protocol primitives:
//! - Board identity and output addressing
//! - Function codes, the remote-activate and LED-on commands
//! - Fixed 64-byte frame encoding
//! - Process-wide sequence numbering
//! - Protocol constants
//!
//! It performs no I/O.

pub mod board;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod sequence;

pub use board::{BoardIdentity, IndicatorId};
pub use command::{Activate, Function, LedOn};
pub use constants::Polarity;
pub use error::{Error, Result};
pub use frame::{encode, encode_led_on, CommandFrame};
pub use sequence::SequenceCounter;

/// Protocol version information
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default controller port
pub const DEFAULT_PORT: u16 = constants::DEFAULT_PORT;
