//! Protocol constants

use std::ops::RangeInclusive;

/// Packet type tag carried in byte 0 of every frame
pub const PACKET_TYPE: u8 = 0x17;

/// Total frame size in bytes
pub const FRAME_LEN: usize = 64;

/// Offset of the little-endian board serial number
pub const SERIAL_OFFSET: usize = 4;

/// Offset of the function-specific data block
pub const DATA_OFFSET: usize = 8;

/// Offset of the little-endian sequence number
pub const SEQUENCE_OFFSET: usize = 40;

/// Marker opening the data block of an LED-on frame
pub const LED_ON_MARKER: [u8; 4] = [0x55, 0xAA, 0xAA, 0x55];

/// Offset of the relay number in an LED-on frame
pub const LED_ON_RELAY_OFFSET: usize = DATA_OFFSET + LED_ON_MARKER.len();

/// Default controller UDP port
pub const DEFAULT_PORT: u16 = 60000;

/// Doors addressable on a four-door controller
pub const DOOR_RANGE: RangeInclusive<u8> = 1..=4;

/// Outputs addressable by the remote-activate command
pub const INDICATOR_RANGE: RangeInclusive<u8> = 1..=80;

/// Outputs per polarity bank (1-40 primary, 41-80 secondary)
pub const INDICATORS_PER_BANK: u8 = 40;

/// Default beacon re-send interval (milliseconds)
pub const DEFAULT_BEACON_INTERVAL_MS: u64 = 500;

/// Default bound on waiting for a beacon to acknowledge a stop (milliseconds)
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 1000;

/// Output polarity bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Polarity {
    Primary = 0,
    Secondary = 1,
}
