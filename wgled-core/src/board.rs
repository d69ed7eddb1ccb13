//! Board identity and output addressing

use std::fmt;

use crate::constants::{INDICATORS_PER_BANK, INDICATOR_RANGE, Polarity};
use crate::error::{Error, Result};

/// Controller board a command targets
///
/// Immutable once built; supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardIdentity {
    address: String,
    port: u16,
    serial_number: u32,
}

impl BoardIdentity {
    pub fn new(address: impl Into<String>, port: u16, serial_number: u32) -> Self {
        Self {
            address: address.into(),
            port,
            serial_number,
        }
    }

    /// Network address (IP or host name)
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn serial_number(&self) -> u32 {
        self.serial_number
    }
}

impl fmt::Display for BoardIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Board[SN: {} (0x{:08X}), {}:{}]",
            self.serial_number, self.serial_number, self.address, self.port
        )
    }
}

/// Relay/LED/floor output number on a board
///
/// Construction does not range-check; encoding does. Use [`IndicatorId::validate`]
/// to reject bad values early (e.g. when loading configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorId(u8);

impl IndicatorId {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Check the value against the protocol range
    pub fn validate(self) -> Result<Self> {
        if INDICATOR_RANGE.contains(&self.0) {
            Ok(self)
        } else {
            Err(Error::out_of_range("indicator", self.0, &INDICATOR_RANGE))
        }
    }

    /// Polarity bank of this output, if it is in range
    pub fn polarity(self) -> Option<Polarity> {
        match self.0 {
            1..=INDICATORS_PER_BANK => Some(Polarity::Primary),
            n if INDICATOR_RANGE.contains(&n) => Some(Polarity::Secondary),
            _ => None,
        }
    }

    /// Same output in the opposite polarity bank (n <-> n ± 40)
    pub fn counterpart(self) -> Result<Self> {
        match self.validate()?.polarity() {
            Some(Polarity::Primary) => Ok(Self(self.0 + INDICATORS_PER_BANK)),
            _ => Ok(Self(self.0 - INDICATORS_PER_BANK)),
        }
    }
}

impl From<u8> for IndicatorId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
