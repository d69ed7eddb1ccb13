//! Controller function codes and command payloads

use std::fmt;

use crate::{
    board::IndicatorId,
    constants::{DOOR_RANGE, INDICATOR_RANGE},
    error::{Error, Result},
};

/// Protocol function codes
///
/// Neither function has a matching "deactivate" code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Function {
    /// Remote open door / activate floor relay
    RemoteActivate = 0x40,
    /// Switch a relay-driven LED on (marker-prefixed data block)
    LedOn = 0xA0,
}

impl Function {
    /// Get function name
    pub fn name(self) -> &'static str {
        match self {
            Self::RemoteActivate => "FN_REMOTE_ACTIVATE",
            Self::LedOn => "FN_LED_ON",
        }
    }
}

impl From<Function> for u8 {
    fn from(function: Function) -> u8 {
        function as u8
    }
}

impl TryFrom<u8> for Function {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x40 => Ok(Self::RemoteActivate),
            0xA0 => Ok(Self::LedOn),
            _ => Err(Error::UnknownFunction(value)),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

/// Remote-activate command payload
///
/// Door and indicator are range-checked on construction, so an `Activate`
/// can always be encoded.
///
/// # Examples
///
/// ```
/// use wgled_core::{Activate, IndicatorId};
///
/// let cmd = Activate::new(1, IndicatorId::new(3)).unwrap().with_duration(5);
/// assert_eq!(cmd.door(), 1);
/// assert_eq!(cmd.duration(), 5);
///
/// assert!(Activate::new(9, IndicatorId::new(3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activate {
    door: u8,
    indicator: IndicatorId,
    duration: u16,
}

impl Activate {
    /// Create a command with the device default duration
    pub fn new(door: u8, indicator: IndicatorId) -> Result<Self> {
        if !DOOR_RANGE.contains(&door) {
            return Err(Error::out_of_range("door", door, &DOOR_RANGE));
        }
        if !INDICATOR_RANGE.contains(&indicator.get()) {
            return Err(Error::out_of_range("indicator", indicator.get(), &INDICATOR_RANGE));
        }

        Ok(Self {
            door,
            indicator,
            duration: 0,
        })
    }

    /// Set activation duration (0 = device default)
    pub fn with_duration(mut self, duration: u16) -> Self {
        self.duration = duration;
        self
    }

    pub fn function(&self) -> Function {
        Function::RemoteActivate
    }

    pub fn door(&self) -> u8 {
        self.door
    }

    pub fn indicator(&self) -> IndicatorId {
        self.indicator
    }

    pub fn duration(&self) -> u16 {
        self.duration
    }
}

/// LED-on command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedOn {
    relay: IndicatorId,
}

impl LedOn {
    pub fn new(relay: IndicatorId) -> Result<Self> {
        if !INDICATOR_RANGE.contains(&relay.get()) {
            return Err(Error::out_of_range("relay", relay.get(), &INDICATOR_RANGE));
        }
        Ok(Self { relay })
    }

    pub fn function(&self) -> Function {
        Function::LedOn
    }

    pub fn relay(&self) -> IndicatorId {
        self.relay
    }
}
