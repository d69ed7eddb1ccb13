//! Error types for wgled-core



/// Result type alias for wgled operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Argument outside the range the controller accepts
    #[error("Invalid {name}: {value} (expected {min}..={max})")]
    InvalidArgument {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Frame is not exactly 64 bytes
    #[error("Invalid frame length: expected {expected} bytes, got {actual} bytes")]
    FrameLength {
        expected: usize,
        actual: usize,
    },

    /// Frame header does not carry the expected type/function
    #[error("Unexpected frame header: type 0x{packet_type:02X}, function 0x{function:02X}")]
    UnexpectedHeader {
        packet_type: u8,
        function: u8,
    },

    /// Unknown function code
    #[error("Unknown function code: 0x{0:02X}")]
    UnknownFunction(u8),

    /// Sequence counter reached its maximum and cannot issue a fresh value
    #[error("Sequence numbers exhausted")]
    SequenceExhausted,
}

impl Error {
    pub(crate) fn out_of_range(
        name: &'static str,
        value: impl Into<u32>,
        range: &std::ops::RangeInclusive<u8>,
    ) -> Self {
        Self::InvalidArgument {
            name,
            value: value.into(),
            min: u32::from(*range.start()),
            max: u32::from(*range.end()),
        }
    }

    /// Check if the error was caused by caller input rather than protocol state
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
