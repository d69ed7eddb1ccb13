//! Controller command frame and encoding

use byteorder::{ByteOrder, LittleEndian};
use bytes::BufMut;
use std::fmt;
use tracing::trace;

use crate::{
    board::{BoardIdentity, IndicatorId},
    command::{Activate, Function, LedOn},
    constants::{
        DATA_OFFSET, FRAME_LEN, LED_ON_MARKER, LED_ON_RELAY_OFFSET, PACKET_TYPE, SEQUENCE_OFFSET,
        SERIAL_OFFSET,
    },
    error::{Error, Result},
};

/// Fixed-size command frame sent to a controller board
///
/// # Frame Structure
///
/// ```text
/// ┌──────┬──────┬──────────┬──────────┬──────────────────────┬──────────┬──────────┐
/// │ Type │ Func │ Reserved │  Serial  │      Data block      │ Sequence │ Reserved │
/// │  0   │  1   │   2-3    │   4-7    │        8-39          │  40-43   │  44-63   │
/// │ 0x17 │ 0x40 │   0x00   │ (LE u32) │ door, output, dur(LE)│ (LE u32) │   0x00   │
/// └──────┴──────┴──────────┴──────────┴──────────────────────┴──────────┴──────────┘
/// ```
///
/// LED-on frames (function `0xA0`) carry `55 AA AA 55`, the relay number and
/// `0x01` in bytes 8-13 instead of door/output/duration.
///
/// Every frame is exactly 64 bytes and unused bytes are zero. No response is
/// expected from the board.
///
/// # Examples
///
/// ```
/// use wgled_core::{encode, BoardIdentity, IndicatorId};
///
/// let board = BoardIdentity::new("192.168.0.10", 60000, 175111864);
/// let frame = encode(&board, 1, IndicatorId::new(3), 7).unwrap();
///
/// assert_eq!(frame.as_bytes().len(), 64);
/// assert_eq!(frame.serial_number(), 175111864);
/// assert_eq!(frame.sequence(), 7);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: [u8; FRAME_LEN],
}

impl CommandFrame {
    /// Frame size in bytes
    pub const LEN: usize = FRAME_LEN;

    /// Encode an activate command for `board`
    pub fn encode(board: &BoardIdentity, command: &Activate, sequence: u32) -> Self {
        let mut buf = Vec::with_capacity(FRAME_LEN);

        // Header
        buf.put_u8(PACKET_TYPE);
        buf.put_u8(command.function().into());
        buf.put_u16_le(0);
        buf.put_u32_le(board.serial_number());

        // Data block
        buf.put_u8(command.door());
        buf.put_u8(command.indicator().get());
        buf.put_u16_le(command.duration());
        buf.put_bytes(0, SEQUENCE_OFFSET - buf.len());

        buf.put_u32_le(sequence);
        buf.put_bytes(0, FRAME_LEN - buf.len());

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(&buf);

        let frame = Self { bytes };

        trace!(
            serial = board.serial_number(),
            door = command.door(),
            indicator = command.indicator().get(),
            sequence = sequence,
            frame = %hex::encode(frame.bytes),
            "Encoded frame"
        );

        frame
    }

    /// Encode an LED-on command for `board`
    pub fn encode_led_on(board: &BoardIdentity, command: &LedOn, sequence: u32) -> Self {
        let mut buf = Vec::with_capacity(FRAME_LEN);

        buf.put_u8(PACKET_TYPE);
        buf.put_u8(command.function().into());
        buf.put_u16_le(0);
        buf.put_u32_le(board.serial_number());

        buf.put_slice(&LED_ON_MARKER);
        buf.put_u8(command.relay().get());
        buf.put_u8(0x01);
        buf.put_bytes(0, SEQUENCE_OFFSET - buf.len());

        buf.put_u32_le(sequence);
        buf.put_bytes(0, FRAME_LEN - buf.len());

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(&buf);

        let frame = Self { bytes };

        trace!(
            serial = board.serial_number(),
            relay = command.relay().get(),
            sequence = sequence,
            frame = %hex::encode(frame.bytes),
            "Encoded LED-on frame"
        );

        frame
    }

    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn function(&self) -> Function {
        // Header is checked on every construction path
        match self.bytes[1] {
            0xA0 => Function::LedOn,
            _ => Function::RemoteActivate,
        }
    }

    pub fn serial_number(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[SERIAL_OFFSET..SERIAL_OFFSET + 4])
    }

    /// Door of a remote-activate frame (0 for LED-on frames)
    pub fn door(&self) -> u8 {
        match self.function() {
            Function::RemoteActivate => self.bytes[DATA_OFFSET],
            Function::LedOn => 0,
        }
    }

    /// Output the frame switches (relay number for LED-on frames)
    pub fn indicator(&self) -> IndicatorId {
        match self.function() {
            Function::RemoteActivate => IndicatorId::new(self.bytes[DATA_OFFSET + 1]),
            Function::LedOn => IndicatorId::new(self.bytes[LED_ON_RELAY_OFFSET]),
        }
    }

    pub fn duration(&self) -> u16 {
        if self.function() == Function::LedOn {
            return 0;
        }
        LittleEndian::read_u16(&self.bytes[DATA_OFFSET + 2..DATA_OFFSET + 4])
    }

    pub fn sequence(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[SEQUENCE_OFFSET..SEQUENCE_OFFSET + 4])
    }
}

/// Encode a remote-activate frame
///
/// Fails with [`Error::InvalidArgument`] when `door` or `indicator` is outside
/// the documented device range; nothing is encoded in that case.
pub fn encode(
    board: &BoardIdentity,
    door: u8,
    indicator: IndicatorId,
    sequence: u32,
) -> Result<CommandFrame> {
    let command = Activate::new(door, indicator)?;
    Ok(CommandFrame::encode(board, &command, sequence))
}

/// Encode an LED-on frame for `relay`
pub fn encode_led_on(
    board: &BoardIdentity,
    relay: IndicatorId,
    sequence: u32,
) -> Result<CommandFrame> {
    let command = LedOn::new(relay)?;
    Ok(CommandFrame::encode_led_on(board, &command, sequence))
}

impl TryFrom<&[u8]> for CommandFrame {
    type Error = Error;

    /// Parse a frame for inspection
    fn try_from(buf: &[u8]) -> Result<Self> {
        if buf.len() != FRAME_LEN {
            return Err(Error::FrameLength {
                expected: FRAME_LEN,
                actual: buf.len(),
            });
        }

        let function = Function::try_from(buf[1]);
        if buf[0] != PACKET_TYPE || function.is_err() {
            return Err(Error::UnexpectedHeader {
                packet_type: buf[0],
                function: buf[1],
            });
        }

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(buf);
        Ok(Self { bytes })
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFrame")
            .field("function", &self.function())
            .field("serial", &format!("0x{:08X}", self.serial_number()))
            .field("door", &self.door())
            .field("indicator", &self.indicator().get())
            .field("duration", &self.duration())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.function() == Function::LedOn {
            return write!(
                f,
                "Frame[{}](sn={}, relay={}, seq={})",
                self.function(),
                self.serial_number(),
                self.indicator(),
                self.sequence()
            );
        }
        write!(
            f,
            "Frame[{}](sn={}, door={}, indicator={}, seq={})",
            self.function(),
            self.serial_number(),
            self.door(),
            self.indicator(),
            self.sequence()
        )
    }
}
