//! The 128-byte wire frame.
//!
//! The same frame layout is used in both directions. Every mutation
//! recomputes the trailing checksum, so a packet is never observable with a
//! stale checksum.

use crate::codec::{self, Value};
use crate::constants::{CHECKSUM_INPUT_SIZE, FRAME_SIZE, PROTOCOL_VERSION};
use crate::crc;
use crate::error::BtError;
use crate::field::{Command, Field};
use bytes::{Buf, BytesMut};
use num_enum::FromPrimitive;

/// One 128-byte frame with typed field access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: [u8; FRAME_SIZE],
}

impl Packet {
    /// Wrap raw bytes received off the wire.
    pub fn from_raw(bytes: &[u8]) -> Result<Self, BtError> {
        let bytes: [u8; FRAME_SIZE] = bytes.try_into().map_err(|_| BtError::FrameSize {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Packet { bytes })
    }

    /// Synthesize a request frame for the given command: zero-filled, with
    /// COMMAND and VERSION set and the checksum stored.
    pub fn from_command(command: Command) -> Self {
        let mut packet = Packet {
            bytes: [0; FRAME_SIZE],
        };
        packet.bytes[Field::Command.range().start] = command.into();
        packet.bytes[Field::Version.range().start] = PROTOCOL_VERSION;
        packet.update_checksum();
        packet
    }

    /// Fetch and decode a field.
    pub fn get(&self, field: Field) -> Value {
        codec::decode(field.codec(), &self.bytes[field.range()])
    }

    /// Encode `value` into a field's byte range and restore the checksum
    /// invariant.
    ///
    /// Fails for fields whose codec does not support encoding; see
    /// [`codec::encode`].
    pub fn set(&mut self, field: Field, value: u32) -> Result<(), BtError> {
        let range = field.range();
        let encoded = codec::encode(field.codec(), value, range.len())?;
        self.bytes[range].copy_from_slice(&encoded);
        self.update_checksum();
        Ok(())
    }

    /// Build and store the DATA_FLAGS mask selecting the given fields for a
    /// GET or SET.
    ///
    /// Some bits fetch whole field groups (probe names, the battery pair,
    /// the sensor types); requesting any member selects the group. Fields
    /// with no data-flags bit are rejected.
    pub fn set_data_flags(&mut self, fields: &[Field]) -> Result<(), BtError> {
        let mut mask: u32 = 0;
        for &field in fields {
            let bit = field.data_flag_bit().ok_or(BtError::UnknownField(field))?;
            mask |= 1 << bit;
        }
        self.set(Field::DataFlags, mask)
    }

    /// Whether the stored checksum matches the checksum of the current
    /// frame contents.
    pub fn is_valid(&self) -> bool {
        let stored = self.get(Field::Checksum);
        stored == Value::Word(crc::checksum(&self.bytes[..CHECKSUM_INPUT_SIZE]))
    }

    /// The raw 128-byte sequence, ready for transmission.
    pub fn serialize(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    /// The COMMAND field, used to label frames in logs and to filter
    /// responses.
    pub fn command(&self) -> Command {
        Command::from_primitive(self.bytes[Field::Command.range().start])
    }

    fn update_checksum(&mut self) {
        let checksum = crc::checksum(&self.bytes[..CHECKSUM_INPUT_SIZE]);
        self.bytes[CHECKSUM_INPUT_SIZE..].copy_from_slice(&checksum.to_le_bytes());
    }
}

/// Drain every complete, checksum-valid frame from the head of `buffer`.
///
/// This is the stream resynchronization strategy: while at least 128 bytes
/// are buffered, the leading 128 are tested as a candidate frame; a valid
/// frame is consumed whole, anything else costs exactly one discarded byte.
/// Recovers frame alignment after partial reads, radio noise, or connecting
/// mid-frame. Returned frames preserve arrival order.
pub fn extract_frames(buffer: &mut BytesMut) -> Vec<Packet> {
    let mut frames = Vec::new();
    while buffer.len() >= FRAME_SIZE {
        let mut head = [0u8; FRAME_SIZE];
        head.copy_from_slice(&buffer[..FRAME_SIZE]);
        let candidate = Packet { bytes: head };
        if candidate.is_valid() {
            buffer.advance(FRAME_SIZE);
            frames.push(candidate);
        } else {
            buffer.advance(1);
        }
    }
    frames
}
