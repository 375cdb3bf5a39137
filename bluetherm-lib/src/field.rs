//! Static registry of commands and frame fields.
//!
//! Every field is a named byte range inside the 128-byte frame plus the codec
//! used to interpret it. The table comes from protocol captures rather than a
//! published datasheet, so a handful of entries are of unknown meaning; their
//! ranges and codecs are preserved exactly as observed.

use crate::codec::CodecKind;
use num_enum::{FromPrimitive, IntoPrimitive};
use std::ops::Range;
use strum_macros::Display;

/// Command codes for the COMMAND field of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Command {
    /// No-op.
    Nothing = 0x00,
    /// Read the fields selected by DATA_FLAGS.
    Get = 0x01,
    /// Write the fields selected by DATA_FLAGS.
    Set = 0x02,
    /// Sent by the device when the transmit-data button is pressed.
    Button = 0x03,
    /// Sent by the device when it is manually turned off.
    Shutdown = 0x05,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Frame fields, each a byte range plus codec kind.
///
/// Some ranges legitimately alias: `Sensor1Raw`/`Sensor2Raw` are alternate
/// integer views of the temperature ranges, and the three
/// `CalibrationValue*` entries were captured with one identical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Field {
    Command,
    /// Protocol version; usually 1. Set automatically by
    /// [`Packet::from_command`](crate::Packet::from_command).
    Version,
    /// Selects which values a GET or SET acts on. See
    /// [`Packet::set_data_flags`](crate::Packet::set_data_flags).
    DataFlags,
    /// Device serial number, e.g. "A1534012".
    SerialNumber,
    Sensor1Name,
    Sensor2Name,
    /// Probe temperature in celsius.
    Sensor1Temperature,
    /// Integer view of the same bytes as `Sensor1Temperature`, equal to
    /// `(t + 300) * 100_000`.
    Sensor1Raw,
    /// High-temperature-alarm setting.
    Sensor1High,
    /// Low-temperature-alarm setting.
    Sensor1Low,
    /// Unknown.
    Sensor1Trim,
    /// Unknown.
    Sensor1TrimDate,
    /// Probe temperature in celsius.
    Sensor2Temperature,
    /// Integer view of the same bytes as `Sensor2Temperature`.
    Sensor2Raw,
    Sensor2High,
    Sensor2Low,
    /// Unknown.
    Sensor2Trim,
    /// Unknown.
    Sensor2TrimDate,
    /// Battery voltage; 1.286 has been observed to mean "full".
    BatteryLevel,
    /// Battery temperature, usable as an ambient reading for the whole unit.
    BatteryTemperature,
    /// Unknown.
    CalibrationValue1,
    /// Unknown.
    CalibrationValue2,
    /// Unknown.
    CalibrationValue3,
    /// Date the unit was last calibrated. Returned when requesting any of
    /// the `CalibrationValue*` fields.
    ProbeCalibrationDate,
    /// Firmware version; 0x00030100 has been observed, possibly 3.1.0.
    FirmwareVersion,
    /// Unknown.
    Sensor1Type,
    /// Unknown.
    Sensor2Type,
    /// Unknown.
    UserData,
    Checksum,
}

impl Field {
    /// Every field, in frame order.
    pub const ALL: [Field; 29] = [
        Field::Command,
        Field::Version,
        Field::DataFlags,
        Field::SerialNumber,
        Field::Sensor1Name,
        Field::Sensor2Name,
        Field::Sensor1Temperature,
        Field::Sensor1Raw,
        Field::Sensor1High,
        Field::Sensor1Low,
        Field::Sensor1Trim,
        Field::Sensor1TrimDate,
        Field::Sensor2Temperature,
        Field::Sensor2Raw,
        Field::Sensor2High,
        Field::Sensor2Low,
        Field::Sensor2Trim,
        Field::Sensor2TrimDate,
        Field::BatteryLevel,
        Field::BatteryTemperature,
        Field::CalibrationValue1,
        Field::CalibrationValue2,
        Field::CalibrationValue3,
        Field::ProbeCalibrationDate,
        Field::FirmwareVersion,
        Field::Sensor1Type,
        Field::Sensor2Type,
        Field::UserData,
        Field::Checksum,
    ];

    /// Byte range of this field within a frame.
    pub fn range(self) -> Range<usize> {
        match self {
            Field::Command => 0x00..0x01,
            Field::Version => 0x01..0x02,
            Field::DataFlags => 0x02..0x04,
            Field::SerialNumber => 0x04..0x0e,
            Field::Sensor1Name => 0x0e..0x22,
            Field::Sensor2Name => 0x22..0x36,
            Field::Sensor1Temperature => 0x36..0x3a,
            Field::Sensor1Raw => 0x36..0x3a,
            Field::Sensor1High => 0x3a..0x3e,
            Field::Sensor1Low => 0x3e..0x42,
            Field::Sensor1Trim => 0x42..0x46,
            Field::Sensor1TrimDate => 0x46..0x4a,
            Field::Sensor2Temperature => 0x4a..0x4e,
            Field::Sensor2Raw => 0x4a..0x4e,
            Field::Sensor2High => 0x4e..0x52,
            Field::Sensor2Low => 0x52..0x56,
            Field::Sensor2Trim => 0x56..0x5a,
            Field::Sensor2TrimDate => 0x5a..0x5e,
            Field::BatteryLevel => 0x5e..0x60,
            Field::BatteryTemperature => 0x60..0x64,
            // The three calibration values were captured with one identical
            // range; kept verbatim rather than guessing a corrected layout.
            Field::CalibrationValue1 => 0x64..0x68,
            Field::CalibrationValue2 => 0x64..0x68,
            Field::CalibrationValue3 => 0x64..0x68,
            Field::ProbeCalibrationDate => 0x70..0x74,
            Field::FirmwareVersion => 0x74..0x78,
            Field::Sensor1Type => 0x78..0x79,
            Field::Sensor2Type => 0x79..0x7a,
            Field::UserData => 0x7a..0x7e,
            Field::Checksum => 0x7e..0x80,
        }
    }

    /// Codec used for this field's byte range.
    pub fn codec(self) -> CodecKind {
        match self {
            Field::Command | Field::Version | Field::Sensor1Type | Field::Sensor2Type => {
                CodecKind::Byte
            }
            Field::DataFlags | Field::Checksum => CodecKind::Word,
            Field::SerialNumber | Field::Sensor1Name | Field::Sensor2Name => CodecKind::String,
            Field::Sensor1Raw | Field::Sensor2Raw | Field::FirmwareVersion | Field::UserData => {
                CodecKind::Integer
            }
            Field::Sensor1Temperature
            | Field::Sensor1High
            | Field::Sensor1Low
            | Field::Sensor1Trim
            | Field::Sensor2Temperature
            | Field::Sensor2High
            | Field::Sensor2Low
            | Field::Sensor2Trim
            | Field::BatteryTemperature
            | Field::CalibrationValue1
            | Field::CalibrationValue2
            | Field::CalibrationValue3 => CodecKind::Temperature,
            Field::Sensor1TrimDate | Field::Sensor2TrimDate | Field::ProbeCalibrationDate => {
                CodecKind::Date
            }
            Field::BatteryLevel => CodecKind::Battery,
        }
    }

    /// Bit position of this field in the DATA_FLAGS mask, or `None` for
    /// fields that cannot be requested.
    ///
    /// A few bits fetch whole groups: bit 1 covers both probe names, bit 0xa
    /// the battery pair, bit 0xf both sensor types. Requesting any member of
    /// a group requests the group.
    pub fn data_flag_bit(self) -> Option<u8> {
        match self {
            Field::SerialNumber => Some(0x0),
            Field::Sensor1Name | Field::Sensor2Name => Some(0x1),
            Field::Sensor1Temperature => Some(0x2),
            Field::Sensor1High => Some(0x3),
            Field::Sensor1Low => Some(0x4),
            Field::Sensor1Trim => Some(0x5),
            Field::Sensor2Temperature => Some(0x6),
            Field::Sensor2High => Some(0x7),
            Field::Sensor2Low => Some(0x8),
            Field::Sensor2Trim => Some(0x9),
            Field::BatteryLevel | Field::BatteryTemperature => Some(0xa),
            Field::CalibrationValue1 => Some(0xb),
            Field::CalibrationValue2 => Some(0xc),
            Field::CalibrationValue3 => Some(0xd),
            Field::FirmwareVersion => Some(0xe),
            Field::Sensor1Type | Field::Sensor2Type => Some(0xf),
            _ => None,
        }
    }
}
