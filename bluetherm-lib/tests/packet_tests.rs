//! Tests for frame construction, field access, and validity

mod common;

use bluetherm_lib::crc;
use chrono::{TimeZone, Utc};
use common::*;

#[test]
fn from_raw_rejects_anything_but_128_bytes() {
    for len in [0usize, 1, 127, 129, 256] {
        match Packet::from_raw(&vec![0u8; len]) {
            Err(BtError::FrameSize { expected, actual }) => {
                assert_eq!(expected, 128);
                assert_eq!(actual, len);
            }
            other => panic!("expected FrameSize error for {len} bytes, got {other:?}"),
        }
    }
}

#[test]
fn from_command_is_always_valid() {
    for command in [
        Command::Nothing,
        Command::Get,
        Command::Set,
        Command::Button,
        Command::Shutdown,
    ] {
        let packet = Packet::from_command(command);
        assert!(packet.is_valid(), "{command} request failed its own checksum");
        assert_eq!(packet.command(), command);
        assert_eq!(packet.get(Field::Version), Value::Byte(1));
    }
}

#[test]
fn known_get_request_bytes() {
    let request = Packet::from_command(Command::Get);
    let mut expected = [0u8; 128];
    expected[0] = 0x01;
    expected[1] = 0x01;
    expected[126] = 0xC1;
    expected[127] = 0xAE;
    assert_eq!(request.serialize(), &expected);
}

#[test]
fn flipping_any_non_checksum_byte_invalidates() {
    let reference = golden_response();
    assert!(reference.is_valid());
    for offset in 0..126 {
        let mut bytes = *reference.serialize();
        bytes[offset] ^= 0x01;
        let mutated = Packet::from_raw(&bytes).unwrap();
        assert!(!mutated.is_valid(), "flip at offset {offset} went undetected");
    }
}

#[test]
fn set_recomputes_the_checksum_on_every_write() {
    let mut packet = Packet::from_command(Command::Get);
    packet.set(Field::UserData, 0xCAFE).unwrap();
    assert!(packet.is_valid());
    packet.set(Field::Version, 2).unwrap();
    assert!(packet.is_valid());
    assert_eq!(packet.get(Field::UserData), Value::Integer(0xCAFE));
}

#[test]
fn set_rejects_read_only_codecs() {
    let mut packet = Packet::from_command(Command::Set);
    assert!(matches!(
        packet.set(Field::Sensor1Temperature, 123),
        Err(BtError::UnsupportedEncode(CodecKind::Temperature))
    ));
    assert!(matches!(
        packet.set(Field::SerialNumber, 0),
        Err(BtError::UnsupportedEncode(CodecKind::String))
    ));
    // The failed set must not have disturbed the frame.
    assert!(packet.is_valid());
}

#[test]
fn data_flags_mask_matches_the_wire_captures() {
    let mut request = Packet::from_command(Command::Get);
    request
        .set_data_flags(&[Field::Sensor1Temperature, Field::Sensor2Temperature])
        .unwrap();
    assert_eq!(request.get(Field::DataFlags), Value::Word(0x0044));
    assert!(request.is_valid());
}

#[test]
fn shared_bit_groups_produce_identical_masks() {
    let mask_of = |fields: &[Field]| {
        let mut request = Packet::from_command(Command::Get);
        request.set_data_flags(fields).unwrap();
        request.get(Field::DataFlags)
    };

    // Either member of a group selects the group; both together is the same
    // mask as either alone.
    let names_1 = mask_of(&[Field::Sensor1Name]);
    let names_2 = mask_of(&[Field::Sensor2Name]);
    let names_both = mask_of(&[Field::Sensor1Name, Field::Sensor2Name]);
    assert_eq!(names_1, Value::Word(1 << 1));
    assert_eq!(names_1, names_2);
    assert_eq!(names_1, names_both);

    let battery = mask_of(&[Field::BatteryLevel]);
    assert_eq!(battery, mask_of(&[Field::BatteryTemperature]));
    assert_eq!(battery, mask_of(&[Field::BatteryLevel, Field::BatteryTemperature]));

    let types = mask_of(&[Field::Sensor1Type]);
    assert_eq!(types, mask_of(&[Field::Sensor2Type]));
    assert_eq!(types, Value::Word(1 << 0xf));
}

#[test]
fn data_flags_rejects_fields_outside_the_table() {
    let mut request = Packet::from_command(Command::Get);
    for field in [
        Field::Command,
        Field::Version,
        Field::DataFlags,
        Field::Sensor1Raw,
        Field::Sensor1TrimDate,
        Field::ProbeCalibrationDate,
        Field::UserData,
        Field::Checksum,
    ] {
        assert!(
            matches!(
                request.set_data_flags(&[field]),
                Err(BtError::UnknownField(f)) if f == field
            ),
            "{field} should have no data-flags bit"
        );
    }
}

#[test]
fn golden_frame_checksum_matches_the_device() {
    let bytes = hex_to_bytes(GOLDEN_RESPONSE);
    let stored = u16::from_le_bytes([bytes[126], bytes[127]]);
    assert_eq!(crc::checksum(&bytes[..126]), stored);
    assert!(golden_response().is_valid());
}

#[test]
fn golden_frame_decodes_every_requested_field() {
    let response = golden_response();
    assert_eq!(response.command(), Command::Get);
    assert_eq!(response.get(Field::DataFlags), Value::Word(0x0044));
    assert_eq!(response.get(Field::SerialNumber), Value::Text("A1534012".into()));

    let t1 = response.get(Field::Sensor1Temperature).as_temperature().unwrap();
    let t2 = response.get(Field::Sensor2Temperature).as_temperature().unwrap();
    assert!((t1 - 21.5).abs() < 1e-9);
    assert!((t2 - 84.2).abs() < 1e-9);

    // The raw aliases see the same bytes as the temperatures.
    assert_eq!(response.get(Field::Sensor1Raw), Value::Integer(32_150_000));
    assert_eq!(response.get(Field::Sensor2Raw), Value::Integer(38_420_000));

    assert_eq!(response.get(Field::BatteryLevel), Value::Battery(1.286));
    let ambient = response.get(Field::BatteryTemperature).as_temperature().unwrap();
    assert!((ambient - 23.47).abs() < 1e-9);

    assert_eq!(response.get(Field::FirmwareVersion), Value::Integer(0x00030100));
    assert_eq!(
        response.get(Field::ProbeCalibrationDate),
        Value::Timestamp(Utc.with_ymd_and_hms(2014, 6, 15, 0, 0, 0).unwrap())
    );

    // Unset probes read as the sentinel.
    assert_eq!(
        response.get(Field::Sensor1High).as_temperature().unwrap(),
        -300.0
    );
}
