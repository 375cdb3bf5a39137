//! Tests for stream resynchronization over a noisy byte stream

mod common;

use bluetherm_lib::extract_frames;
use common::*;

#[test]
fn leading_noise_is_discarded_one_byte_at_a_time() {
    let mut buffer = BytesMut::new();
    buffer.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x37]);
    buffer.extend_from_slice(golden_response().serialize());
    buffer.extend_from_slice(&[0x01, 0x02, 0x03]);

    let frames = extract_frames(&mut buffer);

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0], golden_response());
    // The 5 noise bytes are gone, the 3 trailing bytes stay buffered for the
    // next pass.
    assert_eq!(&buffer[..], &[0x01, 0x02, 0x03]);
}

#[test]
fn nothing_happens_below_a_full_frame() {
    let mut buffer = BytesMut::new();
    buffer.extend_from_slice(&golden_response().serialize()[..127]);

    assert!(extract_frames(&mut buffer).is_empty());
    assert_eq!(buffer.len(), 127);
}

#[test]
fn back_to_back_frames_come_out_in_arrival_order() {
    let first = Packet::from_command(Command::Get);
    let mut second = Packet::from_command(Command::Get);
    second.set(Field::UserData, 7).unwrap();

    let mut buffer = BytesMut::new();
    buffer.extend_from_slice(first.serialize());
    buffer.extend_from_slice(second.serialize());

    let frames = extract_frames(&mut buffer);

    assert_eq!(frames, vec![first, second]);
    assert!(buffer.is_empty());
}

#[test]
fn a_corrupted_frame_costs_bytes_but_not_the_next_frame() {
    let mut corrupted = *golden_response().serialize();
    corrupted[40] ^= 0xFF;

    let mut buffer = BytesMut::new();
    buffer.extend_from_slice(&corrupted);
    buffer.extend_from_slice(golden_response().serialize());

    let frames = extract_frames(&mut buffer);

    assert_eq!(frames, vec![golden_response()]);
    assert!(buffer.is_empty());
}
