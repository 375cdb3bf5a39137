//! The BlueTherm's CRC-16 variant.
//!
//! Not a table-driven CRC-16-CCITT/IBM: the device feeds the low bit of
//! `register XOR byte` back into bit 15, shifting both the register and the
//! byte right each of the 8 rounds, and complements the register at the end.
//! Any deviation here breaks validity checking for every real packet, so the
//! implementation mirrors the device firmware bit for bit.

/// Checksum over `data`, which for a wire frame is always the first 126
/// bytes of the 128-byte buffer.
pub fn checksum(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc = crc_round(byte, crc);
    }
    !crc
}

fn crc_round(byte: u8, mut crc: u16) -> u16 {
    let mut word = byte as u16;
    for _ in 0..8 {
        let feedback = (crc ^ word) & 1 != 0;
        word >>= 1;
        crc >>= 1;
        if feedback {
            crc ^= 0xA001;
        }
    }
    crc
}
