// Protocol constants for the BlueTherm Duo serial link

use std::time::Duration;

/// Size of one wire frame (128 bytes)
pub const FRAME_SIZE: usize = 0x80;

/// Number of leading frame bytes covered by the checksum
pub const CHECKSUM_INPUT_SIZE: usize = 0x7E;

/// Protocol version written into every synthesized request
pub const PROTOCOL_VERSION: u8 = 1;

/// Receiver back-off while no complete frame is buffered
pub const RECEIVE_IDLE_DELAY: Duration = Duration::from_millis(100);

/// Sender back-off after a disconnect-class write failure, before reopening
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);
