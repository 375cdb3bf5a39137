//! Common test utilities and shared fixtures

// Shared across multiple test files; not every item is used in every file.
#[allow(unused_imports)]
pub use bluetherm_lib::{BtError, CodecKind, Command, DevicePort, Field, Packet, Value};
#[allow(unused_imports)]
pub use bytes::BytesMut;

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// A captured-style GET response frame: serial "A1534012", probe 1 at
/// 21.5 °C, probe 2 at 84.2 °C, battery 1.286 V at 23.47 °C, firmware
/// 0x00030100, calibrated 2014-06-15.
#[allow(dead_code)]
pub const GOLDEN_RESPONSE: &str = "010144004131353334303132000000000000000000000000000000000000000000000000000000000000000000000000000000000000f091ea0100000000000000000000000000000000203e4a020000000000000000000000000000000006057893ed0100000000000000000000000000fac61100010300000000000000eea1";

#[allow(dead_code)]
pub fn golden_response() -> Packet {
    Packet::from_raw(&hex_to_bytes(GOLDEN_RESPONSE)).expect("golden frame is 128 bytes")
}

/// A scripted [`DevicePort`]: hands out canned read chunks, counts writes
/// and reopens, and can fail scripted writes.
#[allow(dead_code)]
pub struct ScriptedPort {
    reads: Mutex<VecDeque<Vec<u8>>>,
    write_failures: Mutex<VecDeque<io::Error>>,
    pub writes: AtomicUsize,
    pub reopens: AtomicUsize,
    /// When set, read chunks are held back until the first reopen.
    pub gate_reads_on_reopen: AtomicBool,
}

#[allow(dead_code)]
impl ScriptedPort {
    pub fn new() -> Self {
        ScriptedPort {
            reads: Mutex::new(VecDeque::new()),
            write_failures: Mutex::new(VecDeque::new()),
            writes: AtomicUsize::new(0),
            reopens: AtomicUsize::new(0),
            gate_reads_on_reopen: AtomicBool::new(false),
        }
    }

    /// Queue a chunk to be returned by one `read_available` call.
    pub fn push_read(&self, chunk: impl Into<Vec<u8>>) {
        self.reads.lock().unwrap().push_back(chunk.into());
    }

    /// Queue an error for the next unconsumed write.
    pub fn fail_next_write(&self, error: io::Error) {
        self.write_failures.lock().unwrap().push_back(error);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reopen_count(&self) -> usize {
        self.reopens.load(Ordering::SeqCst)
    }
}

impl DevicePort for ScriptedPort {
    fn write_frame(&self, _frame: &[u8]) -> io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.write_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(())
    }

    fn read_available(&self, buffer: &mut BytesMut) -> io::Result<usize> {
        if self.gate_reads_on_reopen.load(Ordering::SeqCst) && self.reopen_count() == 0 {
            return Ok(0);
        }
        match self.reads.lock().unwrap().pop_front() {
            Some(chunk) => {
                buffer.extend_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }

    fn reopen(&self) -> io::Result<()> {
        self.reopens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
