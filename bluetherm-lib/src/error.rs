use crate::codec::CodecKind;
use crate::field::Field;
use std::io;
use thiserror::Error;

/// The primary error type for the `bluetherm-lib` library.
#[derive(Error, Debug)]
pub enum BtError {
    #[error("unexpected frame size: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("codec kind {0:?} does not support encoding")]
    UnsupportedEncode(CodecKind),

    #[error("field {0} has no data-flags bit")]
    UnknownField(Field),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
