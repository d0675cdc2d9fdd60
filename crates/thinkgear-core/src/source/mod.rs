//! Byte sources feeding the decoder.
//!
//! A source answers one question per poll: is there a byte, and if so which
//! one. It must never block the decode cycle.

mod reader;
mod serial;

pub use reader::ReaderSource;
pub use serial::{SerialSource, available_ports};

use thiserror::Error;

/// Non-blocking supplier of at most one byte per poll.
pub trait ByteSource {
    /// Returns `Ok(None)` when no byte is currently available.
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).next_byte()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial port error: {0}")]
    Serial(String),
}

impl From<serialport::Error> for SourceError {
    fn from(value: serialport::Error) -> Self {
        match value.kind() {
            serialport::ErrorKind::Io(kind) => {
                SourceError::Io(std::io::Error::new(kind, value.description))
            }
            _ => SourceError::Serial(value.to_string()),
        }
    }
}

/// In-memory byte source, mostly for tests and replaying recorded bytes.
///
/// # Examples
/// ```
/// use thinkgear_core::{ByteSource, SliceSource};
///
/// let mut source = SliceSource::new(vec![0xAA]);
/// assert_eq!(source.next_byte()?, Some(0xAA));
/// assert_eq!(source.next_byte()?, None);
/// # Ok::<(), thinkgear_core::SourceError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SliceSource {
    bytes: Vec<u8>,
    position: usize,
}

impl SliceSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Append more bytes, as if they had just arrived on the wire.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

impl ByteSource for SliceSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let byte = self.bytes.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }
}
