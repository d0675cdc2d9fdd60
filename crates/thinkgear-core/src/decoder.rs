//! Decode cycle: one byte in, at most one packet out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::MetricsSnapshot;
use crate::protocol::error::DecodeError;
use crate::protocol::{FrameEvent, Framer, FramerState, parse_payload};
use crate::source::{ByteSource, SourceError};

/// Running counters since the decoder was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderStats {
    pub bytes_consumed: u64,
    /// Checksum-valid frames handed to the parser.
    pub frames_decoded: u64,
    pub parse_errors: u64,
    pub checksum_errors: u64,
    pub oversize_errors: u64,
    /// Frames abandoned by a stall watchdog.
    pub stalls: u64,
}

impl DecoderStats {
    pub fn errors_total(&self) -> u64 {
        self.parse_errors + self.checksum_errors + self.oversize_errors + self.stalls
    }
}

/// Owns the framer state, the latest snapshot and the latest error.
///
/// Single caller only: drive it from one polling loop.
///
/// # Examples
/// ```
/// use thinkgear_core::{Decoder, SliceSource};
///
/// let mut source = SliceSource::new([0xAA, 0xAA, 0x02, 0x04, 0x32, 0xC9]);
/// let mut decoder = Decoder::new();
/// let mut fresh = false;
/// while source.remaining() > 0 {
///     fresh = decoder.advance(&mut source)?;
/// }
/// assert!(fresh);
/// assert_eq!(decoder.snapshot().attention(), 50);
/// # Ok::<(), thinkgear_core::SourceError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    framer: Framer,
    snapshot: MetricsSnapshot,
    latest_error: Option<DecodeError>,
    stats: DecoderStats,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll `source` once and feed the byte, if any.
    ///
    /// Returns `Ok(true)` exactly when a checksum-valid packet was parsed
    /// during this call, whether or not its fields decoded cleanly. Decode
    /// errors land in `last_error`; only transport failures are returned.
    pub fn advance<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<bool, SourceError> {
        match source.next_byte()? {
            Some(byte) => Ok(self.feed(byte)),
            None => Ok(false),
        }
    }

    /// Push one byte through the framer and parse any completed frame.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.stats.bytes_consumed += 1;
        match self.framer.push(byte) {
            FrameEvent::Pending => false,
            FrameEvent::Ready(frame) => {
                self.stats.frames_decoded += 1;
                match parse_payload(frame.payload(), &mut self.snapshot) {
                    Ok(()) => debug!(length = frame.length(), "packet decoded"),
                    Err(err) => {
                        self.stats.parse_errors += 1;
                        self.record_error(err);
                    }
                }
                true
            }
            FrameEvent::Rejected(err) => {
                match err {
                    DecodeError::ChecksumMismatch { .. } => self.stats.checksum_errors += 1,
                    DecodeError::PacketTooLong { .. } => self.stats.oversize_errors += 1,
                    _ => {}
                }
                self.record_error(err);
                false
            }
        }
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    /// Most recent decode error, absent until the first one.
    pub fn last_error(&self) -> Option<&DecodeError> {
        self.latest_error.as_ref()
    }

    pub fn state(&self) -> FramerState {
        self.framer.state()
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Force the framer back to sync search. The snapshot and the latest
    /// error are kept.
    pub fn reset(&mut self) {
        self.framer.reset();
    }

    pub(crate) fn abandon_stalled_frame(&mut self, idle_polls: u32) {
        self.framer.reset();
        self.stats.stalls += 1;
        self.record_error(DecodeError::FrameStalled { idle_polls });
    }

    fn record_error(&mut self, err: DecodeError) {
        debug!(error = %err, "decode error");
        self.latest_error = Some(err);
    }
}
