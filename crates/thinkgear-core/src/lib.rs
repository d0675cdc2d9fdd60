//! ThinkGear core library for decoding EEG headset serial streams.
//!
//! This crate implements the decoding pipeline used by the CLI: byte
//! sources feed a single-threaded decoder which drives the protocol layers
//! (layout/reader/framer/parser) and keeps the most recent metrics
//! snapshot. Decoding is byte-oriented and side-effect free; all I/O is
//! isolated in `source` modules.
//!
//! Invariants:
//! - At most one byte is consumed per decode cycle; the decoder never blocks.
//! - A frame is parsed only after its checksum matches.
//! - EEG power bands are zeroed at the start of every parse attempt, so
//!   stale bands are never attributed to a packet that did not carry them.
//! - Decode errors are recoverable: they overwrite a single latest-error
//!   slot and the framer returns to sync search.
//!
//! # Examples
//! ```no_run
//! use thinkgear_core::{Decoder, SerialSource};
//!
//! let mut port = SerialSource::open("/dev/rfcomm0", 9600)?;
//! let mut decoder = Decoder::new();
//! loop {
//!     if decoder.advance(&mut port)? {
//!         println!("{}", decoder.snapshot().csv_line());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod decoder;
mod metrics;
pub mod protocol;
mod replay;
mod source;
mod watchdog;

pub use decoder::{Decoder, DecoderStats};
pub use metrics::{EegBand, MetricsSnapshot};
pub use protocol::error::DecodeError;
pub use protocol::reader::checksum;
pub use protocol::{Frame, FrameEvent, Framer, FramerState};
pub use replay::{ReplayError, replay_capture_file, replay_source};
pub use source::{
    ByteSource, ReaderSource, SerialSource, SliceSource, SourceError, available_ports,
};
pub use watchdog::StallWatchdog;

/// Current replay report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Result of replaying a recorded byte stream.
///
/// # Examples
/// ```
/// use thinkgear_core::{InputInfo, make_stub_report};
///
/// let report = make_stub_report(InputInfo {
///     path: "capture.bin".to_string(),
///     bytes: 0,
/// });
/// assert_eq!(report.report_version, thinkgear_core::REPORT_VERSION);
/// assert!(report.packets.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub input: InputInfo,
    pub stats: DecoderStats,
    /// Packets in stream order.
    pub packets: Vec<PacketRecord>,
    /// Decode errors in stream order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorRecord>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "thinkgear").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the replay.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// One checksum-valid packet and the snapshot right after parsing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketRecord {
    pub index: u64,
    /// Byte offset of the checksum byte that completed the packet.
    pub offset: u64,
    pub snapshot: MetricsSnapshot,
}

/// A decode error and the offset of the byte that raised it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub offset: u64,
    /// Stable identifier (e.g., `checksum_mismatch`).
    pub kind: String,
    pub message: String,
}

/// Build a report with base fields filled and empty results.
pub fn make_stub_report(input: InputInfo) -> ReplayReport {
    ReplayReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "thinkgear".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input,
        stats: DecoderStats::default(),
        packets: vec![],
        errors: vec![],
    }
}
