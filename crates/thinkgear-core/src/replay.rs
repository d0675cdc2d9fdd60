use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::decoder::Decoder;
use crate::source::{ByteSource, ReaderSource, SourceError};
use crate::{ErrorRecord, InputInfo, PacketRecord, ReplayReport, make_stub_report};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode a raw byte capture (headset output saved verbatim) into a report.
pub fn replay_capture_file(path: &Path) -> Result<ReplayReport, ReplayError> {
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: path.metadata()?.len(),
    };
    let source = ReaderSource::open(path)?;
    replay_source(input, source)
}

/// Drain `source` through a fresh decoder.
///
/// The source is polled until it reports no byte available, so it should
/// be finite (a file or an in-memory buffer, not a live port).
pub fn replay_source<S: ByteSource>(
    input: InputInfo,
    mut source: S,
) -> Result<ReplayReport, ReplayError> {
    let mut decoder = Decoder::new();
    let mut packets = Vec::new();
    let mut errors = Vec::new();

    while let Some(byte) = source.next_byte()? {
        let offset = decoder.stats().bytes_consumed;
        let errors_before = decoder.stats().errors_total();
        let fresh = decoder.feed(byte);

        if fresh {
            packets.push(PacketRecord {
                index: packets.len() as u64,
                offset,
                snapshot: decoder.snapshot().clone(),
            });
        }
        if decoder.stats().errors_total() != errors_before {
            if let Some(err) = decoder.last_error() {
                errors.push(ErrorRecord {
                    offset,
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    debug!(
        bytes = decoder.stats().bytes_consumed,
        packets = packets.len(),
        errors = errors.len(),
        "replay finished"
    );

    let mut report = make_stub_report(input);
    report.stats = decoder.stats().clone();
    report.packets = packets;
    report.errors = errors;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::replay_source;
    use crate::InputInfo;
    use crate::protocol::Frame;
    use crate::source::SliceSource;

    fn input(bytes: &[u8]) -> InputInfo {
        InputInfo {
            path: "memory".to_string(),
            bytes: bytes.len() as u64,
        }
    }

    #[test]
    fn replay_records_packets_and_errors_with_offsets() {
        let mut stream = vec![0x00, 0x13];
        stream.extend(Frame::new(&[0x04, 0x32]).unwrap().to_bytes());
        stream.extend([0xAA, 0xAA, 0x02, 0x04, 0x32, 0x00]);
        stream.extend(Frame::new(&[0x05, 0x19, 0x09]).unwrap().to_bytes());

        let report = replay_source(input(&stream), SliceSource::new(stream.clone())).unwrap();
        assert_eq!(report.stats.bytes_consumed, stream.len() as u64);
        assert_eq!(report.packets.len(), 2);
        assert_eq!(report.packets[0].offset, 7);
        assert_eq!(report.packets[0].snapshot.attention(), 50);
        assert_eq!(report.packets[1].index, 1);
        assert_eq!(report.packets[1].snapshot.meditation(), 0x19);

        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["checksum_mismatch", "unrecognized_tag"]);
        assert_eq!(report.errors[0].offset, 13);
    }

    #[test]
    fn replay_of_noise_has_no_packets() {
        let stream = vec![0x55; 64];
        let report = replay_source(input(&stream), SliceSource::new(stream.clone())).unwrap();
        assert!(report.packets.is_empty());
        assert!(report.errors.is_empty());
        assert_eq!(report.input.bytes, 64);
    }
}
