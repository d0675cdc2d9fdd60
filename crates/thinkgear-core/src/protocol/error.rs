use thiserror::Error;

/// Decode-time errors recorded in the decoder's latest-error slot.
///
/// None of these are fatal: the framer returns to sync search and the next
/// frame is decoded from scratch.
///
/// # Examples
/// ```
/// use thinkgear_core::DecodeError;
///
/// let err = DecodeError::PacketTooLong { length: 40 };
/// assert!(err.to_string().contains("packet length too long"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("packet length too long: {length} bytes (max 32)")]
    PacketTooLong { length: u8 },
    #[error("checksum mismatch: expected {expected:#04x}, received {received:#04x}")]
    ChecksumMismatch { expected: u8, received: u8 },
    #[error("unrecognized field tag {tag:#04x} at payload offset {offset}")]
    UnrecognizedTag { tag: u8, offset: usize },
    #[error("truncated field {tag:#04x}: need {needed} bytes, payload has {actual}")]
    TruncatedField { tag: u8, needed: usize, actual: usize },
    #[error("frame stalled: no byte for {idle_polls} polls, framer reset")]
    FrameStalled { idle_polls: u32 },
}

impl DecodeError {
    /// Stable snake_case identifier, suitable for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::PacketTooLong { .. } => "packet_too_long",
            DecodeError::ChecksumMismatch { .. } => "checksum_mismatch",
            DecodeError::UnrecognizedTag { .. } => "unrecognized_tag",
            DecodeError::TruncatedField { .. } => "truncated_field",
            DecodeError::FrameStalled { .. } => "frame_stalled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeError;

    #[test]
    fn messages_name_the_failure() {
        let cases = [
            (DecodeError::PacketTooLong { length: 33 }, "packet length too long"),
            (
                DecodeError::ChecksumMismatch {
                    expected: 0x45,
                    received: 0x44,
                },
                "checksum mismatch",
            ),
            (DecodeError::UnrecognizedTag { tag: 0x01, offset: 0 }, "unrecognized field tag"),
            (
                DecodeError::TruncatedField {
                    tag: 0x83,
                    needed: 26,
                    actual: 10,
                },
                "truncated field",
            ),
            (DecodeError::FrameStalled { idle_polls: 5 }, "frame stalled"),
        ];
        for (err, phrase) in cases {
            assert!(err.to_string().contains(phrase), "{err}");
        }
    }

    #[test]
    fn checksum_message_is_hex() {
        let err = DecodeError::ChecksumMismatch {
            expected: 0x45,
            received: 0x0a,
        };
        assert_eq!(err.to_string(), "checksum mismatch: expected 0x45, received 0x0a");
        assert_eq!(err.kind(), "checksum_mismatch");
    }
}
