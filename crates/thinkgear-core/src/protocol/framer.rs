use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::DecodeError;
use super::layout;
use super::reader::{checksum, checksum_from_sum};

/// Where the framer is inside the `SYNC SYNC LENGTH PAYLOAD CHECKSUM` layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramerState {
    /// Scanning for two consecutive sync bytes.
    #[default]
    Idle,
    AwaitingLength,
    ReadingPayload,
    AwaitingChecksum,
}

/// A checksum-valid frame.
///
/// # Examples
/// ```
/// use thinkgear_core::Frame;
///
/// let frame = Frame::new(&[0x04, 0x32])?;
/// assert_eq!(frame.to_bytes(), vec![0xAA, 0xAA, 0x02, 0x04, 0x32, 0xC9]);
/// # Ok::<(), thinkgear_core::DecodeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    length: u8,
    data: [u8; layout::MAX_PAYLOAD_LEN],
    checksum: u8,
}

impl Frame {
    /// Build a frame around `payload`, computing its checksum.
    ///
    /// # Errors
    /// Returns `DecodeError::PacketTooLong` above 32 payload bytes.
    pub fn new(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() > layout::MAX_PAYLOAD_LEN {
            return Err(DecodeError::PacketTooLong {
                length: u8::try_from(payload.len()).unwrap_or(u8::MAX),
            });
        }
        let mut data = [0u8; layout::MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            length: payload.len() as u8,
            data,
            checksum: checksum(payload),
        })
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.length)]
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Wire encoding including the sync pair.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(layout::SYNC_LEN + 2 + self.payload().len());
        bytes.extend_from_slice(&[layout::SYNC_BYTE; layout::SYNC_LEN]);
        bytes.push(self.length);
        bytes.extend_from_slice(self.payload());
        bytes.push(self.checksum);
        bytes
    }
}

/// Outcome of pushing one byte into the framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// Byte absorbed, no frame boundary reached.
    Pending,
    Ready(Frame),
    Rejected(DecodeError),
}

/// Byte-at-a-time frame synchronizer.
///
/// Frame state lives entirely in this struct; a stalled frame stays open
/// until more bytes arrive or `reset` is called.
#[derive(Debug, Clone)]
pub struct Framer {
    state: FramerState,
    last_byte: Option<u8>,
    length: u8,
    index: usize,
    accumulator: u32,
    buffer: [u8; layout::MAX_PAYLOAD_LEN],
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self {
            state: FramerState::Idle,
            last_byte: None,
            length: 0,
            index: 0,
            accumulator: 0,
            buffer: [0; layout::MAX_PAYLOAD_LEN],
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Abandon any open frame and return to sync search. A fresh sync pair
    /// is required afterwards.
    pub fn reset(&mut self) {
        self.state = FramerState::Idle;
        self.last_byte = None;
        self.begin_frame();
    }

    pub fn push(&mut self, byte: u8) -> FrameEvent {
        let event = match self.state {
            FramerState::Idle => FrameEvent::Pending,
            FramerState::AwaitingLength => self.on_length(byte),
            FramerState::ReadingPayload => self.on_payload(byte),
            FramerState::AwaitingChecksum => self.on_checksum(byte),
        };

        // The byte that closes or aborts a frame still counts toward the
        // next sync pair.
        if self.state == FramerState::Idle
            && byte == layout::SYNC_BYTE
            && self.last_byte == Some(layout::SYNC_BYTE)
        {
            trace!("sync");
            self.state = FramerState::AwaitingLength;
            self.begin_frame();
        }
        self.last_byte = Some(byte);
        event
    }

    fn begin_frame(&mut self) {
        self.length = 0;
        self.index = 0;
        self.accumulator = 0;
        self.buffer = [0; layout::MAX_PAYLOAD_LEN];
    }

    fn on_length(&mut self, byte: u8) -> FrameEvent {
        if usize::from(byte) > layout::MAX_PAYLOAD_LEN {
            self.state = FramerState::Idle;
            return FrameEvent::Rejected(DecodeError::PacketTooLong { length: byte });
        }
        self.length = byte;
        self.state = if byte == 0 {
            FramerState::AwaitingChecksum
        } else {
            FramerState::ReadingPayload
        };
        FrameEvent::Pending
    }

    fn on_payload(&mut self, byte: u8) -> FrameEvent {
        self.buffer[self.index] = byte;
        self.index += 1;
        self.accumulator += u32::from(byte);
        if self.index == usize::from(self.length) {
            self.state = FramerState::AwaitingChecksum;
        }
        FrameEvent::Pending
    }

    fn on_checksum(&mut self, received: u8) -> FrameEvent {
        self.state = FramerState::Idle;
        let expected = checksum_from_sum(self.accumulator);
        if expected != received {
            return FrameEvent::Rejected(DecodeError::ChecksumMismatch { expected, received });
        }
        FrameEvent::Ready(Frame {
            length: self.length,
            data: self.buffer,
            checksum: received,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameEvent, Framer, FramerState};
    use crate::protocol::error::DecodeError;

    fn push_all(framer: &mut Framer, bytes: &[u8]) -> Vec<FrameEvent> {
        bytes
            .iter()
            .map(|&b| framer.push(b))
            .filter(|event| *event != FrameEvent::Pending)
            .collect()
    }

    #[test]
    fn state_walks_through_frame() {
        let mut framer = Framer::new();
        assert_eq!(framer.state(), FramerState::Idle);
        framer.push(0xAA);
        assert_eq!(framer.state(), FramerState::Idle);
        framer.push(0xAA);
        assert_eq!(framer.state(), FramerState::AwaitingLength);
        framer.push(0x02);
        assert_eq!(framer.state(), FramerState::ReadingPayload);
        framer.push(0x04);
        assert_eq!(framer.state(), FramerState::ReadingPayload);
        framer.push(0x32);
        assert_eq!(framer.state(), FramerState::AwaitingChecksum);
        let event = framer.push(0xC9);
        assert_eq!(framer.state(), FramerState::Idle);
        match event {
            FrameEvent::Ready(frame) => assert_eq!(frame.payload(), &[0x04, 0x32]),
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn lone_sync_byte_does_not_open_frame() {
        let mut framer = Framer::new();
        for byte in [0xAA, 0x01, 0xAA, 0x02] {
            framer.push(byte);
            assert_eq!(framer.state(), FramerState::Idle);
        }
    }

    #[test]
    fn zero_length_frame() {
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &[0xAA, 0xAA, 0x00, 0xFF]);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], FrameEvent::Ready(frame) if frame.length() == 0));
    }

    #[test]
    fn oversize_length_rejected_before_payload() {
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &[0xAA, 0xAA, 33]);
        assert_eq!(events, vec![FrameEvent::Rejected(DecodeError::PacketTooLong { length: 33 })]);
        assert_eq!(framer.state(), FramerState::Idle);
    }

    #[test]
    fn max_length_accepted() {
        let payload = [0x80, 0x00].repeat(16);
        let frame = Frame::new(&payload).unwrap();
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &frame.to_bytes());
        assert_eq!(events, vec![FrameEvent::Ready(frame)]);
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &[0xAA, 0xAA, 0x02, 0x04, 0x32, 0xC8]);
        assert_eq!(
            events,
            vec![FrameEvent::Rejected(DecodeError::ChecksumMismatch {
                expected: 0xC9,
                received: 0xC8
            })]
        );
    }

    #[test]
    fn checksum_accumulates_past_byte_range() {
        let payload = [0xFF; 20];
        let frame = Frame::new(&payload).unwrap();
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &frame.to_bytes());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FrameEvent::Ready(_)));
    }

    #[test]
    fn sync_bytes_inside_payload_are_data() {
        let frame = Frame::new(&[0x80, 0xAA, 0x80, 0xAA]).unwrap();
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &frame.to_bytes());
        assert_eq!(events, vec![FrameEvent::Ready(frame)]);
    }

    #[test]
    fn oversize_sync_byte_as_length_resyncs() {
        let mut framer = Framer::new();
        let events = push_all(&mut framer, &[0xAA, 0xAA, 0xAA]);
        assert_eq!(events, vec![FrameEvent::Rejected(DecodeError::PacketTooLong { length: 0xAA })]);
        assert_eq!(framer.state(), FramerState::AwaitingLength);

        let events = push_all(&mut framer, &[0x02, 0x04, 0x32, 0xC9]);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FrameEvent::Ready(_)));
    }

    #[test]
    fn reset_abandons_open_frame() {
        let mut framer = Framer::new();
        push_all(&mut framer, &[0xAA, 0xAA, 0x04, 0x02]);
        assert_eq!(framer.state(), FramerState::ReadingPayload);
        framer.reset();
        assert_eq!(framer.state(), FramerState::Idle);

        let frame = Frame::new(&[0x05, 0x11]).unwrap();
        let events = push_all(&mut framer, &frame.to_bytes());
        assert_eq!(events, vec![FrameEvent::Ready(frame)]);
    }

    #[test]
    fn frame_new_rejects_oversize_payload() {
        let err = Frame::new(&[0u8; 33]).unwrap_err();
        assert_eq!(err, DecodeError::PacketTooLong { length: 33 });
    }
}
