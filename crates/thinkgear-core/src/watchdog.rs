//! Optional liveness guard for frames left open by a silent source.
//!
//! The framer has no timeout of its own. A caller that needs one checks the
//! watchdog once per poll; after `limit` consecutive polls without a new
//! byte while a frame is open, the frame is abandoned.

use tracing::warn;

use crate::decoder::Decoder;
use crate::protocol::FramerState;

/// Counts idle polls while a frame is open.
///
/// # Examples
/// ```
/// use thinkgear_core::{Decoder, StallWatchdog};
///
/// let mut decoder = Decoder::new();
/// let mut watchdog = StallWatchdog::new(3);
/// for byte in [0xAA, 0xAA, 0x04] {
///     decoder.feed(byte);
///     assert!(!watchdog.check(&mut decoder));
/// }
/// assert!(!watchdog.check(&mut decoder));
/// assert!(!watchdog.check(&mut decoder));
/// assert!(watchdog.check(&mut decoder));
/// assert_eq!(decoder.stats().stalls, 1);
/// ```
#[derive(Debug, Clone)]
pub struct StallWatchdog {
    limit: u32,
    idle_polls: u32,
    last_seen: u64,
}

impl StallWatchdog {
    /// `limit == 0` disables the watchdog.
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            idle_polls: 0,
            last_seen: 0,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Record one poll. Returns `true` when the open frame was abandoned.
    pub fn check(&mut self, decoder: &mut Decoder) -> bool {
        let consumed = decoder.stats().bytes_consumed;
        let progressed = consumed != self.last_seen;
        self.last_seen = consumed;

        if self.limit == 0 || progressed || decoder.state() == FramerState::Idle {
            self.idle_polls = 0;
            return false;
        }

        self.idle_polls += 1;
        if self.idle_polls < self.limit {
            return false;
        }

        warn!(
            idle_polls = self.idle_polls,
            state = ?decoder.state(),
            "frame stalled, resetting framer"
        );
        decoder.abandon_stalled_frame(self.idle_polls);
        self.idle_polls = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::StallWatchdog;
    use crate::decoder::Decoder;
    use crate::protocol::FramerState;
    use crate::protocol::error::DecodeError;

    fn open_frame(decoder: &mut Decoder) {
        for byte in [0xAA, 0xAA, 0x06, 0x02] {
            decoder.feed(byte);
        }
    }

    #[test]
    fn idle_framer_never_trips() {
        let mut decoder = Decoder::new();
        let mut watchdog = StallWatchdog::new(2);
        for _ in 0..10 {
            assert!(!watchdog.check(&mut decoder));
        }
        assert_eq!(decoder.stats().stalls, 0);
    }

    #[test]
    fn stalled_frame_is_reset_with_error() {
        let mut decoder = Decoder::new();
        let mut watchdog = StallWatchdog::new(2);
        open_frame(&mut decoder);
        assert!(!watchdog.check(&mut decoder));
        assert!(!watchdog.check(&mut decoder));
        assert!(watchdog.check(&mut decoder));

        assert_eq!(decoder.state(), FramerState::Idle);
        assert_eq!(decoder.last_error(), Some(&DecodeError::FrameStalled { idle_polls: 2 }));
        assert!(decoder.last_error().unwrap().to_string().contains("frame stalled"));
    }

    #[test]
    fn progress_clears_idle_count() {
        let mut decoder = Decoder::new();
        let mut watchdog = StallWatchdog::new(2);
        open_frame(&mut decoder);
        assert!(!watchdog.check(&mut decoder));
        assert!(!watchdog.check(&mut decoder));
        decoder.feed(0x64);
        assert!(!watchdog.check(&mut decoder));
        assert!(!watchdog.check(&mut decoder));
        assert_eq!(decoder.state(), FramerState::ReadingPayload);
    }

    #[test]
    fn zero_limit_disables() {
        let mut decoder = Decoder::new();
        let mut watchdog = StallWatchdog::new(0);
        open_frame(&mut decoder);
        for _ in 0..100 {
            assert!(!watchdog.check(&mut decoder));
        }
        assert_eq!(watchdog.limit(), 0);
    }
}
