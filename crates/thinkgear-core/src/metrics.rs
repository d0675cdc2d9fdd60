//! Latest decoded headset metrics.
//!
//! The snapshot is owned by the decoder and only mutated by the payload
//! parser; callers read it between decode cycles. Values persist until a
//! later packet overwrites them, except the EEG power bands which are
//! zeroed at the start of every parse attempt.

use serde::{Deserialize, Serialize};

use crate::protocol::layout::{DEFAULT_SIGNAL_QUALITY, EEG_POWER_BANDS};

/// Named EEG frequency bands in wire order.
///
/// # Examples
/// ```
/// use thinkgear_core::EegBand;
///
/// assert_eq!(EegBand::LowAlpha.index(), 2);
/// assert_eq!(EegBand::ALL.len(), 8);
/// assert_eq!(EegBand::MidGamma.name(), "mid_gamma");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EegBand {
    Delta,
    Theta,
    LowAlpha,
    HighAlpha,
    LowBeta,
    HighBeta,
    LowGamma,
    MidGamma,
}

impl EegBand {
    pub const ALL: [EegBand; EEG_POWER_BANDS] = [
        EegBand::Delta,
        EegBand::Theta,
        EegBand::LowAlpha,
        EegBand::HighAlpha,
        EegBand::LowBeta,
        EegBand::HighBeta,
        EegBand::LowGamma,
        EegBand::MidGamma,
    ];

    /// Position of the band inside the power field and `eeg_power()`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EegBand::Delta => "delta",
            EegBand::Theta => "theta",
            EegBand::LowAlpha => "low_alpha",
            EegBand::HighAlpha => "high_alpha",
            EegBand::LowBeta => "low_beta",
            EegBand::HighBeta => "high_beta",
            EegBand::LowGamma => "low_gamma",
            EegBand::MidGamma => "mid_gamma",
        }
    }
}

/// Most recently decoded values.
///
/// Defaults to `signal_quality = 200` (no contact) and zero everywhere else
/// until the first packet is parsed.
///
/// # Examples
/// ```
/// use thinkgear_core::MetricsSnapshot;
///
/// let snapshot = MetricsSnapshot::default();
/// assert_eq!(snapshot.signal_quality(), 200);
/// assert_eq!(snapshot.attention(), 0);
/// assert!(!snapshot.has_power());
/// assert_eq!(snapshot.csv_line(), "200,0,0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub(crate) signal_quality: u8,
    pub(crate) attention: u8,
    pub(crate) meditation: u8,
    pub(crate) eeg_power: [u32; EEG_POWER_BANDS],
    pub(crate) has_power: bool,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            signal_quality: DEFAULT_SIGNAL_QUALITY,
            attention: 0,
            meditation: 0,
            eeg_power: [0; EEG_POWER_BANDS],
            has_power: false,
        }
    }
}

impl MetricsSnapshot {
    /// Poor-signal level, 0 (good contact) to 200 (no contact).
    pub fn signal_quality(&self) -> u8 {
        self.signal_quality
    }

    pub fn attention(&self) -> u8 {
        self.attention
    }

    pub fn meditation(&self) -> u8 {
        self.meditation
    }

    /// All eight band powers in wire order (delta through mid-gamma).
    pub fn eeg_power(&self) -> &[u32; EEG_POWER_BANDS] {
        &self.eeg_power
    }

    /// True only if the last parsed payload carried a power-band field.
    pub fn has_power(&self) -> bool {
        self.has_power
    }

    pub fn band(&self, band: EegBand) -> u32 {
        self.eeg_power[band.index()]
    }

    pub fn delta(&self) -> u32 {
        self.band(EegBand::Delta)
    }

    pub fn theta(&self) -> u32 {
        self.band(EegBand::Theta)
    }

    pub fn low_alpha(&self) -> u32 {
        self.band(EegBand::LowAlpha)
    }

    pub fn high_alpha(&self) -> u32 {
        self.band(EegBand::HighAlpha)
    }

    pub fn low_beta(&self) -> u32 {
        self.band(EegBand::LowBeta)
    }

    pub fn high_beta(&self) -> u32 {
        self.band(EegBand::HighBeta)
    }

    pub fn low_gamma(&self) -> u32 {
        self.band(EegBand::LowGamma)
    }

    pub fn mid_gamma(&self) -> u32 {
        self.band(EegBand::MidGamma)
    }

    /// Comma-separated `signal,attention,meditation`, followed by the eight
    /// band powers when the last packet carried them.
    pub fn csv_line(&self) -> String {
        let head = [self.signal_quality, self.attention, self.meditation].map(u32::from);
        let bands: &[u32] = if self.has_power { &self.eeg_power } else { &[] };
        head.iter()
            .chain(bands)
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub(crate) fn clear_eeg_power(&mut self) {
        self.eeg_power = [0; EEG_POWER_BANDS];
        self.has_power = false;
    }
}
