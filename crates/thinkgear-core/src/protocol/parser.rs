use tracing::trace;

use super::error::DecodeError;
use super::layout;
use super::reader::PayloadReader;
use crate::metrics::MetricsSnapshot;

/// Field tags understood by the payload parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    PoorSignal,
    Attention,
    Meditation,
    RawWave,
    EegPower,
}

impl FieldTag {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            layout::TAG_POOR_SIGNAL => Some(Self::PoorSignal),
            layout::TAG_ATTENTION => Some(Self::Attention),
            layout::TAG_MEDITATION => Some(Self::Meditation),
            layout::TAG_RAW_WAVE => Some(Self::RawWave),
            layout::TAG_EEG_POWER => Some(Self::EegPower),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::PoorSignal => layout::TAG_POOR_SIGNAL,
            Self::Attention => layout::TAG_ATTENTION,
            Self::Meditation => layout::TAG_MEDITATION,
            Self::RawWave => layout::TAG_RAW_WAVE,
            Self::EegPower => layout::TAG_EEG_POWER,
        }
    }

    /// Bytes consumed by the field, tag included.
    #[must_use]
    pub const fn field_len(self) -> usize {
        match self {
            Self::EegPower => layout::EEG_POWER_FIELD_LEN,
            _ => layout::SINGLE_BYTE_FIELD_LEN,
        }
    }
}

/// Decode a checksum-valid payload into `snapshot`.
///
/// Power bands are zeroed before the scan whatever the outcome. On an
/// unknown tag the scan stops; fields written earlier in the same payload
/// stay in the snapshot.
pub fn parse_payload(payload: &[u8], snapshot: &mut MetricsSnapshot) -> Result<(), DecodeError> {
    snapshot.clear_eeg_power();

    let reader = PayloadReader::new(payload);
    let mut offset = 0;
    while let Some(&byte) = payload.get(offset) {
        let tag = FieldTag::from_byte(byte).ok_or(DecodeError::UnrecognizedTag { tag: byte, offset })?;
        match tag {
            FieldTag::PoorSignal => snapshot.signal_quality = reader.read_u8(byte, offset + 1)?,
            FieldTag::Attention => snapshot.attention = reader.read_u8(byte, offset + 1)?,
            FieldTag::Meditation => snapshot.meditation = reader.read_u8(byte, offset + 1)?,
            // The raw sample byte is skipped unread, even past the payload end.
            FieldTag::RawWave => {}
            FieldTag::EegPower => {
                // The sub-length byte at offset + 1 is ignored; the band
                // layout is fixed.
                reader.require_len(byte, offset + layout::EEG_POWER_FIELD_LEN)?;
                let mut bands = [0u32; layout::EEG_POWER_BANDS];
                for (index, band) in bands.iter_mut().enumerate() {
                    let at = offset + layout::EEG_POWER_VALUES_OFFSET + index * layout::EEG_BAND_WIDTH;
                    *band = reader.read_u24_be(byte, at)?;
                }
                snapshot.eeg_power = bands;
                snapshot.has_power = true;
            }
        }
        trace!(?tag, offset, "decoded field");
        offset += tag.field_len();
    }
    Ok(())
}
