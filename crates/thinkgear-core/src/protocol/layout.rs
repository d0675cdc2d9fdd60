pub const SYNC_BYTE: u8 = 0xAA;
pub const SYNC_LEN: usize = 2;

pub const MAX_PAYLOAD_LEN: usize = 32;

pub const TAG_POOR_SIGNAL: u8 = 0x02;
pub const TAG_ATTENTION: u8 = 0x04;
pub const TAG_MEDITATION: u8 = 0x05;
pub const TAG_RAW_WAVE: u8 = 0x80;
pub const TAG_EEG_POWER: u8 = 0x83;

/// Tag plus one value byte.
pub const SINGLE_BYTE_FIELD_LEN: usize = 2;

pub const EEG_POWER_BANDS: usize = 8;
pub const EEG_BAND_WIDTH: usize = 3;
/// Offset of the first band value relative to the 0x83 tag (tag, sub-length).
pub const EEG_POWER_VALUES_OFFSET: usize = 2;
pub const EEG_POWER_FIELD_LEN: usize = EEG_POWER_VALUES_OFFSET + EEG_POWER_BANDS * EEG_BAND_WIDTH;

pub const DEFAULT_SIGNAL_QUALITY: u8 = 200;
