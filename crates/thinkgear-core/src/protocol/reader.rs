use super::error::DecodeError;
use super::layout;

/// Bounds-checked access to a validated frame payload.
///
/// Every read is attributed to the field tag that requested it so a short
/// payload reports which field ran off the end.
pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, tag: u8, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::TruncatedField {
                tag,
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, tag: u8, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::TruncatedField {
                tag,
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    /// Reads one big-endian 24-bit unsigned value starting at `offset`.
    pub fn read_u24_be(&self, tag: u8, offset: usize) -> Result<u32, DecodeError> {
        let end = offset + layout::EEG_BAND_WIDTH;
        let bytes = self
            .payload
            .get(offset..end)
            .ok_or(DecodeError::TruncatedField {
                tag,
                needed: end,
                actual: self.payload.len(),
            })?;
        Ok(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }
}

/// Checksum byte for a payload: `255 - (sum mod 256)`.
///
/// The sum is accumulated unmasked in a `u32` (32 bytes of 0xFF fit easily)
/// and reduced only here, at comparison time.
///
/// # Examples
/// ```
/// use thinkgear_core::checksum;
///
/// assert_eq!(checksum(&[]), 0xFF);
/// assert_eq!(checksum(&[0x02, 0x64, 0x04, 0x32, 0x05, 0x19]), 0x45);
/// ```
pub fn checksum(payload: &[u8]) -> u8 {
    let sum: u32 = payload.iter().map(|&b| u32::from(b)).sum();
    checksum_from_sum(sum)
}

pub(crate) fn checksum_from_sum(sum: u32) -> u8 {
    255 - (sum % 256) as u8
}

#[cfg(test)]
mod tests {
    use super::{PayloadReader, checksum, checksum_from_sum};
    use crate::protocol::error::DecodeError;

    #[test]
    fn read_u24_is_big_endian() {
        let reader = PayloadReader::new(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(reader.read_u24_be(0x83, 0).unwrap(), 0x12_3456);
        assert_eq!(reader.read_u24_be(0x83, 1).unwrap(), 0x34_5678);
    }

    #[test]
    fn read_past_end_is_truncated() {
        let reader = PayloadReader::new(&[0x02]);
        let err = reader.read_u8(0x02, 1).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedField {
                tag: 0x02,
                needed: 2,
                actual: 1
            }
        );
        assert!(reader.read_u24_be(0x83, 0).is_err());
    }

    #[test]
    fn require_len_reports_needed_bytes() {
        let reader = PayloadReader::new(&[0u8; 4]);
        assert!(reader.require_len(0x83, 4).is_ok());
        let msg = reader.require_len(0x83, 26).unwrap_err().to_string();
        assert!(msg.contains("truncated field"));
        assert!(msg.contains("26"));
    }

    #[test]
    fn checksum_of_empty_payload() {
        assert_eq!(checksum(&[]), 0xFF);
    }

    #[test]
    fn checksum_wraps_past_255() {
        // 0xC8 + 0xC8 = 400; 400 mod 256 = 144; 255 - 144 = 111
        assert_eq!(checksum(&[0xC8, 0xC8]), 111);
    }

    #[test]
    fn checksum_wraps_past_510() {
        // 3 * 0xFF = 765; 765 mod 256 = 253; 255 - 253 = 2
        assert_eq!(checksum(&[0xFF, 0xFF, 0xFF]), 2);
    }

    #[test]
    fn checksum_of_full_ff_payload() {
        // 32 * 255 = 8160; 8160 mod 256 = 224
        assert_eq!(checksum(&[0xFF; 32]), 31);
        assert_eq!(checksum_from_sum(8160), 31);
    }
}
