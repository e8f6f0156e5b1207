//! # OSP Checksum
//!
//! 15-bit running sum: each payload byte is added and the sum is masked
//! with `0x7FFF` after every addition.

/// Mask applied after each addition
pub const OSP_CHECKSUM_MASK: u16 = 0x7FFF;

/// Incremental checksum; feeding the payload in any chunking gives the same value
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OspChecksum {
    sum: u16,
}

impl OspChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.sum = (self.sum + u16::from(byte)) & OSP_CHECKSUM_MASK;
        }
    }

    pub fn value(&self) -> u16 {
        self.sum
    }
}

/// Checksum of a complete payload
///
/// # Examples
///
/// ```
/// use sirf_link::osp::checksum::osp_checksum;
///
/// assert_eq!(osp_checksum(&[0x01]), 0x0001);
/// assert_eq!(osp_checksum(&[0xFF; 200]), (0xFF * 200) & 0x7FFF);
/// ```
pub fn osp_checksum(data: &[u8]) -> u16 {
    let mut checksum = OspChecksum::new();
    checksum.update(data);
    checksum.value()
}
