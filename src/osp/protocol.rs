//! # OSP Protocol Constants and Types
//!
//! Wire layout of an OSP frame:
//!
//! ```text
//! A0 A2 | len_hi len_lo | payload (len bytes, byte 0 = message id) | ck_hi ck_lo | B0 B3
//! ```

use crate::sync::Synchronizer;

/// First start-sequence byte
pub const OSP_START1: u8 = 0xA0;

/// Second start-sequence byte
pub const OSP_START2: u8 = 0xA2;

/// First end-sequence byte (written, never checked on read)
pub const OSP_END1: u8 = 0xB0;

/// Second end-sequence byte
pub const OSP_END2: u8 = 0xB3;

/// Frame buffer bytes reserved beside the payload: length (2) + checksum (2)
pub const OSP_FRAMING_OVERHEAD: usize = 4;

/// Bytes of a full frame besides the payload: start (2) + length (2) + checksum (2) + end (2)
pub const OSP_FRAME_OVERHEAD: usize = 8;

/// Scanner for the OSP start sequence
pub const OSP_SYNC: Synchronizer = Synchronizer::new(OSP_START1, OSP_START2);

/// Exclusive upper bound for a received payload length
pub fn max_payload_len(capacity: usize) -> usize {
    capacity.saturating_sub(OSP_FRAMING_OVERHEAD)
}

/// A validated OSP message borrowed from the frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OspMessage<'a> {
    payload: &'a [u8],
    checksum: u16,
}

impl<'a> OspMessage<'a> {
    /// `payload` must hold at least the message id byte
    pub(crate) fn new(payload: &'a [u8], checksum: u16) -> Self {
        debug_assert!(!payload.is_empty());
        Self { payload, checksum }
    }

    /// Complete payload, message id included
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn message_id(&self) -> u8 {
        self.payload[0]
    }

    /// Payload after the message id
    pub fn body(&self) -> &'a [u8] {
        &self.payload[1..]
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(OSP_START1, 0xA0);
        assert_eq!(OSP_START2, 0xA2);
        assert_eq!(OSP_END1, 0xB0);
        assert_eq!(OSP_END2, 0xB3);
        assert_eq!(OSP_SYNC.markers(), [0xA0, 0xA2]);
    }

    #[test]
    fn test_max_payload_len() {
        assert_eq!(max_payload_len(2052), 2048);
        assert_eq!(max_payload_len(3), 0);
    }

    #[test]
    fn test_message_accessors() {
        let payload = [0x02, 0x10, 0x20];
        let message = OspMessage::new(&payload, 0x0032);

        assert_eq!(message.message_id(), 0x02);
        assert_eq!(message.body(), &[0x10, 0x20]);
        assert_eq!(message.len(), 3);
        assert_eq!(message.checksum(), 0x0032);
    }
}
