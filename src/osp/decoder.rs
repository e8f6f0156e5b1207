//! # OSP Message Decoder
//!
//! Reads one OSP message from a channel into the frame buffer.

use tracing::debug;

use super::checksum::osp_checksum;
use super::protocol::*;
use crate::channel::Channel;
use crate::error::ReadError;
use crate::frame_buffer::FrameBuffer;

/// Read and validate the next OSP message
///
/// Synchronizes on `A0 A2`, reads the big-endian length, then payload and
/// checksum. The end sequence is left in the channel; the next
/// synchronization skips it.
///
/// # Arguments
///
/// * `buffer` - Frame buffer, overwritten by this call
/// * `channel` - Byte source
/// * `patience` - Budget for the synchronization step
///
/// # Returns
///
/// * `Result<OspMessage>` - Message borrowed from `buffer`, or the read status
///
/// # Errors
///
/// Returns error if:
/// - Start sequence not found in time (`SyncTimeout`)
/// - Length field not delivered by a single read (`LengthReadFailed`)
/// - Length is zero or too large for the buffer (`LengthOutOfRange`)
/// - Stream ends before payload and checksum (`TruncatedPayload`)
/// - Checksum does not match (`ChecksumMismatch`)
pub fn read_message<'b, C: Channel + ?Sized>(
    buffer: &'b mut FrameBuffer,
    channel: &mut C,
    patience: usize,
) -> Result<OspMessage<'b>, ReadError> {
    buffer.clear();

    if !OSP_SYNC.synchronize(channel, patience)? {
        return Err(ReadError::SyncTimeout);
    }

    let mut length_field = [0u8; 2];
    let received = channel.read(&mut length_field)?;
    if received != length_field.len() {
        debug!("OSP length field short read: {} bytes", received);
        return Err(ReadError::LengthReadFailed { received });
    }

    let length = usize::from(u16::from_be_bytes(length_field));
    let max = max_payload_len(buffer.capacity());
    if length == 0 || length >= max {
        debug!("OSP payload length {} out of range", length);
        return Err(ReadError::LengthOutOfRange { length, max });
    }

    // Payload plus the 2 checksum bytes
    let expected = length + 2;
    let received = buffer.fill_from(channel, expected)?;
    if received < expected {
        debug!("OSP payload truncated: {} of {} bytes", received, expected);
        return Err(ReadError::TruncatedPayload { expected, received });
    }

    let (payload, checksum_field) = buffer.as_slice().split_at(length);
    let received = u16::from_be_bytes([checksum_field[0], checksum_field[1]]);
    let computed = osp_checksum(payload);
    if computed != received {
        debug!(
            "OSP checksum mismatch for message 0x{:02X}: computed 0x{:04X}, received 0x{:04X}",
            payload[0], computed, received
        );
        return Err(ReadError::ChecksumMismatch { computed, received });
    }

    debug!("OSP message 0x{:02X} ({} bytes)", payload[0], length);
    Ok(OspMessage::new(payload, received))
}
