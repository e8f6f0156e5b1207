//! # NMEA Sentence Decoder
//!
//! Reads one NMEA sentence from a channel into the frame buffer.

use tracing::debug;

use super::checksum::{nmea_checksum, parse_checksum_field};
use super::protocol::*;
use crate::channel::Channel;
use crate::error::ReadError;
use crate::frame_buffer::FrameBuffer;

/// Read and validate the next NMEA sentence
///
/// Synchronizes on `<LF>$`, then reads one byte at a time until `<CR>`.
/// The `<CR>` itself is never stored. The last three bytes before it must
/// be `*` and two hex digits.
///
/// # Arguments
///
/// * `buffer` - Frame buffer, overwritten by this call
/// * `channel` - Byte source
/// * `patience` - Budget for the synchronization step
///
/// # Returns
///
/// * `Result<NmeaSentence>` - Sentence borrowed from `buffer`, or the read status
///
/// # Errors
///
/// Returns error if:
/// - `<LF>$` not found in time (`SyncTimeout`)
/// - A read returns nothing before `<CR>` (`StreamExhausted`)
/// - The line fills the buffer without `<CR>` (`LineOverflow`)
/// - Fewer than 5 bytes precede `<CR>` (`MessageTooShort`)
/// - The trailer is not `*SS` (`MalformedChecksum`)
/// - Checksum does not match (`ChecksumMismatch`)
pub fn read_sentence<'b, C: Channel + ?Sized>(
    buffer: &'b mut FrameBuffer,
    channel: &mut C,
    patience: usize,
) -> Result<NmeaSentence<'b>, ReadError> {
    buffer.clear();

    if !NMEA_SYNC.synchronize(channel, patience)? {
        return Err(ReadError::SyncTimeout);
    }

    let mut byte = [0u8; 1];
    loop {
        if channel.read(&mut byte)? == 0 {
            debug!("NMEA stream exhausted after {} bytes", buffer.len());
            return Err(ReadError::StreamExhausted);
        }
        if byte[0] == NMEA_CR {
            break;
        }
        buffer
            .push(byte[0])
            .map_err(|e| ReadError::LineOverflow { capacity: e.capacity })?;
    }

    let line_len = buffer.len();
    if line_len < NMEA_MIN_LINE_LEN {
        debug!("NMEA line too short: {} bytes", line_len);
        return Err(ReadError::MessageTooShort { length: line_len });
    }

    let (payload, field) = buffer
        .as_slice()
        .split_at(line_len - NMEA_CHECKSUM_FIELD_LEN);
    let received = parse_checksum_field(field).ok_or(ReadError::MalformedChecksum)?;
    let computed = nmea_checksum(payload);
    if computed != received {
        debug!(
            "NMEA checksum mismatch: computed 0x{:02X}, received 0x{:02X}",
            computed, received
        );
        return Err(ReadError::ChecksumMismatch {
            computed: computed.into(),
            received: received.into(),
        });
    }

    debug!("NMEA sentence ({} bytes)", payload.len());
    Ok(NmeaSentence::new(payload, received))
}
