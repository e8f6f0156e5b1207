//! # OSP Command Encoder
//!
//! Builds complete OSP frames in the frame buffer.

use super::checksum::osp_checksum;
use super::protocol::*;
use crate::error::WriteError;
use crate::frame_buffer::{CapacityExceeded, FrameBuffer};

/// Encode a command from its message id and argument tokens
///
/// Arguments are whitespace-separated unsigned numbers in `base`; each one
/// is truncated to its low 8 bits. With base 16 an optional `0x` prefix is
/// accepted. Signed tokens (`+5`, `-1`) are rejected.
///
/// # Arguments
///
/// * `buffer` - Frame buffer, overwritten by this call
/// * `message_id` - OSP message id (payload byte 0)
/// * `arguments` - Whitespace-separated numeric tokens, e.g. `"00 01 0A"`
/// * `base` - Radix of the tokens (2..=36)
///
/// # Returns
///
/// * `Result<&[u8]>` - Complete frame from `A0 A2` to `B0 B3`
///
/// # Errors
///
/// Returns error if the base is invalid, a token does not parse, or the
/// frame does not fit the buffer. The buffer is validated before any
/// token is stored.
///
/// # Examples
///
/// ```
/// use sirf_link::frame_buffer::FrameBuffer;
/// use sirf_link::osp::encoder::encode_command;
///
/// let mut buffer = FrameBuffer::default();
/// let frame = encode_command(&mut buffer, 0x01, "", 16)?;
/// assert_eq!(frame, &[0xA0, 0xA2, 0x00, 0x01, 0x01, 0x00, 0x01, 0xB0, 0xB3]);
/// # Ok::<(), sirf_link::error::WriteError>(())
/// ```
pub fn encode_command<'b>(
    buffer: &'b mut FrameBuffer,
    message_id: u8,
    arguments: &str,
    base: u32,
) -> Result<&'b [u8], WriteError> {
    if !(2..=36).contains(&base) {
        return Err(WriteError::InvalidBase(base));
    }

    let payload_len = 1 + arguments.split_whitespace().count();
    begin_frame(buffer, payload_len)?;

    buffer.push(message_id).map_err(|e| too_long(e, payload_len))?;
    for token in arguments.split_whitespace() {
        let byte = parse_argument(token, base)?;
        buffer.push(byte).map_err(|e| too_long(e, payload_len))?;
    }

    finish_frame(buffer, payload_len)?;
    Ok(buffer.as_slice())
}

/// Encode a frame around an already-built payload
///
/// # Errors
///
/// Returns `MessageTooLong` if the frame does not fit the buffer or the
/// payload is wider than the 16-bit length field allows.
pub fn encode_payload<'b>(buffer: &'b mut FrameBuffer, payload: &[u8]) -> Result<&'b [u8], WriteError> {
    begin_frame(buffer, payload.len())?;
    buffer
        .extend_from_slice(payload)
        .map_err(|e| too_long(e, payload.len()))?;
    finish_frame(buffer, payload.len())?;
    Ok(buffer.as_slice())
}

/// Parse one argument token and keep its low byte
fn parse_argument(token: &str, base: u32) -> Result<u8, WriteError> {
    let digits = if base == 16 {
        token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token)
    } else {
        token
    };

    if digits.starts_with(|c: char| c == '+' || c == '-') {
        return Err(WriteError::ArgumentParse {
            token: token.to_string(),
            base,
        });
    }

    u64::from_str_radix(digits, base)
        .map(|value| (value & 0xFF) as u8)
        .map_err(|_| WriteError::ArgumentParse {
            token: token.to_string(),
            base,
        })
}

fn too_long(e: CapacityExceeded, payload_len: usize) -> WriteError {
    WriteError::MessageTooLong {
        frame_len: OSP_FRAME_OVERHEAD + payload_len,
        capacity: e.capacity,
    }
}

/// Check the frame fits, then write start sequence and length field
fn begin_frame(buffer: &mut FrameBuffer, payload_len: usize) -> Result<(), WriteError> {
    let frame_len = OSP_FRAME_OVERHEAD + payload_len;
    let length_field = u16::try_from(payload_len).ok().filter(|_| frame_len <= buffer.capacity());
    let Some(length_field) = length_field else {
        return Err(WriteError::MessageTooLong {
            frame_len,
            capacity: buffer.capacity(),
        });
    };

    buffer.clear();
    let [len_hi, len_lo] = length_field.to_be_bytes();
    buffer
        .extend_from_slice(&[OSP_START1, OSP_START2, len_hi, len_lo])
        .map_err(|e| too_long(e, payload_len))
}

/// Append checksum over the payload and the end sequence
fn finish_frame(buffer: &mut FrameBuffer, payload_len: usize) -> Result<(), WriteError> {
    let checksum = osp_checksum(&buffer.as_slice()[4..]);
    let [ck_hi, ck_lo] = checksum.to_be_bytes();
    buffer
        .extend_from_slice(&[ck_hi, ck_lo, OSP_END1, OSP_END2])
        .map_err(|e| too_long(e, payload_len))
}
