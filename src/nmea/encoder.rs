//! # NMEA Command Encoder
//!
//! Builds `$PSRF` input commands in the frame buffer.

use std::fmt::Write;

use super::checksum::nmea_checksum;
use super::protocol::SIRF_COMMAND_PREFIX;
use crate::error::WriteError;
use crate::frame_buffer::FrameBuffer;

/// `$` + prefix + `,` before the id digits; `*SS\r\n` after the arguments
const COMMAND_OVERHEAD: usize = 1 + SIRF_COMMAND_PREFIX.len() + 1 + 5;

/// Encode `$PSRF<nnn>,<arguments>*SS\r\n`
///
/// The message id is zero-padded to three digits. The checksum covers
/// everything after `$` up to the end of the arguments.
///
/// # Examples
///
/// ```
/// use sirf_link::frame_buffer::FrameBuffer;
/// use sirf_link::nmea::encoder::encode_command;
///
/// let mut buffer = FrameBuffer::default();
/// let line = encode_command(&mut buffer, 5, "A,B")?;
/// assert_eq!(line, b"$PSRF005,A,B*21\r\n");
/// # Ok::<(), sirf_link::error::WriteError>(())
/// ```
pub fn encode_command<'b>(
    buffer: &'b mut FrameBuffer,
    message_id: u16,
    arguments: &str,
) -> Result<&'b [u8], WriteError> {
    let id_digits = message_id
        .checked_ilog10()
        .map_or(1, |d| d as usize + 1)
        .max(3);
    let frame_len = COMMAND_OVERHEAD + id_digits + arguments.len();
    let capacity = buffer.capacity();
    let too_long = || WriteError::MessageTooLong { frame_len, capacity };
    if frame_len > capacity {
        return Err(too_long());
    }

    buffer.clear();
    write!(buffer, "${}{:03},{}", SIRF_COMMAND_PREFIX, message_id, arguments)
        .map_err(|_| too_long())?;
    let checksum = nmea_checksum(&buffer.as_slice()[1..]);
    write!(buffer, "*{:02X}\r\n", checksum).map_err(|_| too_long())?;

    Ok(buffer.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        let mut buffer = FrameBuffer::default();
        let line = encode_command(&mut buffer, 5, "A,B").unwrap();

        assert_eq!(line, b"$PSRF005,A,B*21\r\n");
    }

    #[test]
    fn test_encode_switch_to_osp() {
        // Switch to SiRF binary at 57600 baud
        let mut buffer = FrameBuffer::default();
        let line = encode_command(&mut buffer, 100, "0,57600,8,1,0").unwrap();

        let expected_checksum = nmea_checksum(b"PSRF100,0,57600,8,1,0");
        let expected = format!("$PSRF100,0,57600,8,1,0*{:02X}\r\n", expected_checksum);
        assert_eq!(line, expected.as_bytes());
    }

    #[test]
    fn test_encode_empty_arguments() {
        let mut buffer = FrameBuffer::default();
        let line = encode_command(&mut buffer, 117, "").unwrap();

        assert!(line.starts_with(b"$PSRF117,*"));
        assert!(line.ends_with(b"\r\n"));
        assert_eq!(line.len(), 14);
    }

    #[test]
    fn test_encode_wide_id_not_truncated() {
        let mut buffer = FrameBuffer::default();
        let line = encode_command(&mut buffer, 1234, "X").unwrap();

        assert!(line.starts_with(b"$PSRF1234,X*"));
    }

    #[test]
    fn test_encode_exact_fit() {
        // "$PSRF005,AB*SS\r\n" is 16 bytes
        let mut buffer = FrameBuffer::with_capacity(16);
        assert!(encode_command(&mut buffer, 5, "AB").is_ok());

        match encode_command(&mut buffer, 5, "ABC") {
            Err(WriteError::MessageTooLong { frame_len, capacity }) => {
                assert_eq!(frame_len, 17);
                assert_eq!(capacity, 16);
            }
            other => panic!("Expected MessageTooLong, got: {:?}", other),
        }
    }
}
