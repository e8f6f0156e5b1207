//! # Channel Abstraction
//!
//! The byte-stream collaborator the framing engine reads from and writes to.
//!
//! A channel is blocking and timeout-bounded: `read` waits at most the
//! configured timeout and returns `Ok(0)` when nothing arrived (or the
//! stream ended). Opening the port and programming its baud rate belong to
//! the implementor, see [`crate::serial::SerialChannel`].

use std::io;
use tracing::debug;

use crate::error::WriteError;

/// Blocking byte source/sink used by the codecs
#[cfg_attr(test, mockall::automock)]
pub trait Channel {
    /// Read up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` on timeout or end of stream. `Err` is reserved for
    /// failures of the link itself.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes in one call, returning how many were accepted
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Drain buffered output to the wire
    fn flush(&mut self) -> io::Result<()>;
}

/// Write a complete frame in one call, then drain the channel.
///
/// The drain is requested even after a short write so the receiver sees
/// whatever did go out; the short write is reported afterwards.
///
/// # Errors
///
/// * `WriteError::Channel` - the write call itself failed
/// * `WriteError::DrainFailed` - flush failed
/// * `WriteError::WriteIncomplete` - fewer bytes accepted than requested
pub fn send_frame<C: Channel + ?Sized>(channel: &mut C, frame: &[u8]) -> Result<(), WriteError> {
    let written = channel.write(frame)?;
    channel.flush().map_err(WriteError::DrainFailed)?;

    if written != frame.len() {
        return Err(WriteError::WriteIncomplete {
            written,
            expected: frame.len(),
        });
    }

    debug!("Sent frame ({} bytes): {:02X?}", frame.len(), frame);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::mocks::ScriptedChannel;
    use super::*;

    #[test]
    fn test_send_frame_writes_and_flushes() {
        let mut channel = ScriptedChannel::new();
        send_frame(&mut channel, &[0xA0, 0xA2, 0x00]).unwrap();

        assert_eq!(channel.written, vec![0xA0, 0xA2, 0x00]);
        assert_eq!(channel.flushes, 1);
    }

    #[test]
    fn test_send_frame_short_write() {
        let mut channel = MockChannel::new();
        channel.expect_write().times(1).returning(|data| Ok(data.len() - 1));
        channel.expect_flush().times(1).returning(|| Ok(()));

        let result = send_frame(&mut channel, &[1, 2, 3, 4]);
        match result {
            Err(WriteError::WriteIncomplete { written, expected }) => {
                assert_eq!(written, 3);
                assert_eq!(expected, 4);
            }
            other => panic!("Expected WriteIncomplete, got: {:?}", other),
        }
    }

    #[test]
    fn test_send_frame_drain_failure() {
        let mut channel = MockChannel::new();
        channel.expect_write().returning(|data| Ok(data.len()));
        channel
            .expect_flush()
            .returning(|| Err(io::Error::new(io::ErrorKind::Other, "Mock drain error")));

        let result = send_frame(&mut channel, &[1, 2, 3]);
        assert!(matches!(result, Err(WriteError::DrainFailed(_))));
    }

    #[test]
    fn test_send_frame_write_error_skips_flush() {
        let mut channel = MockChannel::new();
        channel
            .expect_write()
            .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "Mock write error")));
        channel.expect_flush().never();

        let result = send_frame(&mut channel, &[1]);
        assert!(matches!(result, Err(WriteError::Channel(_))));
    }

    #[test]
    fn test_scripted_reads_stop_at_chunk_boundary() {
        let mut channel = ScriptedChannel::new().chunk(&[1, 2]).timeout().chunk(&[3]);
        let mut buf = [0u8; 8];

        assert_eq!(channel.read(&mut buf).unwrap(), 2);
        assert_eq!(channel.read(&mut buf).unwrap(), 0);
        assert_eq!(channel.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 3);
        assert_eq!(channel.read(&mut buf).unwrap(), 0);
        assert_eq!(channel.reads, 4);
    }
}
