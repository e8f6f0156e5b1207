//! # Framing Engine
//!
//! Owns the frame buffer and exposes the read and write operations of both
//! protocols. One engine serves one open channel; it holds a single frame
//! at a time, so calls on the same engine must not overlap.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::channel::{send_frame, Channel};
use crate::error::{ReadError, WriteError};
use crate::frame_buffer::{FrameBuffer, DEFAULT_CAPACITY};
use crate::nmea::protocol::NmeaSentence;
use crate::osp::protocol::OspMessage;
use crate::{nmea, osp};

/// Wire protocol spoken on the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// SiRF binary (One Socket Protocol)
    Osp,
    /// NMEA 0183 text
    Nmea,
}

impl Protocol {
    /// Patience used when the caller has no preference
    ///
    /// Binary input is scanned for twice the buffer size, text input for
    /// one buffer's worth.
    pub fn default_patience(self, capacity: usize) -> usize {
        match self {
            Protocol::Osp => capacity * 2,
            Protocol::Nmea => capacity,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Osp => write!(f, "OSP"),
            Protocol::Nmea => write!(f, "NMEA"),
        }
    }
}

/// A message of either protocol, borrowed from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    Osp(OspMessage<'a>),
    Nmea(NmeaSentence<'a>),
}

impl Message<'_> {
    pub fn protocol(&self) -> Protocol {
        match self {
            Message::Osp(_) => Protocol::Osp,
            Message::Nmea(_) => Protocol::Nmea,
        }
    }
}

/// Frame reader/writer over a caller-supplied channel
#[derive(Debug, Default)]
pub struct Engine {
    buffer: FrameBuffer,
}

impl Engine {
    /// Engine with the default 2052-byte frame buffer
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: FrameBuffer::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Read the next OSP message
    ///
    /// See [`osp::decoder::read_message`] for the statuses returned.
    pub fn read_osp<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        patience: usize,
    ) -> Result<OspMessage<'_>, ReadError> {
        osp::decoder::read_message(&mut self.buffer, channel, patience)
    }

    /// Read the next NMEA sentence
    ///
    /// See [`nmea::decoder::read_sentence`] for the statuses returned.
    pub fn read_nmea<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        patience: usize,
    ) -> Result<NmeaSentence<'_>, ReadError> {
        nmea::decoder::read_sentence(&mut self.buffer, channel, patience)
    }

    /// Read the next message of `protocol`
    pub fn read<C: Channel + ?Sized>(
        &mut self,
        protocol: Protocol,
        channel: &mut C,
        patience: usize,
    ) -> Result<Message<'_>, ReadError> {
        match protocol {
            Protocol::Osp => self.read_osp(channel, patience).map(Message::Osp),
            Protocol::Nmea => self.read_nmea(channel, patience).map(Message::Nmea),
        }
    }

    /// Encode an OSP command and send it with a single write and a drain
    ///
    /// # Arguments
    ///
    /// * `channel` - Byte sink
    /// * `message_id` - OSP message id
    /// * `arguments` - Whitespace-separated byte values
    /// * `base` - Radix of the argument tokens
    ///
    /// # Errors
    ///
    /// Encoding errors are returned before anything is written; see
    /// [`send_frame`] for transmission errors.
    pub fn write_osp<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        message_id: u8,
        arguments: &str,
        base: u32,
    ) -> Result<(), WriteError> {
        let frame = osp::encoder::encode_command(&mut self.buffer, message_id, arguments, base)?;
        send_frame(channel, frame)
    }

    /// Encode a `$PSRF` command and send it with a single write and a drain
    pub fn write_nmea<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        message_id: u16,
        arguments: &str,
    ) -> Result<(), WriteError> {
        let line = nmea::encoder::encode_command(&mut self.buffer, message_id, arguments)?;
        send_frame(channel, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mocks::ScriptedChannel;
    use crate::channel::MockChannel;
    use std::io;

    #[test]
    fn test_osp_loopback() {
        let mut engine = Engine::new();
        let mut channel = ScriptedChannel::loopback();

        for arguments in ["", "00", "01 02 03 04", "FF FF FF FF FF FF FF FF"] {
            engine.write_osp(&mut channel, 0x84, arguments, 16).unwrap();
            let message = engine.read_osp(&mut channel, 64).unwrap();

            assert_eq!(message.message_id(), 0x84);
            assert_eq!(message.body().len(), arguments.split_whitespace().count());
        }
    }

    #[test]
    fn test_osp_loopback_arbitrary_payloads() {
        // Encoding side needs room for the start and end sequences as well
        let mut encode_buffer = FrameBuffer::with_capacity(4096);
        let mut engine = Engine::new();
        let mut channel = ScriptedChannel::loopback();

        for len in [1usize, 2, 17, 255, 256, 1000, 2047] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 131 % 256) as u8).collect();
            let frame = osp::encoder::encode_payload(&mut encode_buffer, &payload).unwrap();
            send_frame(&mut channel, frame).unwrap();

            let message = engine.read_osp(&mut channel, 64).unwrap();
            assert_eq!(message.payload(), payload.as_slice(), "payload length {}", len);
        }
    }

    #[test]
    fn test_nmea_loopback() {
        let mut engine = Engine::new();
        let mut channel = ScriptedChannel::loopback();

        // Sentences are found by <LF>$, so an earlier line must end first
        channel.write(b"\r\n").unwrap();
        engine.write_nmea(&mut channel, 103, "00,01,00,01").unwrap();
        engine.write_nmea(&mut channel, 5, "A,B").unwrap();

        let sentence = engine.read_nmea(&mut channel, 64).unwrap();
        assert_eq!(sentence.as_str(), Some("PSRF103,00,01,00,01"));

        let sentence = engine.read_nmea(&mut channel, 64).unwrap();
        assert_eq!(sentence.as_str(), Some("PSRF005,A,B"));
        assert_eq!(sentence.checksum(), 0x21);
    }

    #[test]
    fn test_read_dispatches_on_protocol() {
        let mut engine = Engine::new();
        let mut channel = ScriptedChannel::with_data(b"\n$GPS*44\r");

        let message = engine.read(Protocol::Nmea, &mut channel, 8).unwrap();
        assert_eq!(message.protocol(), Protocol::Nmea);

        let mut channel = ScriptedChannel::with_data(&[0xA0, 0xA2, 0x00, 0x01, 0x06, 0x00, 0x06]);
        match engine.read(Protocol::Osp, &mut channel, 8).unwrap() {
            Message::Osp(message) => assert_eq!(message.message_id(), 0x06),
            other => panic!("Expected OSP message, got: {:?}", other),
        }
    }

    #[test]
    fn test_write_too_long_never_touches_channel() {
        let mut engine = Engine::with_capacity(16);
        let mut channel = MockChannel::new();
        channel.expect_write().never();
        channel.expect_flush().never();

        let result = engine.write_nmea(&mut channel, 100, "0,57600,8,1,0");
        assert!(matches!(result, Err(WriteError::MessageTooLong { .. })));

        let result = engine.write_osp(&mut channel, 0x84, "00 01 02 03 04 05 06 07", 16);
        assert!(matches!(result, Err(WriteError::MessageTooLong { .. })));
    }

    #[test]
    fn test_write_bad_argument_never_touches_channel() {
        let mut engine = Engine::new();
        let mut channel = MockChannel::new();
        channel.expect_write().never();

        let result = engine.write_osp(&mut channel, 0x84, "00 1G", 16);
        assert!(matches!(result, Err(WriteError::ArgumentParse { .. })));
    }

    #[test]
    fn test_write_nmea_drain_failure() {
        let mut engine = Engine::new();
        let mut channel = MockChannel::new();
        channel.expect_write().times(1).returning(|data| Ok(data.len()));
        channel
            .expect_flush()
            .times(1)
            .returning(|| Err(io::Error::new(io::ErrorKind::Other, "Mock drain error")));

        let result = engine.write_nmea(&mut channel, 100, "1,9600,8,1,0");
        assert!(matches!(result, Err(WriteError::DrainFailed(_))));
    }

    #[test]
    fn test_write_osp_short_write() {
        let mut engine = Engine::new();
        let mut channel = MockChannel::new();
        channel.expect_write().returning(|_| Ok(4));
        channel.expect_flush().returning(|| Ok(()));

        match engine.write_osp(&mut channel, 0x01, "", 16) {
            Err(WriteError::WriteIncomplete { written, expected }) => {
                assert_eq!(written, 4);
                assert_eq!(expected, 9);
            }
            other => panic!("Expected WriteIncomplete, got: {:?}", other),
        }
    }

    #[test]
    fn test_default_patience() {
        assert_eq!(Protocol::Osp.default_patience(2052), 4104);
        assert_eq!(Protocol::Nmea.default_patience(2052), 2052);
    }

    #[test]
    fn test_protocol_display() {
        assert_eq!(Protocol::Osp.to_string(), "OSP");
        assert_eq!(Protocol::Nmea.to_string(), "NMEA");
    }
}
