//! # Error Types
//!
//! Custom error types for SiRF Link using `thiserror`.
//!
//! Reads and writes fail differently. A [`ReadError`] is a per-message
//! status: the frame was not found or did not validate, and the caller may
//! simply try again. A [`WriteError`] means the command was malformed or the
//! link is broken, and nothing is retried behind the caller's back.

use std::io;
use thiserror::Error;

/// Status of a failed OSP or NMEA read
#[derive(Debug, Error)]
pub enum ReadError {
    /// Start sequence not seen before patience ran out
    #[error("start sequence not found before patience was exhausted")]
    SyncTimeout,

    /// The 2-byte OSP length field could not be read in one call
    #[error("failed to read payload length: got {received} of 2 bytes")]
    LengthReadFailed { received: usize },

    /// OSP length field is zero or does not fit the frame buffer
    #[error("payload length {length} out of range (must be 1..{max})")]
    LengthOutOfRange { length: usize, max: usize },

    /// Stream ended before payload and checksum were complete
    #[error("truncated payload: expected {expected} bytes, got {received}")]
    TruncatedPayload { expected: usize, received: usize },

    /// Computed checksum differs from the one carried by the frame
    #[error("checksum mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    ChecksumMismatch { computed: u16, received: u16 },

    /// NMEA line shorter than the minimum `XX*SS`
    #[error("NMEA message too short: {length} bytes before CR")]
    MessageTooShort { length: usize },

    /// NMEA checksum field is not `*` followed by two hex digits
    #[error("malformed NMEA checksum field")]
    MalformedChecksum,

    /// NMEA line filled the frame buffer without a CR
    #[error("NMEA line exceeds buffer capacity of {capacity} bytes")]
    LineOverflow { capacity: usize },

    /// Stream ended (zero-byte read) before the NMEA terminator
    #[error("stream exhausted before end of NMEA message")]
    StreamExhausted,

    /// Non-timeout failure reported by the channel
    #[error("channel error: {0}")]
    Channel(#[from] io::Error),
}

impl ReadError {
    /// Whether the next read can go ahead as if nothing happened.
    ///
    /// Everything except a hard channel error is recoverable: the frame
    /// buffer is fully overwritten on the next attempt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReadError::Channel(_))
    }
}

/// Failure to build or send a command
#[derive(Debug, Error)]
pub enum WriteError {
    /// Frame would not fit in the frame buffer
    #[error("command too long: {frame_len} bytes exceeds capacity {capacity}")]
    MessageTooLong { frame_len: usize, capacity: usize },

    /// Argument token is not a number in the requested base
    #[error("cannot parse argument {token:?} in base {base}")]
    ArgumentParse { token: String, base: u32 },

    /// Numeric base outside 2..=36
    #[error("invalid numeric base {0} (must be 2..=36)")]
    InvalidBase(u32),

    /// Channel accepted fewer bytes than the frame holds
    #[error("write incomplete: {written} of {expected} bytes sent")]
    WriteIncomplete { written: usize, expected: usize },

    /// Channel could not drain its output
    #[error("failed to drain output: {0}")]
    DrainFailed(#[source] io::Error),

    /// Channel rejected the write outright
    #[error("channel error: {0}")]
    Channel(#[from] io::Error),
}

/// Main error type for SiRF Link
#[derive(Debug, Error)]
pub enum SirfLinkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Baud rate not present in the rate table
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// Message read errors
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// Command write errors
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

/// Result type alias for SiRF Link
pub type Result<T> = std::result::Result<T, SirfLinkError>;
