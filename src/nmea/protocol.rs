//! # NMEA Protocol Constants and Types

use crate::sync::Synchronizer;

/// ASCII line feed; precedes `$` at the start of a sentence
pub const NMEA_LF: u8 = 0x0A;

/// ASCII carriage return; ends a sentence on read
pub const NMEA_CR: u8 = 0x0D;

/// Sentence start character
pub const NMEA_START: u8 = b'$';

/// Checksum delimiter, followed by two hex digits
pub const NMEA_CHECKSUM_DELIMITER: u8 = b'*';

/// Length of the `*SS` trailer
pub const NMEA_CHECKSUM_FIELD_LEN: usize = 3;

/// Fewer bytes than this before `<CR>` cannot hold a sentence plus `*SS`
pub const NMEA_MIN_LINE_LEN: usize = 5;

/// Talker and vendor prefix of SiRF input commands
pub const SIRF_COMMAND_PREFIX: &str = "PSRF";

/// Scanner for the `<LF>$` start sequence
pub const NMEA_SYNC: Synchronizer = Synchronizer::new(NMEA_LF, NMEA_START);

/// A validated NMEA sentence borrowed from the frame buffer
///
/// The payload is everything between `$` and `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmeaSentence<'a> {
    payload: &'a [u8],
    checksum: u8,
}

impl<'a> NmeaSentence<'a> {
    pub(crate) fn new(payload: &'a [u8], checksum: u8) -> Self {
        Self { payload, checksum }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.payload
    }

    /// Payload as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.payload).ok()
    }

    /// Comma-separated fields, including the sentence id
    pub fn fields(&self) -> impl Iterator<Item = &'a [u8]> {
        self.payload.split(|&b| b == b',')
    }

    /// First field, e.g. `GPGGA`
    pub fn sentence_id(&self) -> Option<&'a str> {
        self.fields().next().and_then(|id| std::str::from_utf8(id).ok())
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}
