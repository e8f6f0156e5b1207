//! # NMEA Protocol Module
//!
//! Line-oriented ASCII framing for NMEA 0183 sentences and SiRF `$PSRF`
//! input commands.
//!
//! This module handles:
//! - Synchronization on `<LF>$`
//! - Reading a sentence up to `<CR>` and splitting off `*SS`
//! - XOR checksum calculation and verification
//! - `$PSRFnnn,...*SS<CR><LF>` command encoding

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod checksum;
