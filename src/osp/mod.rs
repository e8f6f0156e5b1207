//! # OSP Protocol Module
//!
//! Implementation of the SiRF One Socket Protocol (OSP) binary framing.
//!
//! This module handles:
//! - Frame synchronization on the `A0 A2` start sequence
//! - Length-prefixed payload decoding with range checks
//! - 15-bit running-sum checksum calculation
//! - Command frame encoding from numeric argument tokens

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod checksum;
