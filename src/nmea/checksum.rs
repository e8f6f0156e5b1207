//! # NMEA Checksum
//!
//! XOR of every byte between `$` and `*`, written as two hex digits.

use super::protocol::{NMEA_CHECKSUM_DELIMITER, NMEA_CHECKSUM_FIELD_LEN};

/// XOR checksum of `data`
///
/// # Examples
///
/// ```
/// use sirf_link::nmea::checksum::nmea_checksum;
///
/// assert_eq!(nmea_checksum(b"GPS"), 0x44);
/// ```
pub fn nmea_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc ^ b)
}

/// Parse a `*SS` trailer; hex digits may be upper or lower case
pub fn parse_checksum_field(field: &[u8]) -> Option<u8> {
    if field.len() != NMEA_CHECKSUM_FIELD_LEN || field[0] != NMEA_CHECKSUM_DELIMITER {
        return None;
    }
    let digits = std::str::from_utf8(&field[1..]).ok()?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_sentence() {
        // Reference GGA sentence, checksum 47
        let payload = b"GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert_eq!(nmea_checksum(payload), 0x47);
    }

    #[test]
    fn test_checksum_empty_and_single() {
        assert_eq!(nmea_checksum(b""), 0x00);
        assert_eq!(nmea_checksum(b"G"), b'G');
    }

    #[test]
    fn test_parse_checksum_field() {
        assert_eq!(parse_checksum_field(b"*2B"), Some(0x2B));
        assert_eq!(parse_checksum_field(b"*2b"), Some(0x2B));
        assert_eq!(parse_checksum_field(b"*00"), Some(0x00));
    }

    #[test]
    fn test_parse_checksum_field_rejects_malformed() {
        assert_eq!(parse_checksum_field(b"#2B"), None);
        assert_eq!(parse_checksum_field(b"*G1"), None);
        assert_eq!(parse_checksum_field(b"*+1"), None);
        assert_eq!(parse_checksum_field(b"*1"), None);
    }
}
