//! Network layer protocols and the Internet checksum engine
//!
//! This module contains:
//! - IPv4: Internet Protocol version 4 header
//! - The one's-complement checksum used by IPv4, UDP and TCP

pub mod ipv4;

// Re-export commonly used items
pub use ipv4::{protocol, Ipv4Header};

/// Fold carry bits back into the low 16 bits until none remain
fn fold(mut sum: u32) -> u16 {
    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// Sum data as big-endian 16-bit words without folding.
///
/// An odd trailing byte is treated as the high byte of a final word.
fn sum_bytes(data: &[u8]) -> u32 {
    let mut sum = 0u32;

    for chunk in data.chunks_exact(2) {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    if data.len() % 2 != 0 {
        if let Some(&last_byte) = data.last() {
            sum += (last_byte as u32) << 8;
        }
    }

    sum
}

fn sum_words(words: &[u16]) -> u32 {
    words.iter().map(|&w| w as u32).sum()
}

/// Calculate Internet checksum over a sequence of 16-bit words
///
/// Sums the words, adds the carry bits back in and returns the one's
/// complement of the result. Used for the IPv4 header.
pub fn internet_checksum(words: &[u16]) -> u16 {
    !fold(sum_words(words))
}

/// Calculate Internet checksum over a byte slice
///
/// Same algorithm as [`internet_checksum`], with the bytes read as
/// big-endian words.
pub fn checksum(data: &[u8]) -> u16 {
    !fold(sum_bytes(data))
}

/// Calculate a transport checksum with a pseudo header
///
/// Sums the pseudo-header words, the transport header words (with their
/// checksum field zeroed) and the payload, then returns the one's complement.
pub fn pseudo_header_checksum(pseudo: &[u16], header: &[u16], payload: &[u8]) -> u16 {
    // u32 accumulation cannot overflow for frames below 64 KiB
    let sum = sum_words(pseudo) + sum_words(header) + sum_bytes(payload);
    !fold(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internet_checksum_matches_byte_checksum() {
        let bytes = [0x45, 0x00, 0x00, 0x1c, 0xab, 0xcd, 0x00, 0x00];
        let words = [0x4500, 0x001c, 0xabcd, 0x0000];
        assert_eq!(internet_checksum(&words), checksum(&bytes));
    }

    #[test]
    fn test_carry_folding() {
        // 0xFFFF + 0x0001 = 0x10000 -> folds to 0x0001 -> complement 0xFFFE
        assert_eq!(internet_checksum(&[0xFFFF, 0x0001]), 0xFFFE);
        // Folding can produce a second carry
        assert_eq!(internet_checksum(&[0xFFFF, 0xFFFF, 0xFFFF]), 0x0000);
    }

    #[test]
    fn test_odd_payload_padding() {
        // The trailing byte counts as the high byte of a word
        let with_odd = pseudo_header_checksum(&[], &[], &[0x12, 0x34, 0x56]);
        let padded = pseudo_header_checksum(&[], &[], &[0x12, 0x34, 0x56, 0x00]);
        assert_eq!(with_odd, padded);
        assert_eq!(with_odd, !(0x1234u16 + 0x5600));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(internet_checksum(&[]), 0xFFFF);
        assert_eq!(checksum(&[]), 0xFFFF);
    }
}
