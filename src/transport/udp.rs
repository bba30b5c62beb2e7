//! UDP (User Datagram Protocol) header
//!
//! The UDP layer carries its payload, so its on-wire length is header plus
//! payload. The checksum needs the IPv4 pseudo header and is therefore
//! filled in by the packet checksum pass.

use crate::error::{Error, Result};
use crate::network::{protocol, pseudo_header_checksum, Ipv4Header};
use byteorder::{BigEndian, ByteOrder};

/// UDP header length in bytes
pub const UDP_HEADER_LEN: usize = 8;

/// UDP header and payload
///
/// Represents the standard 8-byte UDP header as defined in RFC 768
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub checksum: u16,
    pub payload: Vec<u8>,
}

impl UdpHeader {
    pub fn new(src_port: u16, dst_port: u16, payload: Vec<u8>) -> Self {
        UdpHeader {
            src_port,
            dst_port,
            checksum: 0,
            payload,
        }
    }

    /// Set the source port from its decimal string form
    pub fn set_src_port(&mut self, port: &str) -> Result<()> {
        self.src_port = parse_port(port)?;
        Ok(())
    }

    /// Set the destination port from its decimal string form
    pub fn set_dst_port(&mut self, port: &str) -> Result<()> {
        self.dst_port = parse_port(port)?;
        Ok(())
    }

    /// Length field: header plus payload
    pub fn length(&self) -> u16 {
        (UDP_HEADER_LEN + self.payload.len()) as u16
    }

    pub fn header_len(&self) -> usize {
        UDP_HEADER_LEN
    }

    pub fn on_wire_len(&self) -> usize {
        UDP_HEADER_LEN + self.payload.len()
    }

    /// Header words with the checksum field zeroed
    pub fn header_words(&self) -> [u16; 4] {
        [self.src_port, self.dst_port, self.length(), 0]
    }

    /// Calculate the UDP checksum against the enclosing IPv4 header
    pub fn calculate_checksum(&self, ip: &Ipv4Header) -> u16 {
        let pseudo = ip.pseudo_header_words(protocol::UDP, self.length());
        pseudo_header_checksum(&pseudo, &self.header_words(), &self.payload)
    }

    /// Parse header and payload from a datagram
    ///
    /// Returns None if the data is too short or the length field disagrees
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < UDP_HEADER_LEN {
            return None;
        }

        let length = BigEndian::read_u16(&data[4..6]) as usize;
        if length < UDP_HEADER_LEN || length > data.len() {
            return None;
        }

        Some(UdpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            checksum: BigEndian::read_u16(&data[6..8]),
            payload: data[UDP_HEADER_LEN..length].to_vec(),
        })
    }

    /// Convert UDP header to bytes
    pub fn to_bytes(&self) -> [u8; UDP_HEADER_LEN] {
        let mut bytes = [0u8; UDP_HEADER_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u16(&mut bytes[4..6], self.length());
        BigEndian::write_u16(&mut bytes[6..8], self.checksum);
        bytes
    }
}

pub(crate) fn parse_port(port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|_| Error::InvalidPort(port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::checksum;

    #[test]
    fn test_lengths() {
        let udp = UdpHeader::new(1234, 5678, b"hello".to_vec());
        assert_eq!(udp.header_len(), 8);
        assert_eq!(udp.on_wire_len(), 13);
        assert_eq!(udp.length(), 13);
    }

    #[test]
    fn test_checksum_verifies_over_pseudo_header() {
        let ip = Ipv4Header::new(protocol::UDP, [192, 168, 2, 1], [192, 168, 2, 2]);
        let mut udp = UdpHeader::new(1234, 5678, b"Hello from raw Ethernet!".to_vec());
        udp.checksum = udp.calculate_checksum(&ip);

        // Summing pseudo header + datagram with the checksum in place yields zero
        let mut buf = Vec::new();
        buf.extend_from_slice(&ip.src_addr);
        buf.extend_from_slice(&ip.dst_addr);
        buf.extend_from_slice(&[0, protocol::UDP]);
        buf.extend_from_slice(&udp.length().to_be_bytes());
        buf.extend_from_slice(&udp.to_bytes());
        buf.extend_from_slice(&udp.payload);
        assert_eq!(checksum(&buf), 0);
    }

    #[test]
    fn test_parse_ports() {
        let mut udp = UdpHeader::default();
        udp.set_src_port("11211").unwrap();
        udp.set_dst_port("53").unwrap();
        assert_eq!((udp.src_port, udp.dst_port), (11211, 53));
        assert!(matches!(udp.set_src_port("70000"), Err(Error::InvalidPort(_))));
    }

    #[test]
    fn test_from_bytes() {
        let udp = UdpHeader::new(7, 9, vec![1, 2, 3]);
        let mut bytes = udp.to_bytes().to_vec();
        bytes.extend_from_slice(&udp.payload);
        bytes.push(0xEE); // trailing link padding is ignored

        assert_eq!(UdpHeader::from_bytes(&bytes), Some(udp));
        assert!(UdpHeader::from_bytes(&bytes[..7]).is_none());
    }
}
