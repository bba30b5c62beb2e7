//! IPv4 header
//!
//! Header construction, parsing and serialization for the generic
//! link/network/transport packet path. Only the standard 20-byte header
//! (IHL 5, no options) is produced.

use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::network::internet_checksum;
use byteorder::{BigEndian, ByteOrder};

pub const IPV4_HEADER_LEN: usize = 20;
const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)
const DEFAULT_TTL: u8 = 64;

/// IPv4 packet header structure
///
/// Represents the standard 20-byte IPv4 header as defined in RFC 791.
/// `total_len` and `checksum` are filled in by the packet checksum pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: [u8; 4], // Source IP Address
    pub dst_addr: [u8; 4], // Destination IP Address
}

impl Default for Ipv4Header {
    fn default() -> Self {
        Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos: 0,
            total_len: 0,
            id: 0,
            flags_frag_offset: 0,
            ttl: DEFAULT_TTL,
            protocol: protocol::UDP,
            checksum: 0,
            src_addr: [0; 4],
            dst_addr: [0; 4],
        }
    }
}

impl Ipv4Header {
    /// Create a header carrying `protocol` between two addresses
    pub fn new(protocol: u8, src_addr: [u8; 4], dst_addr: [u8; 4]) -> Self {
        Ipv4Header {
            protocol,
            src_addr,
            dst_addr,
            ..Default::default()
        }
    }

    /// Parse IPv4 header from byte slice
    ///
    /// Returns None if the data is too short or if the version field is not 4
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < IPV4_HEADER_LEN {
            return None;
        }

        let version = (data[0] & 0xF0) >> 4;
        if version != IPV4_VERSION {
            return None;
        }

        let mut src_addr = [0u8; 4];
        let mut dst_addr = [0u8; 4];
        src_addr.copy_from_slice(&data[12..16]);
        dst_addr.copy_from_slice(&data[16..20]);

        Some(Ipv4Header {
            version,
            ihl: data[0] & 0x0F,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr,
            dst_addr,
        })
    }

    /// Set the source address from dotted-quad notation
    pub fn set_src_addr(&mut self, addr: &str) -> Result<()> {
        self.src_addr = parse_addr(addr)?;
        Ok(())
    }

    /// Set the destination address from dotted-quad notation
    pub fn set_dst_addr(&mut self, addr: &str) -> Result<()> {
        self.dst_addr = parse_addr(addr)?;
        Ok(())
    }

    /// The header as ten 16-bit words with the checksum field zeroed,
    /// using `total_len` for the length field
    pub fn checksum_words(&self, total_len: u16) -> [u16; 10] {
        [
            (self.version as u16) << 12 | ((self.ihl & 0x0F) as u16) << 8 | self.tos as u16,
            total_len,
            self.id,
            self.flags_frag_offset,
            (self.ttl as u16) << 8 | self.protocol as u16,
            0,
            BigEndian::read_u16(&self.src_addr[0..2]),
            BigEndian::read_u16(&self.src_addr[2..4]),
            BigEndian::read_u16(&self.dst_addr[0..2]),
            BigEndian::read_u16(&self.dst_addr[2..4]),
        ]
    }

    /// Pseudo header for a transport checksum:
    /// src(4) + dst(4) + zero(1) + protocol(1) + transport length(2)
    pub fn pseudo_header_words(&self, protocol: u8, transport_len: u16) -> [u16; 6] {
        [
            BigEndian::read_u16(&self.src_addr[0..2]),
            BigEndian::read_u16(&self.src_addr[2..4]),
            BigEndian::read_u16(&self.dst_addr[0..2]),
            BigEndian::read_u16(&self.dst_addr[2..4]),
            protocol as u16,
            transport_len,
        ]
    }

    /// Recompute the checksum for the current `total_len`
    pub fn calculate_checksum(&self) -> u16 {
        internet_checksum(&self.checksum_words(self.total_len))
    }

    /// Returns true if the stored checksum matches the header fields
    pub fn has_valid_checksum(&self) -> bool {
        self.calculate_checksum() == self.checksum
    }

    /// Convert IPv4 header to bytes
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | self.ihl;
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes[12..16].copy_from_slice(&self.src_addr);
        bytes[16..20].copy_from_slice(&self.dst_addr);

        bytes
    }

    /// Get the header length in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// The IPv4 layer embodies no payload of its own
    pub fn on_wire_len(&self) -> usize {
        self.header_len()
    }
}

fn parse_addr(addr: &str) -> Result<[u8; 4]> {
    addr.parse::<Ipv4Addr>()
        .map(|a| a.octets())
        .map_err(|_| Error::InvalidIpv4(addr.to_string()))
}

/// IPv4 protocol constants
pub mod protocol {
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}
