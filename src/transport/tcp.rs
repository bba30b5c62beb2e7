//! TCP (Transmission Control Protocol) header
//!
//! Header composition for the generic packet path. There is no connection
//! state here: the layer is a header, its options and the payload it
//! carries.

use crate::network::{protocol, pseudo_header_checksum, Ipv4Header};

/// Minimum TCP header length in bytes (data offset 5)
pub const TCP_MIN_HEADER_LEN: usize = 20;
const DEFAULT_DATA_OFFSET: u16 = 5;
const DEFAULT_WINDOW: u16 = 65535;

pub mod flags {
    pub const FIN: u16 = 0x0001;
    pub const SYN: u16 = 0x0002;
    pub const RST: u16 = 0x0004;
    pub const PSH: u16 = 0x0008;
    pub const ACK: u16 = 0x0010;
    pub const URG: u16 = 0x0020;
}

/// TCP header structure
///
/// Represents the 20-byte TCP header as defined in RFC 793, followed by
/// options (padded to 32-bit words) and the segment payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_number: u32,
    pub ack_number: u32,
    pub data_offset_and_flags: u16, // Data offset (4 bits) + Reserved (3 bits) + Flags (9 bits)
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_ptr: u16,
    pub options: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Default for TcpHeader {
    fn default() -> Self {
        TcpHeader {
            src_port: 0,
            dst_port: 0,
            seq_number: 0,
            ack_number: 0,
            data_offset_and_flags: DEFAULT_DATA_OFFSET << 12,
            window_size: DEFAULT_WINDOW,
            checksum: 0,
            urgent_ptr: 0,
            options: Vec::new(),
            payload: Vec::new(),
        }
    }
}

impl TcpHeader {
    pub fn new(src_port: u16, dst_port: u16, seq_number: u32, payload: Vec<u8>) -> Self {
        TcpHeader {
            src_port,
            dst_port,
            seq_number,
            payload,
            ..Default::default()
        }
    }

    /// Parse TCP header, options and payload from a segment
    ///
    /// Returns None if the data is too short for the header or its options
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < TCP_MIN_HEADER_LEN {
            return None;
        }

        let data_offset_and_flags = u16::from_be_bytes([data[12], data[13]]);
        let header_len = ((data_offset_and_flags >> 12) as usize) * 4;
        if header_len < TCP_MIN_HEADER_LEN || header_len > data.len() {
            return None;
        }

        Some(TcpHeader {
            src_port: u16::from_be_bytes([data[0], data[1]]),
            dst_port: u16::from_be_bytes([data[2], data[3]]),
            seq_number: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            ack_number: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            data_offset_and_flags,
            window_size: u16::from_be_bytes([data[14], data[15]]),
            checksum: u16::from_be_bytes([data[16], data[17]]),
            urgent_ptr: u16::from_be_bytes([data[18], data[19]]),
            options: data[TCP_MIN_HEADER_LEN..header_len].to_vec(),
            payload: data[header_len..].to_vec(),
        })
    }

    /// Convert the header and options to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.header_len());
        bytes.extend_from_slice(&self.src_port.to_be_bytes());
        bytes.extend_from_slice(&self.dst_port.to_be_bytes());
        bytes.extend_from_slice(&self.seq_number.to_be_bytes());
        bytes.extend_from_slice(&self.ack_number.to_be_bytes());
        bytes.extend_from_slice(&self.data_offset_and_flags.to_be_bytes());
        bytes.extend_from_slice(&self.window_size.to_be_bytes());
        bytes.extend_from_slice(&self.checksum.to_be_bytes());
        bytes.extend_from_slice(&self.urgent_ptr.to_be_bytes());
        bytes.extend_from_slice(&self.options);
        bytes.resize(self.header_len(), 0);
        bytes
    }

    /// Replace the options, padding them to a 32-bit boundary and
    /// updating the data offset
    pub fn set_options(&mut self, options: &[u8]) {
        let mut padded = options.to_vec();
        padded.resize((options.len() + 3) / 4 * 4, 0);
        let words = ((TCP_MIN_HEADER_LEN + padded.len()) / 4) as u16;
        self.data_offset_and_flags = (words << 12) | (self.data_offset_and_flags & 0x01FF);
        self.options = padded;
    }

    /// Get the data offset (header length) in bytes
    pub fn header_len(&self) -> usize {
        ((self.data_offset_and_flags >> 12) as usize) * 4
    }

    pub fn on_wire_len(&self) -> usize {
        self.header_len() + self.payload.len()
    }

    /// Header and option words with the checksum field zeroed
    pub fn header_words(&self) -> Vec<u16> {
        let mut bytes = self.to_bytes();
        bytes[16] = 0;
        bytes[17] = 0;
        bytes
            .chunks_exact(2)
            .map(|w| u16::from_be_bytes([w[0], w[1]]))
            .collect()
    }

    /// Calculate the TCP checksum against the enclosing IPv4 header
    pub fn calculate_checksum(&self, ip: &Ipv4Header) -> u16 {
        let pseudo = ip.pseudo_header_words(protocol::TCP, self.on_wire_len() as u16);
        pseudo_header_checksum(&pseudo, &self.header_words(), &self.payload)
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        (self.data_offset_and_flags & flag) != 0
    }

    /// Set TCP flags, preserving the data offset
    pub fn set_flags(&mut self, flags: u16) {
        self.data_offset_and_flags = (self.data_offset_and_flags & 0xF000) | (flags & 0x01FF);
    }
}
