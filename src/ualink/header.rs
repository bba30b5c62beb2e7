//! UALink request header
//!
//! Fixed 16-byte header placed directly after the Ethernet header:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 1 | version/type |
//! | 1 | 1 | opcode |
//! | 2 | 1 | tag |
//! | 3 | 1 | request length (words - 1) |
//! | 4 | 2 | request attribute (first mask, last mask) |
//! | 6 | 8 | base address, little endian |
//! | 14 | 2 | reserved |

use byteorder::{ByteOrder, LittleEndian};

use crate::ualink::alignment::Alignment;

pub const UALINK_HEADER_LEN: usize = 16;

/// Version 1 in the high nibble, request type 0 in the low nibble
pub const UALINK_VERSION_TYPE: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UaLinkHeader {
    pub version_type: u8,
    pub opcode: u8,
    pub tag: u8,
    pub request_len: u8,
    pub attribute: u16,
    pub base_address: u64,
    /// Unaligned target address, input to [`UaLinkHeader::align`]
    pub address: u64,
    /// Byte count of the access, input to [`UaLinkHeader::align`]
    pub payload_len: usize,
}

impl Default for UaLinkHeader {
    fn default() -> Self {
        UaLinkHeader {
            version_type: UALINK_VERSION_TYPE,
            opcode: 0,
            tag: 0,
            request_len: 0,
            attribute: 0,
            base_address: 0,
            address: 0,
            payload_len: 0,
        }
    }
}

impl UaLinkHeader {
    /// Record the access to describe.
    ///
    /// Base address, request length and attribute stay untouched until
    /// [`UaLinkHeader::align`] runs right before serialization.
    pub fn set_attributes(&mut self, address: u64, payload_len: usize, opcode: u8, tag: u8) {
        self.version_type = UALINK_VERSION_TYPE;
        self.opcode = opcode;
        self.tag = tag;
        self.address = address;
        self.payload_len = payload_len;
    }

    /// Derive base address, request length and byte enables from the
    /// recorded (address, length) pair
    pub fn align(&mut self) -> Alignment {
        let alignment = Alignment::compute(self.address, self.payload_len);
        self.base_address = alignment.base;
        self.request_len = alignment.request_len;
        self.attribute = alignment.attribute();
        alignment
    }

    pub fn first_mask(&self) -> u8 {
        (self.attribute & 0xFF) as u8
    }

    pub fn last_mask(&self) -> u8 {
        (self.attribute >> 8) as u8
    }

    pub fn header_len(&self) -> usize {
        UALINK_HEADER_LEN
    }

    /// The payload travels outside the layer, see `Packet::serialize_ualink`
    pub fn on_wire_len(&self) -> usize {
        UALINK_HEADER_LEN
    }

    pub fn to_bytes(&self) -> [u8; UALINK_HEADER_LEN] {
        let mut bytes = [0u8; UALINK_HEADER_LEN];
        bytes[0] = self.version_type;
        bytes[1] = self.opcode;
        bytes[2] = self.tag;
        bytes[3] = self.request_len;
        bytes[4] = self.first_mask();
        bytes[5] = self.last_mask();
        LittleEndian::write_u64(&mut bytes[6..14], self.base_address);
        // bytes[14..16] reserved
        bytes
    }

    /// Parse a header received from the wire.
    ///
    /// The unaligned address is unknown on receive; `address` is set to the
    /// base address and `payload_len` to zero.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < UALINK_HEADER_LEN {
            return None;
        }

        let base_address = LittleEndian::read_u64(&data[6..14]);
        Some(UaLinkHeader {
            version_type: data[0],
            opcode: data[1],
            tag: data[2],
            request_len: data[3],
            attribute: data[4] as u16 | (data[5] as u16) << 8,
            base_address,
            address: base_address,
            payload_len: 0,
        })
    }
}
