//! Ethernet II header
//!
//! The 14-byte link header that starts every frame this crate builds,
//! for both the generic IPv4 path and the UALink path.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

pub const ETHERNET_HEADER_LEN: usize = 14;

/// Default ethertype of a freshly built link header (IPv4)
pub const ETHERTYPE_IPV4: u16 = 0x0800;

pub type MacAddr = [u8; 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

impl Default for EthernetHeader {
    fn default() -> Self {
        EthernetHeader {
            dst: [0; 6],
            src: [0; 6],
            ethertype: ETHERTYPE_IPV4,
        }
    }
}

impl EthernetHeader {
    pub fn new(src: MacAddr, dst: MacAddr, ethertype: u16) -> Self {
        EthernetHeader { dst, src, ethertype }
    }

    /// Set the source MAC from colon-separated hex, e.g. `aa:bb:cc:dd:ee:ff`
    pub fn set_src_mac(&mut self, mac: &str) -> Result<()> {
        self.src = parse_mac(mac)?;
        Ok(())
    }

    /// Set the destination MAC from colon-separated hex
    pub fn set_dst_mac(&mut self, mac: &str) -> Result<()> {
        self.dst = parse_mac(mac)?;
        Ok(())
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ETHERNET_HEADER_LEN {
            return None;
        }

        let mut dst = [0u8; 6];
        let mut src = [0u8; 6];
        dst.copy_from_slice(&data[0..6]);
        src.copy_from_slice(&data[6..12]);

        Some(EthernetHeader {
            dst,
            src,
            ethertype: BigEndian::read_u16(&data[12..14]),
        })
    }

    pub fn to_bytes(&self) -> [u8; ETHERNET_HEADER_LEN] {
        let mut bytes = [0u8; ETHERNET_HEADER_LEN];
        bytes[0..6].copy_from_slice(&self.dst);
        bytes[6..12].copy_from_slice(&self.src);
        BigEndian::write_u16(&mut bytes[12..14], self.ethertype);
        bytes
    }

    pub fn header_len(&self) -> usize {
        ETHERNET_HEADER_LEN
    }

    pub fn on_wire_len(&self) -> usize {
        ETHERNET_HEADER_LEN
    }
}

/// Parse a colon-separated hex MAC address.
///
/// Exactly six groups of one or two hex digits are accepted.
pub fn parse_mac(mac: &str) -> Result<MacAddr> {
    let invalid = || Error::InvalidMac(mac.to_string());

    let mut addr = [0u8; 6];
    let mut groups = mac.split(':');
    for byte in addr.iter_mut() {
        let group = groups.next().ok_or_else(invalid)?;
        let hex = group.bytes().all(|b| b.is_ascii_hexdigit());
        if group.is_empty() || group.len() > 2 || !hex {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(group, 16).map_err(|_| invalid())?;
    }
    if groups.next().is_some() {
        return Err(invalid());
    }

    Ok(addr)
}
