//! Header layers a packet is composed of

use crate::link::EthernetHeader;
use crate::network::Ipv4Header;
use crate::transport::{TcpHeader, UdpHeader};
use crate::ualink::UaLinkHeader;

/// Variant tag of a [`Layer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Link,
    NetworkV4,
    TransportUdp,
    TransportTcp,
    UaLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Link(EthernetHeader),
    NetworkV4(Ipv4Header),
    TransportUdp(UdpHeader),
    TransportTcp(TcpHeader),
    UaLink(UaLinkHeader),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Link(_) => LayerKind::Link,
            Layer::NetworkV4(_) => LayerKind::NetworkV4,
            Layer::TransportUdp(_) => LayerKind::TransportUdp,
            Layer::TransportTcp(_) => LayerKind::TransportTcp,
            Layer::UaLink(_) => LayerKind::UaLink,
        }
    }

    pub fn header_len(&self) -> usize {
        match self {
            Layer::Link(h) => h.header_len(),
            Layer::NetworkV4(h) => h.header_len(),
            Layer::TransportUdp(h) => h.header_len(),
            Layer::TransportTcp(h) => h.header_len(),
            Layer::UaLink(h) => h.header_len(),
        }
    }

    /// Header length plus any payload the layer carries itself
    pub fn on_wire_len(&self) -> usize {
        match self {
            Layer::Link(h) => h.on_wire_len(),
            Layer::NetworkV4(h) => h.on_wire_len(),
            Layer::TransportUdp(h) => h.on_wire_len(),
            Layer::TransportTcp(h) => h.on_wire_len(),
            Layer::UaLink(h) => h.on_wire_len(),
        }
    }

    /// Update a checksum that depends on this layer alone.
    ///
    /// Transport checksums need the enclosing network header and are left
    /// to [`super::Packet::update_checksums`].
    pub fn update_checksum(&mut self) {
        if let Layer::NetworkV4(ip) = self {
            ip.checksum = ip.calculate_checksum();
        }
    }

    /// Header bytes followed by the embodied payload
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Layer::Link(h) => h.to_bytes().to_vec(),
            Layer::NetworkV4(h) => h.to_bytes().to_vec(),
            Layer::TransportUdp(h) => {
                let mut bytes = h.to_bytes().to_vec();
                bytes.extend_from_slice(&h.payload);
                bytes
            }
            Layer::TransportTcp(h) => {
                let mut bytes = h.to_bytes();
                bytes.extend_from_slice(&h.payload);
                bytes
            }
            Layer::UaLink(h) => h.to_bytes().to_vec(),
        }
    }
}

impl From<EthernetHeader> for Layer {
    fn from(header: EthernetHeader) -> Self {
        Layer::Link(header)
    }
}

impl From<Ipv4Header> for Layer {
    fn from(header: Ipv4Header) -> Self {
        Layer::NetworkV4(header)
    }
}

impl From<UdpHeader> for Layer {
    fn from(header: UdpHeader) -> Self {
        Layer::TransportUdp(header)
    }
}

impl From<TcpHeader> for Layer {
    fn from(header: TcpHeader) -> Self {
        Layer::TransportTcp(header)
    }
}

impl From<UaLinkHeader> for Layer {
    fn from(header: UaLinkHeader) -> Self {
        Layer::UaLink(header)
    }
}
