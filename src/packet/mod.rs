//! Frames composed of ordered header layers
//!
//! A [`Packet`] owns its layers in wire order. It drives the checksum pass
//! across the layers and assembles the bytes to transmit, either for the
//! generic link/network/transport path or for a UALink request.

pub mod layer;

pub use layer::{Layer, LayerKind};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::ualink::{Opcode, FRAME_HEADER_LEN, MAX_PAYLOAD_LEN};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    layers: Vec<Layer>,
}

impl Packet {
    pub fn new() -> Self {
        Packet::default()
    }

    /// Append a layer.
    ///
    /// No ordering rules are enforced: the caller pushes layers in wire
    /// order, outermost first.
    pub fn push(&mut self, layer: impl Into<Layer>) -> &mut Self {
        self.layers.push(layer.into());
        self
    }

    /// Append a layer, taking and returning the packet by value
    pub fn with(mut self, layer: impl Into<Layer>) -> Self {
        self.layers.push(layer.into());
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// First layer of the given kind
    pub fn find(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total on-wire length of all layers
    pub fn on_wire_len(&self) -> usize {
        self.layers.iter().map(Layer::on_wire_len).sum()
    }

    /// Fill in every checksum of the packet.
    ///
    /// Must run after the last layer is pushed. Each layer first updates its
    /// own checksum; then every IPv4 layer gets its total length from the
    /// layers that follow it, and a UDP or TCP layer directly after it gets
    /// its pseudo-header checksum.
    pub fn update_checksums(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.update_checksum();
        }

        for i in 0..self.layers.len() {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            let Layer::NetworkV4(ip) = &mut head[i] else {
                continue;
            };

            let len: usize = tail.iter().map(Layer::on_wire_len).sum();
            ip.total_len = (ip.header_len() + len) as u16;
            ip.checksum = ip.calculate_checksum();

            match tail.first_mut() {
                Some(Layer::TransportUdp(udp)) => udp.checksum = udp.calculate_checksum(ip),
                Some(Layer::TransportTcp(tcp)) => tcp.checksum = tcp.calculate_checksum(ip),
                _ => {}
            }
        }
    }

    /// Concatenate all layers in wire order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.on_wire_len());
        for layer in &self.layers {
            bytes.extend_from_slice(&layer.to_bytes());
        }
        bytes
    }

    /// Serialize a link + UALink packet into one transmit buffer.
    ///
    /// Aligns the UALink header from its recorded (address, length) pair,
    /// then emits the 14-byte link header, the 16-byte UALink header and,
    /// for write requests only, `payload`. The buffer length is the frame
    /// length.
    pub fn serialize_ualink(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        let link = match self.find(LayerKind::Link) {
            Some(Layer::Link(link)) => *link,
            _ => return Err(Error::MissingLayer(LayerKind::Link)),
        };
        let ualink = self
            .layers
            .iter_mut()
            .find_map(|l| match l {
                Layer::UaLink(h) => Some(h),
                _ => None,
            })
            .ok_or(Error::MissingLayer(LayerKind::UaLink))?;
        ualink.align();

        let with_payload = ualink.opcode == u8::from(Opcode::Write);
        let frame_len = FRAME_HEADER_LEN + if with_payload { payload.len() } else { 0 };

        let mut frame = vec![0u8; frame_len];
        frame[0..6].copy_from_slice(&link.dst);
        frame[6..12].copy_from_slice(&link.src);
        BigEndian::write_u16(&mut frame[12..14], link.ethertype);
        frame[14] = ualink.version_type;
        frame[15] = ualink.opcode;
        frame[16] = ualink.tag;
        frame[17] = ualink.request_len;
        frame[18] = ualink.first_mask();
        frame[19] = ualink.last_mask();
        LittleEndian::write_u64(&mut frame[20..28], ualink.base_address);
        // frame[28..30] reserved
        if with_payload {
            frame[FRAME_HEADER_LEN..].copy_from_slice(payload);
        }

        Ok(frame)
    }
}
