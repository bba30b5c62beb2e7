//! UALink remote memory access over raw Ethernet
//!
//! This library provides:
//! - Ethernet, IPv4, UDP and TCP header composition with Internet checksums
//! - The UALink request header and its byte-enable alignment arithmetic
//! - Packets built from ordered header layers
//! - Batched read/write transactions against a remote device over a raw link

pub mod error;
pub mod fpga;
pub mod iface;
pub mod link;
pub mod network;
pub mod packet;
pub mod transport;
pub mod ualink;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fpga::{BatchOutcome, FpgaConfig, FpgaInterface};
pub use iface::RawLink;
#[cfg(target_os = "linux")]
pub use iface::RawSocket;
pub use link::EthernetHeader;
pub use network::Ipv4Header;
pub use packet::{Layer, LayerKind, Packet};
pub use transport::{TcpHeader, UdpHeader};
pub use ualink::{Alignment, Fragment, Opcode, UaLinkHeader};
