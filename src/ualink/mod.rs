//! UALink protocol layer
//!
//! A request/acknowledge protocol for reading and writing a remote device's
//! address space, carried directly in Ethernet frames:
//! - `header`: the 16-byte UALink header
//! - `alignment`: byte range to aligned-word mapping and byte enables

pub mod alignment;
pub mod header;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::link::ETHERNET_HEADER_LEN;

pub use alignment::Alignment;
pub use header::{UaLinkHeader, UALINK_HEADER_LEN, UALINK_VERSION_TYPE};

/// Link header plus UALink header
pub const FRAME_HEADER_LEN: usize = ETHERNET_HEADER_LEN + UALINK_HEADER_LEN;

/// Largest payload a single frame carries
pub const MAX_PAYLOAD_LEN: usize = 226;

/// Frame ceiling accepted by the remote side
pub const MAX_FRAME_LEN: usize = FRAME_HEADER_LEN + MAX_PAYLOAD_LEN;

/// A received payload, zero padded to the frame payload limit
pub type Fragment = [u8; MAX_PAYLOAD_LEN];

/// Request opcodes.
///
/// The value of `Ack` has not been confirmed against a peer; the wire value
/// used for acknowledgments comes from `FpgaConfig::ack_opcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Read = 1,
    Write = 2,
    Ack = 3,
}
