//! Transport layer headers
//!
//! - UDP: User Datagram Protocol
//! - TCP: Transmission Control Protocol

pub mod tcp;
pub mod udp;

// Re-export commonly used items
pub use tcp::TcpHeader;
pub use udp::UdpHeader;
