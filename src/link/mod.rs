//! Link layer
//!
//! - Ethernet II framing and MAC address parsing

pub mod ethernet;

pub use ethernet::{parse_mac, EthernetHeader, MacAddr, ETHERNET_HEADER_LEN};
