//! Network interface access
//!
//! - `link`: the [`RawLink`] frame transport the protocol code is written against
//! - `raw_socket`: a Linux `AF_PACKET` implementation of it

pub mod link;
#[cfg(target_os = "linux")]
pub mod raw_socket;

// Re-export commonly used items
pub use link::RawLink;
#[cfg(target_os = "linux")]
pub use raw_socket::RawSocket;
