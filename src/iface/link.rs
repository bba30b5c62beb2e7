//! Transport boundary between the protocol logic and the wire

#[cfg(test)]
use mockall::automock;

/// A bound link-layer interface that moves whole frames.
///
/// Implementations own their handle exclusively and are used from one
/// thread at a time.
#[cfg_attr(test, automock)]
pub trait RawLink {
    /// Transmit one frame. Returns true iff the whole buffer was accepted.
    fn send_frame(&mut self, frame: &[u8]) -> bool;

    /// Wait at most one poll tick for an inbound frame and copy it into
    /// `buf`, truncating if needed.
    ///
    /// Returns the number of bytes copied. A timeout and a receive error both
    /// yield `None`.
    fn recv_frame(&mut self, buf: &mut [u8]) -> Option<usize>;
}
