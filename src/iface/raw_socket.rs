//! `AF_PACKET` raw socket bound to one network interface (Linux only).
//!
//! Requires `CAP_NET_RAW`. The socket receives every frame seen on the
//! interface (`ETH_P_ALL`), including the ones it sent itself; filtering is
//! left to the caller.

use std::ffi::CString;
use std::io::{ErrorKind, Read};
use std::mem;
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::iface::link::RawLink;

const ETH_P_ALL: u16 = libc::ETH_P_ALL as u16;

/// Smallest receive timeout the kernel accepts as "bounded"
const MIN_POLL_INTERVAL: Duration = Duration::from_micros(1);

pub struct RawSocket {
    socket: Socket,
    interface: String,
}

impl RawSocket {
    /// Open a raw socket on `interface`.
    ///
    /// Each receive waits at most `poll_interval`. The descriptor is closed
    /// on every error path since `Socket` owns it from creation on.
    pub fn open(interface: &str, poll_interval: Duration) -> Result<Self> {
        let index = if_index(interface)?;

        let socket = Socket::new(
            Domain::PACKET,
            Type::RAW,
            Some(Protocol::from(ETH_P_ALL.to_be() as libc::c_int)),
        )?;
        socket.bind(&link_addr(index))?;
        socket.set_read_timeout(Some(poll_interval.max(MIN_POLL_INTERVAL)))?;

        info!(interface, index, "raw socket bound");

        Ok(RawSocket {
            socket,
            interface: interface.to_string(),
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl RawLink for RawSocket {
    fn send_frame(&mut self, frame: &[u8]) -> bool {
        match self.socket.send(frame) {
            Ok(n) if n == frame.len() => {
                trace!(bytes = n, "frame sent");
                true
            }
            Ok(n) => {
                warn!(sent = n, expected = frame.len(), "short send");
                false
            }
            Err(e) => {
                warn!(error = %e, "send failed");
                false
            }
        }
    }

    fn recv_frame(&mut self, buf: &mut [u8]) -> Option<usize> {
        match (&self.socket).read(buf) {
            Ok(n) => Some(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => None,
            Err(e) => {
                debug!(error = %e, "recv failed");
                None
            }
        }
    }
}

/// Get the OS interface index for a named network interface.
pub fn if_index(name: &str) -> Result<u32> {
    let name_cstr =
        CString::new(name).map_err(|_| Error::InterfaceNotFound(name.to_string()))?;
    let index = unsafe { libc::if_nametoindex(name_cstr.as_ptr()) };
    if index == 0 {
        return Err(Error::InterfaceNotFound(name.to_string()));
    }
    Ok(index)
}

/// `sockaddr_ll` selecting every protocol on interface `index`
fn link_addr(index: u32) -> SockAddr {
    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    // SAFETY: sockaddr_storage is large and aligned enough for any sockaddr
    let ll = unsafe { &mut *(&mut storage as *mut libc::sockaddr_storage as *mut libc::sockaddr_ll) };
    ll.sll_family = libc::AF_PACKET as libc::sa_family_t;
    ll.sll_protocol = ETH_P_ALL.to_be();
    ll.sll_ifindex = index as libc::c_int;

    // SAFETY: storage holds an initialised sockaddr_ll of the given length
    unsafe { SockAddr::new(storage, mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t) }
}
