use thiserror::Error;

use crate::packet::LayerKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("invalid IPv4 address: {0}")]
    InvalidIpv4(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("empty payload fragment")]
    EmptyPayload,

    #[error("packet has no {0:?} layer")]
    MissingLayer(LayerKind),
}

pub type Result<T> = std::result::Result<T, Error>;
