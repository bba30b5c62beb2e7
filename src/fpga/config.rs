use std::time::Duration;

use crate::link::ethernet::ETHERTYPE_IPV4;
use crate::ualink::Opcode;

pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Settings of one host/device pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpgaConfig {
    /// Host MAC, colon-separated hex
    pub src_mac: String,
    /// Device MAC, colon-separated hex
    pub dst_mac: String,
    pub ethertype: u16,
    pub ack_timeout: Duration,
    pub read_timeout: Duration,
    /// Upper bound of a single receive wait. Applied to the raw socket by
    /// `FpgaInterface::open`; a link handed to `FpgaInterface::new` keeps its
    /// own receive behavior.
    pub poll_interval: Duration,
    /// Wire value used for acknowledgments, sent and expected
    pub ack_opcode: u8,
    /// Only count replies from the device that carry the expected tag and
    /// opcode. When false any received frame counts.
    pub validate_frames: bool,
}

impl FpgaConfig {
    pub fn new(src_mac: impl Into<String>, dst_mac: impl Into<String>) -> Self {
        FpgaConfig {
            src_mac: src_mac.into(),
            dst_mac: dst_mac.into(),
            ..Default::default()
        }
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn with_ack_opcode(mut self, opcode: u8) -> Self {
        self.ack_opcode = opcode;
        self
    }

    pub fn with_frame_validation(mut self, validate: bool) -> Self {
        self.validate_frames = validate;
        self
    }
}

impl Default for FpgaConfig {
    fn default() -> Self {
        FpgaConfig {
            src_mac: "00:00:00:00:00:00".to_string(),
            dst_mac: "00:00:00:00:00:00".to_string(),
            ethertype: ETHERTYPE_IPV4,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ack_opcode: Opcode::Ack.into(),
            validate_frames: true,
        }
    }
}
