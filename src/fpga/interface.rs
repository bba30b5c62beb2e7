//! Read and write transactions against a remote device
//!
//! A transaction is one batch of fragments: every fragment is sent as its
//! own UALink frame, then the interface waits for either one acknowledgment
//! (writes) or one response per fragment (reads), bounded by a deadline.
//! There is no retransmission; a timed out batch is reported to the caller.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::fpga::config::FpgaConfig;
use crate::iface::RawLink;
use crate::link::{parse_mac, EthernetHeader, MacAddr, ETHERNET_HEADER_LEN};
use crate::packet::Packet;
use crate::ualink::{Fragment, Opcode, UaLinkHeader, FRAME_HEADER_LEN, MAX_PAYLOAD_LEN};

/// Large enough for any standard Ethernet frame
const RECV_BUF_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Sending,
    WaitAck,
    WaitRead,
    Completed,
    TimedOut,
}

/// Result of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// The awaited acknowledgment or all responses arrived in time
    pub completed: bool,
    /// Read responses in arrival order, possibly partial
    pub responses: Vec<Fragment>,
    pub frames_sent: usize,
    /// Frames the link did not accept. The rest of the batch is still sent.
    pub send_failures: usize,
}

pub struct FpgaInterface<L> {
    link: L,
    config: FpgaConfig,
    src_mac: MacAddr,
    dst_mac: MacAddr,
    state: State,
}

#[cfg(target_os = "linux")]
impl FpgaInterface<crate::iface::RawSocket> {
    /// Bind a raw socket on `interface` and talk to the device described by
    /// `config`
    pub fn open(interface: &str, config: FpgaConfig) -> Result<Self> {
        let socket = crate::iface::RawSocket::open(interface, config.poll_interval)?;
        Self::new(socket, config)
    }
}

impl<L: RawLink> FpgaInterface<L> {
    pub fn new(link: L, config: FpgaConfig) -> Result<Self> {
        let src_mac = parse_mac(&config.src_mac)?;
        let dst_mac = parse_mac(&config.dst_mac)?;

        Ok(FpgaInterface {
            link,
            config,
            src_mac,
            dst_mac,
            state: State::Idle,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &FpgaConfig {
        &self.config
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Send `fragments` as one batch and wait for the device.
    ///
    /// All frames share `address`, `opcode` and `tag`. A write waits for one
    /// acknowledgment, a read for one response per fragment. Any other
    /// opcode sends the frames and reports failure without waiting.
    ///
    /// Fails only for fragments that are empty or longer than
    /// [`MAX_PAYLOAD_LEN`], before anything is sent.
    pub fn send_batch_wait_ack<F: AsRef<[u8]>>(
        &mut self,
        fragments: &[F],
        address: u64,
        opcode: Opcode,
        tag: u8,
    ) -> Result<BatchOutcome> {
        for fragment in fragments {
            check_fragment(fragment.as_ref())?;
        }

        self.state = State::Sending;
        debug!(
            tag,
            address = %format!("{address:#x}"),
            ?opcode,
            fragments = fragments.len(),
            "sending batch"
        );

        let wire_opcode = self.wire_opcode(opcode);
        let mut frames_sent = 0;
        let mut send_failures = 0;
        for (index, fragment) in fragments.iter().enumerate() {
            let frame = self.build_frame(address, fragment.as_ref(), wire_opcode, tag)?;
            if self.link.send_frame(&frame) {
                frames_sent += 1;
            } else {
                send_failures += 1;
                warn!(tag, index, "frame not accepted by link, continuing batch");
            }
        }

        let (completed, responses) = match opcode {
            Opcode::Write => (self.wait_ack(self.config.ack_timeout, tag), Vec::new()),
            Opcode::Read => self.wait_read(self.config.read_timeout, fragments.len(), tag),
            Opcode::Ack => {
                self.state = State::Completed;
                (false, Vec::new())
            }
        };

        Ok(BatchOutcome {
            completed,
            responses,
            frames_sent,
            send_failures,
        })
    }

    /// Write `fragments` at `address` and wait for the acknowledgment
    pub fn write<F: AsRef<[u8]>>(
        &mut self,
        fragments: &[F],
        address: u64,
        tag: u8,
    ) -> Result<BatchOutcome> {
        self.send_batch_wait_ack(fragments, address, Opcode::Write, tag)
    }

    /// Request `count` reads of `len` bytes at `address` and collect the
    /// responses
    pub fn read(&mut self, address: u64, len: usize, count: usize, tag: u8) -> Result<BatchOutcome> {
        let requests = vec![vec![0u8; len]; count];
        self.send_batch_wait_ack(&requests, address, Opcode::Read, tag)
    }

    /// Poll until an acknowledgment for `tag` arrives or `timeout` elapses
    pub fn wait_ack(&mut self, timeout: Duration, tag: u8) -> bool {
        self.state = State::WaitAck;
        let ack_opcode = self.config.ack_opcode;
        let start = Instant::now();
        let mut buf = [0u8; RECV_BUF_LEN];

        while start.elapsed() < timeout {
            let Some(n) = self.link.recv_frame(&mut buf) else {
                continue;
            };
            if self.accepts(&buf[..n], ack_opcode, tag) {
                self.state = State::Completed;
                debug!(tag, elapsed = ?start.elapsed(), "ack received");
                return true;
            }
        }

        self.state = State::TimedOut;
        debug!(tag, ?timeout, "timed out waiting for ack");
        false
    }

    /// Poll until `expected` responses for `tag` arrived or `timeout`
    /// elapses. On timeout the responses collected so far are returned.
    pub fn wait_read(&mut self, timeout: Duration, expected: usize, tag: u8) -> (bool, Vec<Fragment>) {
        self.state = State::WaitRead;
        let read_opcode = u8::from(Opcode::Read);
        let start = Instant::now();
        let mut buf = [0u8; RECV_BUF_LEN];
        let mut responses = Vec::with_capacity(expected);

        while responses.len() < expected && start.elapsed() < timeout {
            let Some(n) = self.link.recv_frame(&mut buf) else {
                continue;
            };
            if self.accepts(&buf[..n], read_opcode, tag) {
                responses.push(to_fragment(&buf[..n]));
                trace!(tag, received = responses.len(), expected, "read response");
            }
        }

        if responses.len() >= expected {
            self.state = State::Completed;
            debug!(tag, expected, elapsed = ?start.elapsed(), "read complete");
            (true, responses)
        } else {
            self.state = State::TimedOut;
            debug!(tag, received = responses.len(), expected, "timed out waiting for read responses");
            (false, responses)
        }
    }

    /// Acknowledge a request from the other side. No wait phase.
    ///
    /// The frame describes a one-byte access at `address`. Returns whether
    /// the link accepted the frame.
    pub fn send_ack(&mut self, address: u64, tag: u8) -> Result<bool> {
        let frame = self.build_frame(address, &[0u8], self.config.ack_opcode, tag)?;
        let sent = self.link.send_frame(&frame);
        if !sent {
            warn!(tag, "ack not accepted by link");
        }
        Ok(sent)
    }

    /// Opcode byte for the wire. Acknowledgments use the configured value.
    fn wire_opcode(&self, opcode: Opcode) -> u8 {
        match opcode {
            Opcode::Ack => self.config.ack_opcode,
            other => other.into(),
        }
    }

    fn build_frame(&self, address: u64, payload: &[u8], opcode: u8, tag: u8) -> Result<Vec<u8>> {
        let eth = EthernetHeader::new(self.src_mac, self.dst_mac, self.config.ethertype);
        let mut ualink = UaLinkHeader::default();
        ualink.set_attributes(address, payload.len(), opcode, tag);

        Packet::new().with(eth).with(ualink).serialize_ualink(payload)
    }

    /// Whether a received frame is the reply being waited for
    fn accepts(&self, frame: &[u8], opcode: u8, tag: u8) -> bool {
        if !self.config.validate_frames {
            return true;
        }

        let (Some(eth), Some(ualink)) = (
            EthernetHeader::from_bytes(frame),
            frame
                .get(ETHERNET_HEADER_LEN..)
                .and_then(UaLinkHeader::from_bytes),
        ) else {
            trace!(bytes = frame.len(), "ignoring runt frame");
            return false;
        };

        let matches = eth.ethertype == self.config.ethertype
            && eth.src == self.dst_mac
            && ualink.opcode == opcode
            && ualink.tag == tag;
        if !matches {
            trace!(
                ethertype = eth.ethertype,
                opcode = ualink.opcode,
                tag = ualink.tag,
                "ignoring unrelated frame"
            );
        }
        matches
    }
}

fn check_fragment(fragment: &[u8]) -> Result<()> {
    if fragment.is_empty() {
        return Err(Error::EmptyPayload);
    }
    if fragment.len() > MAX_PAYLOAD_LEN {
        return Err(Error::PayloadTooLarge {
            len: fragment.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(())
}

/// Payload of a received frame, truncated or zero padded
fn to_fragment(frame: &[u8]) -> Fragment {
    let mut fragment = [0u8; MAX_PAYLOAD_LEN];
    let payload = frame.get(FRAME_HEADER_LEN..).unwrap_or(&[]);
    let n = payload.len().min(MAX_PAYLOAD_LEN);
    fragment[..n].copy_from_slice(&payload[..n]);
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iface::link::MockRawLink;
    use std::sync::{Arc, Mutex};

    const HOST: &str = "aa:aa:aa:aa:aa:aa";
    const DEVICE: &str = "aa:aa:ab:aa:aa:aa";
    const TIMEOUT: Duration = Duration::from_millis(50);

    fn config() -> FpgaConfig {
        FpgaConfig::new(HOST, DEVICE)
            .with_ack_timeout(TIMEOUT)
            .with_read_timeout(TIMEOUT)
    }

    /// A frame as the device would send it back
    fn reply(opcode: u8, tag: u8, payload: &[u8]) -> Vec<u8> {
        let eth = EthernetHeader::new(
            parse_mac(DEVICE).unwrap(),
            parse_mac(HOST).unwrap(),
            0x0800,
        );
        let mut ualink = UaLinkHeader::default();
        ualink.set_attributes(0x2000, payload.len().max(1), opcode, tag);
        let mut frame = Packet::new().with(eth).with(ualink).serialize_ualink(&[]).unwrap();
        frame.extend_from_slice(payload);
        frame
    }

    /// Receive side that hands out `frames` in order, then nothing
    fn deliver(link: &mut MockRawLink, frames: Vec<Vec<u8>>) {
        let mut pending = frames.into_iter();
        link.expect_recv_frame().returning(move |buf: &mut [u8]| {
            let frame = pending.next()?;
            let n = frame.len().min(buf.len());
            buf[..n].copy_from_slice(&frame[..n]);
            Some(n)
        });
    }

    fn fragments() -> Vec<Vec<u8>> {
        vec![
            vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99],
            vec![0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19],
            vec![0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29],
        ]
    }

    #[test]
    fn test_batch_write_acknowledged() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut link = MockRawLink::new();
        let recorded = sent.clone();
        link.expect_send_frame().times(3).returning(move |frame: &[u8]| {
            recorded.lock().unwrap().push(frame.to_vec());
            true
        });
        deliver(&mut link, vec![reply(3, 0x10, &[0])]);

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let outcome = fpga
            .send_batch_wait_ack(&fragments(), 0x2000, Opcode::Write, 0x10)
            .unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.frames_sent, 3);
        assert_eq!(outcome.send_failures, 0);
        assert!(outcome.responses.is_empty());
        assert_eq!(fpga.state(), State::Completed);

        let sent = sent.lock().unwrap();
        for (frame, fragment) in sent.iter().zip(fragments()) {
            assert_eq!(frame.len(), 30 + fragment.len());
            assert_eq!(&frame[0..6], &parse_mac(DEVICE).unwrap());
            assert_eq!(&frame[6..12], &parse_mac(HOST).unwrap());
            assert_eq!(frame[15], 2);
            assert_eq!(frame[16], 0x10);
            assert_eq!(&frame[18..20], &[0xFF, 0x01]);
            assert_eq!(&frame[20..28], &0x2000u64.to_le_bytes());
            assert_eq!(&frame[30..], fragment.as_slice());
        }
    }

    #[test]
    fn test_batch_write_times_out() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().times(3).returning(|_| true);
        link.expect_recv_frame().returning(|_| None);

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let start = Instant::now();
        let outcome = fpga
            .send_batch_wait_ack(&fragments(), 0x2000, Opcode::Write, 0x10)
            .unwrap();

        assert!(!outcome.completed);
        assert!(start.elapsed() >= TIMEOUT);
        assert_eq!(fpga.state(), State::TimedOut);
    }

    #[test]
    fn test_batch_read_partial() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().times(2).returning(|_| true);
        deliver(&mut link, vec![reply(1, 0x22, &[0xDE, 0xAD, 0xBE, 0xEF])]);

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let outcome = fpga.read(0x2000, 8, 2, 0x22).unwrap();

        assert!(!outcome.completed);
        assert_eq!(outcome.responses.len(), 1);
        assert_eq!(&outcome.responses[0][..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(outcome.responses[0][4..].iter().all(|&b| b == 0));
        assert_eq!(fpga.state(), State::TimedOut);
    }

    #[test]
    fn test_batch_read_complete() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().times(2).returning(|_| true);
        deliver(
            &mut link,
            vec![reply(1, 5, &[1; 8]), reply(1, 5, &[2; 300])],
        );

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let outcome = fpga.read(0x3000, 8, 2, 5).unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.responses.len(), 2);
        assert_eq!(outcome.responses[1], [2u8; MAX_PAYLOAD_LEN]);
    }

    #[test]
    fn test_read_frames_carry_no_payload() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut link = MockRawLink::new();
        let recorded = sent.clone();
        link.expect_send_frame().returning(move |frame: &[u8]| {
            recorded.lock().unwrap().push(frame.to_vec());
            true
        });
        link.expect_recv_frame().returning(|_| None);

        let mut fpga = FpgaInterface::new(link, config().with_read_timeout(Duration::ZERO)).unwrap();
        fpga.read(0x2003, 2, 1, 9).unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 30);
        assert_eq!(sent[0][15], 1);
        assert_eq!(&sent[0][18..20], &[0x18, 0x00]);
    }

    #[test]
    fn test_unrelated_frames_are_ignored() {
        let mut other_source = reply(3, 0x10, &[0]);
        other_source[6] = 0x02;

        let mut link = MockRawLink::new();
        link.expect_send_frame().returning(|_| true);
        deliver(
            &mut link,
            vec![
                reply(3, 0x11, &[0]), // wrong tag
                reply(2, 0x10, &[0]), // wrong opcode
                other_source,
                vec![0xFF; 12], // runt
            ],
        );

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let outcome = fpga.write(&[[1u8, 2, 3]], 0x2000, 0x10).unwrap();
        assert!(!outcome.completed);
    }

    #[test]
    fn test_accept_any_frame_without_validation() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().returning(|_| true);
        deliver(&mut link, vec![vec![0xFF; 12]]);

        let mut fpga =
            FpgaInterface::new(link, config().with_frame_validation(false)).unwrap();
        let outcome = fpga.write(&[[1u8, 2, 3]], 0x2000, 0x10).unwrap();
        assert!(outcome.completed);
    }

    #[test]
    fn test_configured_ack_opcode() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().returning(|_| true);
        deliver(&mut link, vec![reply(3, 1, &[0]), reply(0x83, 1, &[0])]);

        let mut fpga = FpgaInterface::new(link, config().with_ack_opcode(0x83)).unwrap();
        let outcome = fpga.write(&[[7u8]], 0x10, 1).unwrap();
        assert!(outcome.completed);
    }

    #[test]
    fn test_ack_batch_uses_configured_ack_opcode() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut link = MockRawLink::new();
        let recorded = sent.clone();
        link.expect_send_frame().times(2).returning(move |frame: &[u8]| {
            recorded.lock().unwrap().push(frame.to_vec());
            true
        });

        let mut fpga = FpgaInterface::new(link, config().with_ack_opcode(0x83)).unwrap();
        fpga.send_batch_wait_ack(&[[0u8]], 0x2000, Opcode::Ack, 4).unwrap();
        fpga.send_ack(0x2000, 4).unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0][15], 0x83);
        assert_eq!(sent[1][15], 0x83);
    }

    #[test]
    fn test_send_failure_does_not_abort_batch() {
        let mut link = MockRawLink::new();
        let mut calls = 0;
        link.expect_send_frame().times(3).returning(move |_| {
            calls += 1;
            calls != 2
        });
        deliver(&mut link, vec![reply(3, 0x10, &[0])]);

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let outcome = fpga
            .send_batch_wait_ack(&fragments(), 0x2000, Opcode::Write, 0x10)
            .unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.frames_sent, 2);
        assert_eq!(outcome.send_failures, 1);
    }

    #[test]
    fn test_ack_opcode_batch_fails_without_waiting() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().times(1).returning(|_| true);
        link.expect_recv_frame().never();

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let outcome = fpga
            .send_batch_wait_ack(&[[0u8]], 0x2000, Opcode::Ack, 3)
            .unwrap();
        assert!(!outcome.completed);
        assert_eq!(fpga.state(), State::Completed);
    }

    #[test]
    fn test_invalid_fragments_send_nothing() {
        let mut link = MockRawLink::new();
        link.expect_send_frame().never();

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        let too_large = vec![vec![1u8; 4], vec![0u8; MAX_PAYLOAD_LEN + 1]];
        assert!(matches!(
            fpga.send_batch_wait_ack(&too_large, 0x2000, Opcode::Write, 1),
            Err(Error::PayloadTooLarge { len: 227, max: 226 })
        ));
        let empty: Vec<Vec<u8>> = vec![Vec::new()];
        assert!(matches!(
            fpga.write(&empty, 0x2000, 1),
            Err(Error::EmptyPayload)
        ));
        assert_eq!(fpga.state(), State::Idle);
    }

    #[test]
    fn test_send_ack_frame() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut link = MockRawLink::new();
        let recorded = sent.clone();
        link.expect_send_frame().times(1).returning(move |frame: &[u8]| {
            recorded.lock().unwrap().push(frame.to_vec());
            true
        });

        let mut fpga = FpgaInterface::new(link, config()).unwrap();
        assert!(fpga.send_ack(0x2005, 0x42).unwrap());

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].len(), 30);
        assert_eq!(sent[0][15], 3);
        assert_eq!(sent[0][16], 0x42);
        assert_eq!(&sent[0][18..20], &[0x20, 0x00]);
    }

    #[test]
    fn test_rejects_bad_mac_config() {
        let link = MockRawLink::new();
        assert!(matches!(
            FpgaInterface::new(link, FpgaConfig::new("aa:bb", DEVICE)),
            Err(Error::InvalidMac(_))
        ));
    }
}
