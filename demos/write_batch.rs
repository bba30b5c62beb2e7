//! Write three fragments to 0x2000 on the device and wait for the ack.
//!
//! Needs CAP_NET_RAW on Linux. Run with `RUST_LOG=debug` to follow the
//! exchange.

#[cfg(target_os = "linux")]
use std::time::Duration;

#[cfg(target_os = "linux")]
use ualink_eth::{FpgaConfig, FpgaInterface};

#[cfg(target_os = "linux")]
const INTERFACE: &str = "enp36s0";
#[cfg(target_os = "linux")]
const HOST_MAC: &str = "aa:aa:aa:aa:aa:aa";
#[cfg(target_os = "linux")]
const DEVICE_MAC: &str = "aa:aa:ab:aa:aa:aa";

#[cfg(target_os = "linux")]
fn main() -> ualink_eth::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = FpgaConfig::new(HOST_MAC, DEVICE_MAC).with_ack_timeout(Duration::from_millis(500));
    let mut fpga = FpgaInterface::open(INTERFACE, config)?;

    let batch: [[u8; 9]; 3] = [
        [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99],
        [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19],
        [0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29],
    ];
    let outcome = fpga.write(&batch, 0x2000, 0x10)?;

    if outcome.completed {
        tracing::info!(frames = outcome.frames_sent, "write acknowledged");
    } else {
        tracing::warn!(
            frames = outcome.frames_sent,
            failures = outcome.send_failures,
            "write not acknowledged"
        );
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("write_batch needs an AF_PACKET socket and only runs on Linux");
}
