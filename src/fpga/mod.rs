//! Remote memory access over UALink
//!
//! - `config`: addressing, timeouts and reply filtering
//! - `interface`: batched read/write transactions with deadline-bounded waits

pub mod config;
pub mod interface;

pub use config::FpgaConfig;
pub use interface::{BatchOutcome, FpgaInterface, State};
