#![cfg_attr(not(test), no_std)]
// src/lib.rs

pub mod bits;
pub mod cc1101;
pub mod chip_select;
pub mod commands;
pub mod config;
pub mod errors;
pub mod marc_state;
pub mod poll;
pub mod profiles;
pub mod registers;
pub mod transport;

#[cfg(test)]
mod testing;

pub use bits::BitString;
pub use cc1101::Cc1101;
pub use commands::Strobe;
pub use config::{Config, SyncWord, Timeouts};
pub use errors::{BusError, ConfigError, Error, FrameError, WaitPhase};
pub use marc_state::MarcState;
pub use poll::{Cancel, NeverCancel, PollPolicy};
pub use registers::{Register, StatusRegister};
