// src/marc_state.rs

use core::fmt::{Debug, Formatter, Result};
use ufmt::{uDebug, uWrite};

use crate::registers::MARCSTATE_MASK;

/// Main radio control state machine state, as reported by MARCSTATE.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MarcState {
    Sleep,
    Idle,
    Xoff,
    Calibrating,
    Settling,
    Rx,
    RxEnd,
    RxRst,
    TxRxSwitch,
    RxFifoOverflow,
    FsTxOn,
    Tx,
    TxEnd,
    RxTxSwitch,
    TxFifoUnderflow,
    Unknown(u8),
}

impl MarcState {
    /// Decodes a raw MARCSTATE read; the top three bits are ignored.
    pub fn from_raw(raw: u8) -> Self {
        match raw & MARCSTATE_MASK {
            0x00 => MarcState::Sleep,
            0x01 => MarcState::Idle,
            0x02 => MarcState::Xoff,
            0x03..=0x05 | 0x08 | 0x0C => MarcState::Calibrating,
            0x06 | 0x07 | 0x09..=0x0B => MarcState::Settling,
            0x0D => MarcState::Rx,
            0x0E => MarcState::RxEnd,
            0x0F => MarcState::RxRst,
            0x10 => MarcState::TxRxSwitch,
            0x11 => MarcState::RxFifoOverflow,
            0x12 => MarcState::FsTxOn,
            0x13 => MarcState::Tx,
            0x14 => MarcState::TxEnd,
            0x15 => MarcState::RxTxSwitch,
            0x16 => MarcState::TxFifoUnderflow,
            other => MarcState::Unknown(other),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MarcState::Sleep => "Sleep",
            MarcState::Idle => "Idle",
            MarcState::Xoff => "Xoff",
            MarcState::Calibrating => "Calibrating",
            MarcState::Settling => "Settling",
            MarcState::Rx => "Rx",
            MarcState::RxEnd => "RxEnd",
            MarcState::RxRst => "RxRst",
            MarcState::TxRxSwitch => "TxRxSwitch",
            MarcState::RxFifoOverflow => "RxFifoOverflow",
            MarcState::FsTxOn => "FsTxOn",
            MarcState::Tx => "Tx",
            MarcState::TxEnd => "TxEnd",
            MarcState::RxTxSwitch => "RxTxSwitch",
            MarcState::TxFifoUnderflow => "TxFifoUnderflow",
            MarcState::Unknown(_) => "Unknown",
        }
    }
}

impl Debug for MarcState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            MarcState::Unknown(raw) => write!(f, "Unknown(0x{:02X})", raw),
            other => f.write_str(other.name()),
        }
    }
}

impl uDebug for MarcState {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}
