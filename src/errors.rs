// src/errors.rs

use core::fmt::{self, Debug, Formatter};
use ufmt::{uDebug, uWrite};

/// Rejected driver configuration. Raised before any bus traffic.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Sync word is not exactly four hex digits.
    InvalidSyncWord,
    /// Frequency word (plus offset) does not fit in 24 bits.
    FrequencyOutOfRange,
    ZeroCrystal,
}

/// Rejected bit string or packet length.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Something other than '0' or '1' in a bit string.
    NotBinary,
    /// Bit string length is not a multiple of 8.
    Misaligned { bits: usize },
    /// Payload leaves no room for the sync word in a 512-bit frame.
    PayloadTooLong { bits: usize },
    /// Packet length outside 1..=64 bytes.
    InvalidLength { bytes: usize },
}

/// Which polling loop gave up.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    /// GDO0 rising edge: sync word detected.
    SyncWord,
    /// GDO0 falling edge: packet fully received.
    EndOfPacket,
    /// MARCSTATE settling to IDLE after SIDLE.
    Idle,
    /// TXBYTES draining to zero.
    TxDrain,
}

/// Failure of a single SPI transaction.
pub enum BusError<SPIE, CSE> {
    Spi(SPIE),
    ChipSelect(CSE),
    /// Burst longer than one FIFO.
    Frame(FrameError),
}

pub enum Error<SPIE, CSE, GDOE> {
    /// SPI bus failure. Register state is not trusted afterwards.
    Spi(SPIE),
    ChipSelect(CSE),
    Gdo0(GDOE),
    Config(ConfigError),
    Frame(FrameError),
    Timeout(WaitPhase),
    Cancelled(WaitPhase),
    /// Bytes still pending in TXFIFO after the drain and flush.
    TxUnderflow { remaining: u8 },
}

impl<SPIE, CSE, GDOE> Error<SPIE, CSE, GDOE> {
    /// Timeouts and cancellations leave the radio mid-operation.
    pub fn is_aborted_wait(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Cancelled(_))
    }
}

impl<SPIE, CSE> From<FrameError> for BusError<SPIE, CSE> {
    fn from(err: FrameError) -> Self {
        BusError::Frame(err)
    }
}

impl<SPIE, CSE, GDOE> From<BusError<SPIE, CSE>> for Error<SPIE, CSE, GDOE> {
    fn from(err: BusError<SPIE, CSE>) -> Self {
        match err {
            BusError::Spi(err) => Error::Spi(err),
            BusError::ChipSelect(err) => Error::ChipSelect(err),
            BusError::Frame(err) => Error::Frame(err),
        }
    }
}

impl<SPIE, CSE, GDOE> From<ConfigError> for Error<SPIE, CSE, GDOE> {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl<SPIE, CSE, GDOE> From<FrameError> for Error<SPIE, CSE, GDOE> {
    fn from(err: FrameError) -> Self {
        Error::Frame(err)
    }
}

impl<SPIE: PartialEq, CSE: PartialEq> PartialEq for BusError<SPIE, CSE> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BusError::Spi(a), BusError::Spi(b)) => a == b,
            (BusError::ChipSelect(a), BusError::ChipSelect(b)) => a == b,
            (BusError::Frame(a), BusError::Frame(b)) => a == b,
            _ => false,
        }
    }
}

impl<SPIE: PartialEq, CSE: PartialEq, GDOE: PartialEq> PartialEq for Error<SPIE, CSE, GDOE> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Spi(a), Error::Spi(b)) => a == b,
            (Error::ChipSelect(a), Error::ChipSelect(b)) => a == b,
            (Error::Gdo0(a), Error::Gdo0(b)) => a == b,
            (Error::Config(a), Error::Config(b)) => a == b,
            (Error::Frame(a), Error::Frame(b)) => a == b,
            (Error::Timeout(a), Error::Timeout(b)) => a == b,
            (Error::Cancelled(a), Error::Cancelled(b)) => a == b,
            (Error::TxUnderflow { remaining: a }, Error::TxUnderflow { remaining: b }) => a == b,
            _ => false,
        }
    }
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSyncWord => write!(f, "InvalidSyncWord"),
            ConfigError::FrequencyOutOfRange => write!(f, "FrequencyOutOfRange"),
            ConfigError::ZeroCrystal => write!(f, "ZeroCrystal"),
        }
    }
}

impl Debug for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::NotBinary => write!(f, "NotBinary"),
            FrameError::Misaligned { bits } => write!(f, "Misaligned({} bits)", bits),
            FrameError::PayloadTooLong { bits } => write!(f, "PayloadTooLong({} bits)", bits),
            FrameError::InvalidLength { bytes } => write!(f, "InvalidLength({} bytes)", bytes),
        }
    }
}

impl Debug for WaitPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WaitPhase::SyncWord => write!(f, "SyncWord"),
            WaitPhase::EndOfPacket => write!(f, "EndOfPacket"),
            WaitPhase::Idle => write!(f, "Idle"),
            WaitPhase::TxDrain => write!(f, "TxDrain"),
        }
    }
}

impl<SPIE: Debug, CSE: Debug> Debug for BusError<SPIE, CSE> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Spi(err) => write!(f, "Spi({err:?})"),
            BusError::ChipSelect(err) => write!(f, "ChipSelect({err:?})"),
            BusError::Frame(err) => write!(f, "Frame({err:?})"),
        }
    }
}

impl<SPIE: Debug, CSE: Debug, GDOE: Debug> Debug for Error<SPIE, CSE, GDOE> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(err) => write!(f, "Spi({err:?})"),
            Error::ChipSelect(err) => write!(f, "ChipSelect({err:?})"),
            Error::Gdo0(err) => write!(f, "Gdo0({err:?})"),
            Error::Config(err) => write!(f, "Config({err:?})"),
            Error::Frame(err) => write!(f, "Frame({err:?})"),
            Error::Timeout(phase) => write!(f, "Timeout({phase:?})"),
            Error::Cancelled(phase) => write!(f, "Cancelled({phase:?})"),
            Error::TxUnderflow { remaining } => write!(f, "TxUnderflow({remaining} bytes)"),
        }
    }
}

// ufmt cannot print the HAL error payloads, so those collapse to their variant name
impl uDebug for ConfigError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            ConfigError::InvalidSyncWord => f.write_str("InvalidSyncWord"),
            ConfigError::FrequencyOutOfRange => f.write_str("FrequencyOutOfRange"),
            ConfigError::ZeroCrystal => f.write_str("ZeroCrystal"),
        }
    }
}

impl uDebug for FrameError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            FrameError::NotBinary => f.write_str("NotBinary"),
            FrameError::Misaligned { bits } => ufmt::uwrite!(f, "Misaligned({} bits)", *bits),
            FrameError::PayloadTooLong { bits } => {
                ufmt::uwrite!(f, "PayloadTooLong({} bits)", *bits)
            }
            FrameError::InvalidLength { bytes } => {
                ufmt::uwrite!(f, "InvalidLength({} bytes)", *bytes)
            }
        }
    }
}

impl uDebug for WaitPhase {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            WaitPhase::SyncWord => f.write_str("SyncWord"),
            WaitPhase::EndOfPacket => f.write_str("EndOfPacket"),
            WaitPhase::Idle => f.write_str("Idle"),
            WaitPhase::TxDrain => f.write_str("TxDrain"),
        }
    }
}

impl<SPIE, CSE> uDebug for BusError<SPIE, CSE> {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            BusError::Spi(_) => f.write_str("Spi"),
            BusError::ChipSelect(_) => f.write_str("ChipSelect"),
            BusError::Frame(err) => ufmt::uwrite!(f, "Frame({:?})", err),
        }
    }
}

impl<SPIE, CSE, GDOE> uDebug for Error<SPIE, CSE, GDOE> {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Error::Spi(_) => f.write_str("Spi"),
            Error::ChipSelect(_) => f.write_str("ChipSelect"),
            Error::Gdo0(_) => f.write_str("Gdo0"),
            Error::Config(err) => ufmt::uwrite!(f, "Config({:?})", err),
            Error::Frame(err) => ufmt::uwrite!(f, "Frame({:?})", err),
            Error::Timeout(phase) => ufmt::uwrite!(f, "Timeout({:?})", phase),
            Error::Cancelled(phase) => ufmt::uwrite!(f, "Cancelled({:?})", phase),
            Error::TxUnderflow { remaining } => {
                ufmt::uwrite!(f, "TxUnderflow({} bytes)", *remaining)
            }
        }
    }
}
