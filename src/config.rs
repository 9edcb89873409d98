// src/config.rs

// Driver configuration and the values derived from it at construction.

use core::str::FromStr;

use embedded_hal::spi::{Mode, MODE_0};

use crate::errors::ConfigError;
use crate::poll::PollPolicy;

/// Reference crystal on the common CC1101 modules.
pub const CRYSTAL_HZ: u32 = 26_000_000;

/// Clock polarity 0, phase 0.
pub const SPI_MODE: Mode = MODE_0;

/// Highest value the 24-bit FREQ2:FREQ1:FREQ0 word can hold.
pub const MAX_FREQUENCY_WORD: u32 = 0x00FF_FFFF;

/// Two-byte sync word written to SYNC1/SYNC0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncWord(u16);

impl SyncWord {
    pub const fn new(value: u16) -> Self {
        SyncWord(value)
    }

    /// Parses exactly four hex digits, e.g. `"666A"`.
    pub fn from_hex(text: &str) -> Result<Self, ConfigError> {
        if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidSyncWord);
        }
        u16::from_str_radix(text, 16)
            .map(SyncWord)
            .map_err(|_| ConfigError::InvalidSyncWord)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// `[SYNC1, SYNC0]`
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl FromStr for SyncWord {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyncWord::from_hex(s)
    }
}

/// Synthesizer word: `round(f * 2^16 / f_xosc) + offset`, big-endian in
/// FREQ2, FREQ1, FREQ0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyWord(u32);

impl FrequencyWord {
    /// `offset` is in raw synthesizer steps, not Hz. Values that do not fit
    /// in 24 bits are rejected rather than truncated.
    pub fn new(frequency_hz: u32, crystal_hz: u32, offset: i32) -> Result<Self, ConfigError> {
        if crystal_hz == 0 {
            return Err(ConfigError::ZeroCrystal);
        }
        let crystal = u64::from(crystal_hz);
        let base = (u64::from(frequency_hz) * 65_536 + crystal / 2) / crystal;
        let word = base as i64 + i64::from(offset);
        if !(0..=i64::from(MAX_FREQUENCY_WORD)).contains(&word) {
            return Err(ConfigError::FrequencyOutOfRange);
        }
        Ok(FrequencyWord(word as u32))
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// `[FREQ2, FREQ1, FREQ0]`
    pub const fn bytes(self) -> [u8; 3] {
        let [_, high, mid, low] = self.0.to_be_bytes();
        [high, mid, low]
    }

    /// Carrier this word tunes to, truncated to whole Hz.
    pub fn to_hz(self, crystal_hz: u32) -> u32 {
        ((u64::from(self.0) * u64::from(crystal_hz)) >> 16) as u32
    }
}

/// Bounds for every blocking wait in the RX and TX paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    /// GDO0 rising edge after SRX.
    pub sync_word: PollPolicy,
    /// GDO0 falling edge once the sync word was seen.
    pub end_of_packet: PollPolicy,
    /// MARCSTATE reaching IDLE after SIDLE.
    pub idle: PollPolicy,
    /// TXBYTES draining to zero after STX.
    pub tx_drain: PollPolicy,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            sync_word: PollPolicy::new(60_000_000, 50),
            end_of_packet: PollPolicy::new(1_000_000, 50),
            idle: PollPolicy::new(100_000, 100),
            tx_drain: PollPolicy::new(5_000_000, 100_000),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Clock rate the board should configure the bus with. The driver does not
    /// reconfigure the bus itself.
    pub spi_baud_hz: u32,
    pub frequency_hz: u32,
    /// Added to the synthesizer word, in raw steps of `crystal_hz / 2^16`.
    pub frequency_offset: i32,
    pub crystal_hz: u32,
    pub sync_word: SyncWord,
    pub timeouts: Timeouts,
}

impl Config {
    pub fn new(spi_baud_hz: u32, frequency_hz: u32, sync_word: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            spi_baud_hz,
            frequency_hz,
            frequency_offset: 0,
            crystal_hz: CRYSTAL_HZ,
            sync_word: SyncWord::from_hex(sync_word)?,
            timeouts: Timeouts::default(),
        })
    }

    pub fn with_offset(mut self, offset: i32) -> Self {
        self.frequency_offset = offset;
        self
    }

    pub fn with_crystal(mut self, crystal_hz: u32) -> Self {
        self.crystal_hz = crystal_hz;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn frequency_word(&self) -> Result<FrequencyWord, ConfigError> {
        FrequencyWord::new(self.frequency_hz, self.crystal_hz, self.frequency_offset)
    }
}
