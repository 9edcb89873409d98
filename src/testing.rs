// src/testing.rs

// Expectation builder for the embedded-hal mocks: one call per wire-level
// transaction, producing the matching SPI and CS sequences side by side.

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

use crate::commands::Strobe;
use crate::config::{Config, FrequencyWord};
use crate::profiles::{Profile, PA_TABLE};
use crate::registers::*;

/// Status byte the mocked chip clocks back on every transfer.
pub const STATUS: u8 = 0x0F;

pub fn burst_read_headers(addr: u8, length: usize) -> Vec<u8> {
    (0..=length)
        .map(|i| addr.wrapping_add((i as u8).wrapping_mul(8)) | READ_BURST)
        .collect()
}

#[derive(Default)]
pub struct Expect {
    spi: Vec<SpiTransaction<u8>>,
    cs: Vec<PinTransaction>,
    gdo0: Vec<PinTransaction>,
}

impl Expect {
    pub fn new() -> Self {
        Self::default()
    }

    fn selected(&mut self, transfer: SpiTransaction<u8>) -> &mut Self {
        self.cs.push(PinTransaction::set(State::Low));
        self.spi.push(transfer);
        self.spi.push(SpiTransaction::flush());
        self.cs.push(PinTransaction::set(State::High));
        self
    }

    pub fn write(&mut self, addr: u8, value: u8) -> &mut Self {
        self.selected(SpiTransaction::write_vec(vec![addr | WRITE_SINGLE_BYTE, value]))
    }

    pub fn read(&mut self, addr: u8, value: u8) -> &mut Self {
        self.selected(SpiTransaction::transfer_in_place(
            vec![addr | READ_SINGLE_BYTE, 0x00],
            vec![STATUS, value],
        ))
    }

    pub fn burst_write(&mut self, addr: u8, data: &[u8]) -> &mut Self {
        let mut bytes = vec![addr | WRITE_BURST];
        bytes.extend_from_slice(data);
        self.selected(SpiTransaction::write_vec(bytes))
    }

    /// `response` includes the leading status byte.
    pub fn burst_read(&mut self, addr: u8, response: &[u8]) -> &mut Self {
        let headers = burst_read_headers(addr, response.len() - 1);
        self.selected(SpiTransaction::transfer_in_place(headers, response.to_vec()))
    }

    pub fn strobe_with_status(&mut self, addr: u8, status: [u8; 2]) -> &mut Self {
        self.selected(SpiTransaction::transfer_in_place(
            vec![addr, 0x00],
            status.to_vec(),
        ))
    }

    pub fn strobe(&mut self, strobe: Strobe) -> &mut Self {
        self.strobe_with_status(strobe.addr(), [STATUS, STATUS])
    }

    pub fn gdo0(&mut self, high: bool) -> &mut Self {
        let state = if high { State::High } else { State::Low };
        self.gdo0.push(PinTransaction::get(state));
        self
    }

    pub fn profile(&mut self, profile: &Profile) -> &mut Self {
        for &(reg, value) in profile.settings() {
            self.write(reg.addr(), value);
        }
        self
    }

    /// Traffic issued by `Cc1101::new`.
    pub fn construction(&mut self, config: &Config) -> &mut Self {
        let word = FrequencyWord::new(config.frequency_hz, config.crystal_hz, config.frequency_offset)
            .expect("test config has a valid frequency");
        let [freq2, freq1, freq0] = word.bytes();
        let [sync1, sync0] = config.sync_word.to_be_bytes();
        self.strobe(Strobe::Sres)
            .write(Register::Freq2.addr(), freq2)
            .write(Register::Freq1.addr(), freq1)
            .write(Register::Freq0.addr(), freq0)
            .write(Register::Sync1.addr(), sync1)
            .write(Register::Sync0.addr(), sync0)
            .burst_write(Register::Patable.addr(), &PA_TABLE)
            .strobe(Strobe::Sftx)
            .strobe(Strobe::Sfrx)
    }

    pub fn spi_mock(&self) -> SpiMock<u8> {
        SpiMock::new(&self.spi)
    }

    pub fn gdo0_mock(&self) -> PinMock {
        PinMock::new(&self.gdo0)
    }

    pub fn bus_mocks(&self) -> (SpiMock<u8>, PinMock) {
        (self.spi_mock(), PinMock::new(&self.cs))
    }

    pub fn mocks(&self) -> (SpiMock<u8>, PinMock, PinMock) {
        let (spi, cs) = self.bus_mocks();
        (spi, cs, self.gdo0_mock())
    }
}
