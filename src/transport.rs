// src/transport.rs

// Wire-level access patterns of the CC1101 SPI interface. Every call is one
// CS-bracketed transaction and CS is released on every exit path, including
// a failed transfer, before the error is handed back.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use heapless::Vec;

use crate::chip_select::ChipSelect;
use crate::errors::{BusError, FrameError};
use crate::registers::*;

/// Raw bytes clocked back from a burst read, status byte first.
pub type BurstRead = Vec<u8, { FIFO_SIZE + 1 }>;

pub type TransportError<SPI, CS> = BusError<
    <SPI as embedded_hal::spi::ErrorType>::Error,
    <CS as embedded_hal::digital::ErrorType>::Error,
>;

pub struct Transport<SPI, CS> {
    spi: SPI,
    cs: ChipSelect<CS>,
}

impl<SPI, CS> Transport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Transport {
            spi,
            cs: ChipSelect::new(cs),
        }
    }

    pub fn into_parts(self) -> (SPI, CS) {
        (self.spi, self.cs.into_inner())
    }

    fn transaction<R>(
        &mut self,
        op: impl FnOnce(&mut SPI) -> Result<R, SPI::Error>,
    ) -> Result<R, TransportError<SPI, CS>> {
        self.cs.assert().map_err(BusError::ChipSelect)?;
        let result = op(&mut self.spi).and_then(|value| self.spi.flush().map(|()| value));
        let released = self.cs.release().map_err(BusError::ChipSelect);
        let value = result.map_err(BusError::Spi)?;
        released?;
        Ok(value)
    }

    /// `{addr | 0x00, value}`
    pub fn write_single_byte(&mut self, addr: u8, value: u8) -> Result<(), TransportError<SPI, CS>> {
        log::trace!("write 0x{:02X} <- 0x{:02X}", addr, value);
        self.transaction(|spi| spi.write(&[addr | WRITE_SINGLE_BYTE, value]))
    }

    /// `{addr | 0x80, 0x00}`; the first byte back is the chip status and is dropped.
    pub fn read_single_byte(&mut self, addr: u8) -> Result<u8, TransportError<SPI, CS>> {
        let mut buf = [addr | READ_SINGLE_BYTE, 0x00];
        self.transaction(|spi| spi.transfer_in_place(&mut buf))?;
        log::trace!("read 0x{:02X} -> 0x{:02X}", addr, buf[1]);
        Ok(buf[1])
    }

    /// Header `addr | 0x40` followed by the payload, in one transfer.
    pub fn write_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), TransportError<SPI, CS>> {
        let too_long = FrameError::InvalidLength { bytes: data.len() };
        let mut buf: Vec<u8, { FIFO_SIZE + 1 }> = Vec::new();
        buf.push(addr | WRITE_BURST).map_err(|_| too_long)?;
        buf.extend_from_slice(data).map_err(|_| too_long)?;
        log::trace!("burst write 0x{:02X}, {} bytes", addr, data.len());
        self.transaction(|spi| spi.write(&buf))
    }

    /// Sends `length + 1` header bytes, the i-th being `(addr + 8 * i) | 0xC0`,
    /// and returns everything clocked back. Byte 0 is the chip status.
    pub fn read_burst(&mut self, addr: u8, length: usize) -> Result<BurstRead, TransportError<SPI, CS>> {
        if length > FIFO_SIZE {
            return Err(FrameError::InvalidLength { bytes: length }.into());
        }
        let mut buf = BurstRead::new();
        for i in 0..=length {
            // header bytes wrap at 8 bits
            let header = addr.wrapping_add((i as u8).wrapping_mul(8)) | READ_BURST;
            buf.push(header)
                .map_err(|_| FrameError::InvalidLength { bytes: length })?;
        }
        self.transaction(|spi| spi.transfer_in_place(&mut buf))?;
        log::trace!("burst read 0x{:02X}, {} bytes", addr, length);
        Ok(buf)
    }

    /// `{addr, 0x00}` with no access bits; returns both status bytes.
    pub fn strobe(&mut self, addr: u8) -> Result<[u8; 2], TransportError<SPI, CS>> {
        let mut buf = [addr, 0x00];
        self.transaction(|spi| spi.transfer_in_place(&mut buf))?;
        log::trace!("strobe 0x{:02X} -> {:02X?}", addr, buf);
        Ok(buf)
    }
}
