// src/cc1101.rs

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::bits::{bits_from_bytes, frame_payload, BitString};
use crate::commands::Strobe;
use crate::config::{Config, SyncWord};
use crate::errors::{Error, FrameError, WaitPhase};
use crate::marc_state::MarcState;
use crate::poll::{poll_until, Cancel, NeverCancel, PollPolicy, Wait};
use crate::profiles::{self, Profile, PA_TABLE};
use crate::registers::*;
use crate::transport::Transport;

/// Settle time after flushing a FIFO.
const FLUSH_SETTLE_MS: u32 = 50;

/// Datasheet RSSI offset at 433 MHz / 250 kBaud.
const RSSI_OFFSET_DB: i16 = 74;

pub struct Cc1101<SPI, CS, GDO0, D> {
    transport: Transport<SPI, CS>,
    gdo0: GDO0,
    delay: D,
    config: Config,
}

impl<SPI, CS, GDO0, D, SPIE, CSE, GDOE> Cc1101<SPI, CS, GDO0, D>
where
    SPI: SpiBus<u8, Error = SPIE>,
    CS: OutputPin<Error = CSE>,
    GDO0: InputPin<Error = GDOE>,
    D: DelayNs,
{
    /// Resets the chip, then writes the frequency word, sync word and PA
    /// table and flushes both FIFOs. No profile is applied yet; call
    /// [`setup_rx`](Self::setup_rx) or [`setup_tx`](Self::setup_tx).
    ///
    /// An out-of-range frequency is reported before anything goes on the bus.
    pub fn new(spi: SPI, cs: CS, gdo0: GDO0, delay: D, config: Config) -> Result<Self, Error<SPIE, CSE, GDOE>> {
        let frequency = config.frequency_word()?;
        log::debug!(
            "cc1101 init: {} Hz carrier (word 0x{:06X}), sync 0x{:04X}, spi {} Hz",
            config.frequency_hz,
            frequency.value(),
            config.sync_word.value(),
            config.spi_baud_hz
        );

        let mut radio = Cc1101 {
            transport: Transport::new(spi, cs),
            gdo0,
            delay,
            config,
        };

        radio.strobe(Strobe::Sres)?;

        let [freq2, freq1, freq0] = frequency.bytes();
        radio.write_register(Register::Freq2, freq2)?;
        radio.write_register(Register::Freq1, freq1)?;
        radio.write_register(Register::Freq0, freq0)?;

        let [sync1, sync0] = radio.config.sync_word.to_be_bytes();
        radio.write_register(Register::Sync1, sync1)?;
        radio.write_register(Register::Sync0, sync0)?;

        radio.transport.write_burst(Register::Patable.addr(), &PA_TABLE)?;
        radio.strobe(Strobe::Sftx)?;
        radio.strobe(Strobe::Sfrx)?;

        Ok(radio)
    }

    /// Gives back the bus, pins and delay.
    pub fn release(self) -> (SPI, CS, GDO0, D) {
        let (spi, cs) = self.transport.into_parts();
        (spi, cs, self.gdo0, self.delay)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn write_register(&mut self, register: Register, value: u8) -> Result<(), Error<SPIE, CSE, GDOE>> {
        Ok(self.transport.write_single_byte(register.addr(), value)?)
    }

    pub fn read_register(&mut self, register: Register) -> Result<u8, Error<SPIE, CSE, GDOE>> {
        Ok(self.transport.read_single_byte(register.addr())?)
    }

    pub fn read_status(&mut self, register: StatusRegister) -> Result<u8, Error<SPIE, CSE, GDOE>> {
        Ok(self.transport.read_single_byte(register.addr())?)
    }

    /// Returns the two status bytes clocked back during the strobe.
    pub fn strobe(&mut self, strobe: Strobe) -> Result<[u8; 2], Error<SPIE, CSE, GDOE>> {
        Ok(self.transport.strobe(strobe.addr())?)
    }

    /// Writes every register of `profile`, in order. A failure part way leaves
    /// the chip half configured; apply the whole profile again.
    pub fn apply_profile(&mut self, profile: &Profile) -> Result<(), Error<SPIE, CSE, GDOE>> {
        log::debug!("applying {} profile", profile.name());
        for &(register, value) in profile.settings() {
            self.write_register(register, value)?;
        }
        Ok(())
    }

    pub fn setup_rx(&mut self) -> Result<(), Error<SPIE, CSE, GDOE>> {
        self.apply_profile(&profiles::RX)
    }

    pub fn setup_tx(&mut self) -> Result<(), Error<SPIE, CSE, GDOE>> {
        self.apply_profile(&profiles::TX)
    }

    pub fn marc_state(&mut self) -> Result<MarcState, Error<SPIE, CSE, GDOE>> {
        let raw = self.read_status(StatusRegister::Marcstate)?;
        Ok(MarcState::from_raw(raw))
    }

    pub fn part_number(&mut self) -> Result<u8, Error<SPIE, CSE, GDOE>> {
        self.read_status(StatusRegister::Partnum)
    }

    pub fn version(&mut self) -> Result<u8, Error<SPIE, CSE, GDOE>> {
        self.read_status(StatusRegister::Version)
    }

    /// Current RSSI in dBm.
    pub fn rssi_dbm(&mut self) -> Result<i16, Error<SPIE, CSE, GDOE>> {
        let raw = self.read_status(StatusRegister::Rssi)?;
        Ok(i16::from(raw as i8) / 2 - RSSI_OFFSET_DB)
    }

    /// Symbol rate programmed in MDMCFG4/MDMCFG3, in baud.
    pub fn data_rate_hz(&mut self) -> Result<u32, Error<SPIE, CSE, GDOE>> {
        let mantissa = u64::from(self.read_register(Register::Mdmcfg3)?);
        let exponent = u32::from(self.read_register(Register::Mdmcfg4)? & 0x0F);
        let crystal = u64::from(self.config.crystal_hz);
        Ok((((256 + mantissa) << exponent) * crystal >> 28) as u32)
    }

    /// Changes only the mantissa half of the data rate.
    pub fn set_data_rate_mantissa(&mut self, mantissa: u8) -> Result<(), Error<SPIE, CSE, GDOE>> {
        self.write_register(Register::Mdmcfg3, mantissa)
    }

    /// Flushes the RX FIFO and enters RX without waiting for anything.
    pub fn listen(&mut self) -> Result<(), Error<SPIE, CSE, GDOE>> {
        self.strobe(Strobe::Sfrx)?;
        self.strobe(Strobe::Srx)?;
        log::debug!("listening");
        Ok(())
    }

    /// Receives one fixed-length packet of `length` bytes and returns it as a
    /// bit string. Expects the RX profile to be applied.
    pub fn receive_data(&mut self, length: u8) -> Result<BitString, Error<SPIE, CSE, GDOE>> {
        self.receive_data_with(length, &NeverCancel)
    }

    /// [`receive_data`](Self::receive_data) with a cancellation token checked
    /// on every poll. A timeout or cancellation returns the radio to IDLE with
    /// both FIFOs flushed before the error is handed back.
    pub fn receive_data_with<C>(&mut self, length: u8, cancel: &C) -> Result<BitString, Error<SPIE, CSE, GDOE>>
    where
        C: Cancel + ?Sized,
    {
        let received = self.receive_packet(length, cancel);
        self.recover_if_aborted(received)
    }

    /// Frames `payload` (a '0'/'1' string, multiple of 8, at most 496 bits)
    /// behind a `10101010` preamble and `sync_word`, transmits it and waits
    /// for the TX FIFO to drain. Expects the TX profile, which leaves sync
    /// word generation to the frame, so `sync_word` need not match SYNC1/SYNC0.
    pub fn send_data(&mut self, payload: &str, sync_word: SyncWord) -> Result<(), Error<SPIE, CSE, GDOE>> {
        self.send_data_with(payload, sync_word, &NeverCancel)
    }

    /// [`send_data`](Self::send_data) framed with the configured sync word.
    pub fn send(&mut self, payload: &str) -> Result<(), Error<SPIE, CSE, GDOE>> {
        let sync_word = self.config.sync_word;
        self.send_data(payload, sync_word)
    }

    pub fn send_data_with<C>(
        &mut self,
        payload: &str,
        sync_word: SyncWord,
        cancel: &C,
    ) -> Result<(), Error<SPIE, CSE, GDOE>>
    where
        C: Cancel + ?Sized,
    {
        let sent = self.send_frame(payload, sync_word, cancel);
        self.recover_if_aborted(sent)
    }

    fn receive_packet<C>(&mut self, length: u8, cancel: &C) -> Result<BitString, Error<SPIE, CSE, GDOE>>
    where
        C: Cancel + ?Sized,
    {
        let bytes = usize::from(length);
        if bytes == 0 || bytes > FIFO_SIZE {
            return Err(FrameError::InvalidLength { bytes }.into());
        }

        self.write_register(Register::Pktlen, length)?;
        self.strobe(Strobe::Srx)?;
        log::debug!("waiting for a {} byte packet", length);

        let timeouts = self.config.timeouts;
        self.wait_for_gdo0(true, timeouts.sync_word, WaitPhase::SyncWord, cancel)?;
        self.wait_for_gdo0(false, timeouts.end_of_packet, WaitPhase::EndOfPacket, cancel)?;

        let raw = self.transport.read_burst(Register::Fifo.addr(), bytes)?;
        // raw[0] is the chip status byte
        let bits = bits_from_bytes(&raw[1..])?;
        log::debug!("received {} bits", bits.len());

        self.strobe(Strobe::Sidle)?;
        self.wait_for_idle(cancel)?;
        self.strobe(Strobe::Sfrx)?;
        Ok(bits)
    }

    fn send_frame<C>(&mut self, payload: &str, sync_word: SyncWord, cancel: &C) -> Result<(), Error<SPIE, CSE, GDOE>>
    where
        C: Cancel + ?Sized,
    {
        let frame = frame_payload(payload, sync_word)?;
        log::debug!(
            "sending {} payload bits in a {} byte frame, sync 0x{:04X}",
            payload.len(),
            frame.len(),
            sync_word.value()
        );

        self.write_register(Register::Pktlen, frame.len() as u8)?;

        self.strobe(Strobe::Sidle)?;
        self.wait_for_idle(cancel)?;
        self.strobe(Strobe::Sftx)?;
        self.delay.delay_ms(FLUSH_SETTLE_MS);

        self.transport.write_burst(Register::Fifo.addr(), &frame)?;
        self.strobe(Strobe::Stx)?;

        let transport = &mut self.transport;
        let outcome = poll_until(&mut self.delay, self.config.timeouts.tx_drain, cancel, || -> Result<bool, Error<SPIE, CSE, GDOE>> {
            let pending = transport.read_single_byte(StatusRegister::Txbytes.addr())? & BYTES_IN_FIFO_MASK;
            log::trace!("{} bytes left in TX FIFO", pending);
            Ok(pending == 0)
        })?;
        Self::settled(outcome, WaitPhase::TxDrain)?;

        self.strobe(Strobe::Sftx)?;
        self.strobe(Strobe::Sfrx)?;
        self.delay.delay_ms(FLUSH_SETTLE_MS);

        let remaining = self.read_status(StatusRegister::Txbytes)? & BYTES_IN_FIFO_MASK;
        if remaining != 0 {
            log::warn!("tx underflow, {} bytes left in FIFO", remaining);
            return Err(Error::TxUnderflow { remaining });
        }
        log::debug!("packet sent");
        Ok(())
    }

    /// Runs [`recover`](Self::recover) when `result` is a timeout or a
    /// cancellation. The original error always wins over a recovery failure.
    fn recover_if_aborted<T>(&mut self, result: Result<T, Error<SPIE, CSE, GDOE>>) -> Result<T, Error<SPIE, CSE, GDOE>> {
        if let Err(err) = &result {
            if err.is_aborted_wait() {
                self.recover();
            }
        }
        result
    }

    /// Best-effort return to IDLE with both FIFOs flushed. SFTX and SFRX are
    /// only honoured in IDLE, so they follow a bounded wait for it; a radio
    /// that never gets there is flushed anyway.
    fn recover(&mut self) {
        if self.strobe(Strobe::Sidle).is_err() {
            log::warn!("recovery: SIDLE failed, radio state unknown");
            return;
        }
        if self.wait_for_idle(&NeverCancel).is_err() {
            log::warn!("recovery: radio did not report IDLE");
        }
        if self.strobe(Strobe::Sftx).is_err() || self.strobe(Strobe::Sfrx).is_err() {
            log::warn!("recovery: FIFO flush failed");
        }
    }

    fn wait_for_gdo0<C>(
        &mut self,
        level: bool,
        policy: PollPolicy,
        phase: WaitPhase,
        cancel: &C,
    ) -> Result<(), Error<SPIE, CSE, GDOE>>
    where
        C: Cancel + ?Sized,
    {
        let gdo0 = &mut self.gdo0;
        let outcome = poll_until(&mut self.delay, policy, cancel, || -> Result<bool, Error<SPIE, CSE, GDOE>> {
            gdo0.is_high().map(|high| high == level).map_err(Error::Gdo0)
        })?;
        Self::settled(outcome, phase)
    }

    /// Polls MARCSTATE until the radio reports IDLE.
    fn wait_for_idle<C>(&mut self, cancel: &C) -> Result<(), Error<SPIE, CSE, GDOE>>
    where
        C: Cancel + ?Sized,
    {
        let transport = &mut self.transport;
        let outcome = poll_until(&mut self.delay, self.config.timeouts.idle, cancel, || -> Result<bool, Error<SPIE, CSE, GDOE>> {
            let raw = transport.read_single_byte(StatusRegister::Marcstate.addr())?;
            Ok(MarcState::from_raw(raw) == MarcState::Idle)
        })?;
        Self::settled(outcome, WaitPhase::Idle)
    }

    fn settled(outcome: Wait, phase: WaitPhase) -> Result<(), Error<SPIE, CSE, GDOE>> {
        match outcome {
            Wait::Ready => Ok(()),
            Wait::TimedOut => {
                log::warn!("timed out waiting for {:?}", phase);
                Err(Error::Timeout(phase))
            }
            Wait::Cancelled => {
                log::warn!("cancelled while waiting for {:?}", phase);
                Err(Error::Cancelled(phase))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{bits_from_bytes, frame_payload};
    use crate::config::{SyncWord, Timeouts};
    use crate::errors::ConfigError;
    use crate::testing::{Expect, STATUS};
    use core::sync::atomic::AtomicBool;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::Mock as PinMock;
    use embedded_hal_mock::eh1::spi::Mock as SpiMock;

    type Radio = Cc1101<SpiMock<u8>, PinMock, PinMock, NoopDelay>;

    const MARCSTATE: u8 = 0xF5;
    const TXBYTES: u8 = 0xFA;

    fn config(sync_word: &str) -> Config {
        Config::new(50_000, 434_400_000, sync_word)
            .unwrap()
            .with_timeouts(Timeouts {
                sync_word: PollPolicy::new(30, 10),
                end_of_packet: PollPolicy::new(30, 10),
                idle: PollPolicy::new(30, 10),
                tx_drain: PollPolicy::new(300_000, 100_000),
            })
    }

    fn radio(expect: &Expect, config: Config) -> Radio {
        let (spi, cs, gdo0) = expect.mocks();
        Cc1101::new(spi, cs, gdo0, NoopDelay::new(), config).unwrap()
    }

    fn finish(radio: Radio) {
        let (mut spi, mut cs, mut gdo0, _) = radio.release();
        spi.done();
        cs.done();
        gdo0.done();
    }

    fn rx_ready(config: &Config) -> Expect {
        let mut expect = Expect::new();
        expect.construction(config).profile(&profiles::RX);
        expect
    }

    fn tx_ready(config: &Config) -> Expect {
        let mut expect = Expect::new();
        expect.construction(config).profile(&profiles::TX);
        expect
    }

    /// SIDLE, IDLE on the first poll, then both flushes.
    fn recovery(expect: &mut Expect) {
        expect
            .strobe(Strobe::Sidle)
            .read(MARCSTATE, 0x01)
            .strobe(Strobe::Sftx)
            .strobe(Strobe::Sfrx);
    }

    #[test]
    fn construction_resets_and_programs_frequency_sync_and_pa() {
        let config = config("666A");
        let mut expect = Expect::new();
        expect
            .strobe(Strobe::Sres)
            .write(0x0D, 0x10)
            .write(0x0E, 0xB5)
            .write(0x0F, 0x2B)
            .write(0x04, 0x66)
            .write(0x05, 0x6A)
            .burst_write(0x3E, &[0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
            .strobe(Strobe::Sftx)
            .strobe(Strobe::Sfrx);

        let radio = radio(&expect, config);
        assert_eq!(radio.config().sync_word, SyncWord::new(0x666A));
        finish(radio);
    }

    #[test]
    fn out_of_range_frequency_fails_before_any_traffic() {
        let config = Config::new(50_000, 4_000_000_000, "1234")
            .unwrap()
            .with_crystal(13_000_000);
        let expect = Expect::new();
        let (spi, cs, gdo0) = expect.mocks();
        let (mut spi_check, mut cs_check, mut gdo0_check) = (spi.clone(), cs.clone(), gdo0.clone());

        let result = Cc1101::new(spi, cs, gdo0, NoopDelay::new(), config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::FrequencyOutOfRange))
        ));

        spi_check.done();
        cs_check.done();
        gdo0_check.done();
    }

    #[test]
    fn setup_rx_and_tx_write_their_profiles() {
        let config = config("666A");
        let mut expect = Expect::new();
        expect
            .construction(&config)
            .profile(&profiles::RX)
            .profile(&profiles::TX);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        radio.setup_tx().unwrap();
        finish(radio);
    }

    #[test]
    fn receives_one_packet_between_gdo0_edges() {
        let config = config("666A");
        let mut expect = rx_ready(&config);
        expect
            .write(0x06, 2)
            .strobe(Strobe::Srx)
            .gdo0(false)
            .gdo0(true)
            .gdo0(true)
            .gdo0(false)
            .burst_read(0x3F, &[0x42, 0b0101_1010, 0b1111_0000])
            .strobe(Strobe::Sidle)
            .read(MARCSTATE, 0x0D)
            .read(MARCSTATE, 0x01)
            .strobe(Strobe::Sfrx);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        let bits = radio.receive_data(2).unwrap();
        assert_eq!(bits.as_str(), "0101101011110000");
        finish(radio);
    }

    #[test]
    fn receive_decodes_what_framing_produced() {
        let config = config("1234");
        let payload = "110011000000111110100101";
        let frame = frame_payload(payload, config.sync_word).unwrap();
        // the receiver strips preamble and sync word, the FIFO holds the payload
        let body = &frame[frame.len() - payload.len() / 8..];
        let mut fifo = vec![STATUS];
        fifo.extend_from_slice(body);

        let mut expect = rx_ready(&config);
        expect
            .write(0x06, body.len() as u8)
            .strobe(Strobe::Srx)
            .gdo0(true)
            .gdo0(false)
            .burst_read(0x3F, &fifo)
            .strobe(Strobe::Sidle)
            .read(MARCSTATE, 0x01)
            .strobe(Strobe::Sfrx);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        let bits = radio.receive_data(body.len() as u8).unwrap();
        assert_eq!(bits.as_str(), payload);
        finish(radio);
    }

    #[test]
    fn full_fifo_burst_read() {
        let config = config("1234");
        let mut fifo = vec![STATUS];
        fifo.extend((0..64).map(|i| i as u8));

        let mut expect = rx_ready(&config);
        expect
            .write(0x06, 64)
            .strobe(Strobe::Srx)
            .gdo0(true)
            .gdo0(false)
            .burst_read(0x3F, &fifo)
            .strobe(Strobe::Sidle)
            .read(MARCSTATE, 0x01)
            .strobe(Strobe::Sfrx);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        let bits = radio.receive_data(64).unwrap();
        assert_eq!(bits, bits_from_bytes(&fifo[1..]).unwrap());
        finish(radio);
    }

    #[test]
    fn missing_sync_word_times_out_and_flushes() {
        let config = config("666A");
        let mut expect = rx_ready(&config);
        expect.write(0x06, 25).strobe(Strobe::Srx);
        for _ in 0..4 {
            expect.gdo0(false);
        }
        recovery(&mut expect);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        assert_eq!(
            radio.receive_data(25).unwrap_err(),
            Error::Timeout(WaitPhase::SyncWord)
        );
        finish(radio);
    }

    #[test]
    fn packet_that_never_ends_times_out() {
        let config = config("666A");
        let mut expect = rx_ready(&config);
        expect.write(0x06, 25).strobe(Strobe::Srx).gdo0(true);
        for _ in 0..4 {
            expect.gdo0(true);
        }
        recovery(&mut expect);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        assert_eq!(
            radio.receive_data(25).unwrap_err(),
            Error::Timeout(WaitPhase::EndOfPacket)
        );
        finish(radio);
    }

    #[test]
    fn cancelled_receive_returns_to_idle() {
        let config = config("666A");
        let mut expect = rx_ready(&config);
        expect.write(0x06, 25).strobe(Strobe::Srx);
        recovery(&mut expect);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        let cancel = AtomicBool::new(true);
        assert_eq!(
            radio.receive_data_with(25, &cancel).unwrap_err(),
            Error::Cancelled(WaitPhase::SyncWord)
        );
        finish(radio);
    }

    #[test]
    fn receive_rejects_lengths_outside_the_fifo() {
        let config = config("666A");
        let expect = rx_ready(&config);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        assert_eq!(
            radio.receive_data(0).unwrap_err(),
            Error::Frame(FrameError::InvalidLength { bytes: 0 })
        );
        assert_eq!(
            radio.receive_data(65).unwrap_err(),
            Error::Frame(FrameError::InvalidLength { bytes: 65 })
        );
        finish(radio);
    }

    fn sent_frame(expect: &mut Expect, frame: &[u8]) {
        expect
            .write(0x06, frame.len() as u8)
            .strobe(Strobe::Sidle)
            .read(MARCSTATE, 0x13)
            .read(MARCSTATE, 0x01)
            .strobe(Strobe::Sftx)
            .burst_write(0x3F, frame)
            .strobe(Strobe::Stx);
    }

    #[test]
    fn sends_framed_payload_and_waits_for_drain() {
        let config = config("1234");
        let mut frame = vec![0xAA; 61];
        frame.extend_from_slice(&[0x12, 0x34, 0xCC]);

        let mut expect = tx_ready(&config);
        sent_frame(&mut expect, &frame);
        expect
            .read(TXBYTES, 0x40)
            .read(TXBYTES, 0x12)
            .read(TXBYTES, 0x80) // underflow flag alone does not count
            .strobe(Strobe::Sftx)
            .strobe(Strobe::Sfrx)
            .read(TXBYTES, 0x00);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        radio.send("11001100").unwrap();
        finish(radio);
    }

    #[test]
    fn leftover_bytes_after_flush_report_underflow() {
        let config = config("1234");
        let frame = frame_payload("11110000", config.sync_word).unwrap();

        let mut expect = tx_ready(&config);
        sent_frame(&mut expect, &frame);
        expect
            .read(TXBYTES, 0x00)
            .strobe(Strobe::Sftx)
            .strobe(Strobe::Sfrx)
            .read(TXBYTES, 0x03);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        assert_eq!(
            radio.send("11110000").unwrap_err(),
            Error::TxUnderflow { remaining: 3 }
        );
        finish(radio);
    }

    #[test]
    fn fifo_that_never_drains_times_out_and_recovers() {
        let config = config("1234");
        let frame = frame_payload("", config.sync_word).unwrap();

        let mut expect = tx_ready(&config);
        sent_frame(&mut expect, &frame);
        // polled at 0, 100, 200 and 300 ms
        for _ in 0..4 {
            expect.read(TXBYTES, 0x20);
        }
        recovery(&mut expect);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        assert_eq!(
            radio.send("").unwrap_err(),
            Error::Timeout(WaitPhase::TxDrain)
        );
        finish(radio);
    }

    #[test]
    fn cancelled_send_recovers() {
        let config = config("1234");
        let mut expect = tx_ready(&config);
        expect.write(0x06, 64).strobe(Strobe::Sidle);
        recovery(&mut expect);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        let cancel = AtomicBool::new(true);
        let sync_word = radio.config().sync_word;
        assert_eq!(
            radio.send_data_with("11001100", sync_word, &cancel).unwrap_err(),
            Error::Cancelled(WaitPhase::Idle)
        );
        finish(radio);
    }

    #[test]
    fn frame_carries_the_sync_word_passed_to_send() {
        let config = config("666A");
        let mut frame = vec![0xAA; 61];
        frame.extend_from_slice(&[0x12, 0x34, 0xCC]);

        let mut expect = tx_ready(&config);
        sent_frame(&mut expect, &frame);
        expect
            .read(TXBYTES, 0x00)
            .strobe(Strobe::Sftx)
            .strobe(Strobe::Sfrx)
            .read(TXBYTES, 0x00);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        radio.send_data("11001100", SyncWord::new(0x1234)).unwrap();
        // SYNC1/SYNC0 keep the configured word
        assert_eq!(radio.config().sync_word, SyncWord::new(0x666A));
        finish(radio);
    }

    #[test]
    fn radio_stuck_before_tx_times_out_on_idle() {
        let config = config("1234");
        let mut expect = tx_ready(&config);
        expect.write(0x06, 64).strobe(Strobe::Sidle);
        for _ in 0..4 {
            expect.read(MARCSTATE, 0x13);
        }
        // recovery waits again, gives up, and flushes regardless
        expect.strobe(Strobe::Sidle);
        for _ in 0..4 {
            expect.read(MARCSTATE, 0x13);
        }
        expect.strobe(Strobe::Sftx).strobe(Strobe::Sfrx);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        assert_eq!(
            radio.send("11001100").unwrap_err(),
            Error::Timeout(WaitPhase::Idle)
        );
        finish(radio);
    }

    #[test]
    fn radio_stuck_after_rx_times_out_on_idle() {
        let config = config("666A");
        let mut expect = rx_ready(&config);
        expect
            .write(0x06, 2)
            .strobe(Strobe::Srx)
            .gdo0(true)
            .gdo0(false)
            .burst_read(0x3F, &[STATUS, 0xAB, 0xCD])
            .strobe(Strobe::Sidle);
        for _ in 0..4 {
            expect.read(MARCSTATE, 0x0D);
        }
        recovery(&mut expect);

        let mut radio = radio(&expect, config);
        radio.setup_rx().unwrap();
        assert_eq!(
            radio.receive_data(2).unwrap_err(),
            Error::Timeout(WaitPhase::Idle)
        );
        finish(radio);
    }

    /// CS pin that starts failing after a fixed number of level changes.
    struct WornCs {
        changes_left: usize,
    }

    #[derive(Debug, PartialEq)]
    struct CsFault;

    impl embedded_hal::digital::Error for CsFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl embedded_hal::digital::ErrorType for WornCs {
        type Error = CsFault;
    }

    impl WornCs {
        fn change(&mut self) -> Result<(), CsFault> {
            if self.changes_left == 0 {
                return Err(CsFault);
            }
            self.changes_left -= 1;
            Ok(())
        }
    }

    impl OutputPin for WornCs {
        fn set_low(&mut self) -> Result<(), CsFault> {
            self.change()
        }

        fn set_high(&mut self) -> Result<(), CsFault> {
            self.change()
        }
    }

    #[test]
    fn timeout_survives_failed_recovery() {
        let config = config("666A");
        let mut expect = Expect::new();
        expect.construction(&config).write(0x06, 25).strobe(Strobe::Srx);
        for _ in 0..4 {
            expect.gdo0(false);
        }
        // construction is nine transactions, PKTLEN and SRX two more, so
        // CS fails on the SIDLE that starts the recovery
        let cs = WornCs { changes_left: 2 * 11 };

        let mut radio = Cc1101::new(expect.spi_mock(), cs, expect.gdo0_mock(), NoopDelay::new(), config).unwrap();
        assert_eq!(
            radio.receive_data(25).unwrap_err(),
            Error::Timeout(WaitPhase::SyncWord)
        );
        let (mut spi, _, mut gdo0, _) = radio.release();
        spi.done();
        gdo0.done();
    }

    #[test]
    fn invalid_payloads_never_reach_the_bus() {
        let config = config("1234");
        let expect = tx_ready(&config);

        let mut radio = radio(&expect, config);
        radio.setup_tx().unwrap();
        let oversized = "10".repeat(252);
        assert_eq!(
            radio.send(&oversized).unwrap_err(),
            Error::Frame(FrameError::PayloadTooLong { bits: 504 })
        );
        assert_eq!(
            radio.send("1100").unwrap_err(),
            Error::Frame(FrameError::Misaligned { bits: 4 })
        );
        assert_eq!(
            radio.send("1100110x").unwrap_err(),
            Error::Frame(FrameError::NotBinary)
        );
        finish(radio);
    }

    #[test]
    fn chip_diagnostics() {
        let config = config("666A");
        let mut expect = Expect::new();
        expect
            .construction(&config)
            .read(0xF0, 0x00)
            .read(0xF1, 0x14)
            .read(MARCSTATE, 0x0D)
            .read(0xF4, 0x80)
            .read(0xF4, 0x3C);

        let mut radio = radio(&expect, config);
        assert_eq!(radio.part_number().unwrap(), 0x00);
        assert_eq!(radio.version().unwrap(), 0x14);
        assert_eq!(radio.marc_state().unwrap(), MarcState::Rx);
        assert_eq!(radio.rssi_dbm().unwrap(), -138);
        assert_eq!(radio.rssi_dbm().unwrap(), -44);
        finish(radio);
    }

    #[test]
    fn data_rate_follows_modem_config() {
        let config = config("666A");
        let mut expect = Expect::new();
        expect
            .construction(&config)
            .read(0x11, 0x10)
            .read(0x10, 0xF7)
            .write(0x11, 0x43)
            .read(0x11, 0x43)
            .read(0x10, 0xF7);

        let mut radio = radio(&expect, config);
        assert_eq!(radio.data_rate_hz().unwrap(), 3372);
        radio.set_data_rate_mantissa(0x43).unwrap();
        assert_eq!(radio.data_rate_hz().unwrap(), 4004);
        finish(radio);
    }

    #[test]
    fn listen_flushes_then_enters_rx() {
        let config = config("666A");
        let mut expect = Expect::new();
        expect
            .construction(&config)
            .strobe(Strobe::Sfrx)
            .strobe(Strobe::Srx);

        let mut radio = radio(&expect, config);
        radio.listen().unwrap();
        finish(radio);
    }
}
