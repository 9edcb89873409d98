#![no_std]
#![no_main]

use arduino_hal::default_serial;
use arduino_hal::spi;
use cc1101::{Cc1101, Config, Error};
use embedded_hal::spi::{Mode, Phase, Polarity};
use panic_halt as _;
use ufmt::uwriteln;

const PACKET_BYTES: u8 = 25;

// 16 MHz system clock on the Uno
fn clock_for(baud_hz: u32) -> spi::SerialClockRate {
    match 16_000_000 / baud_hz.max(1) {
        0..=2 => spi::SerialClockRate::OscfOver2,
        3..=4 => spi::SerialClockRate::OscfOver4,
        5..=8 => spi::SerialClockRate::OscfOver8,
        9..=16 => spi::SerialClockRate::OscfOver16,
        17..=32 => spi::SerialClockRate::OscfOver32,
        33..=64 => spi::SerialClockRate::OscfOver64,
        _ => spi::SerialClockRate::OscfOver128,
    }
}

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut serial = default_serial!(dp, pins, 9600);

    let config = match Config::new(50_000, 434_400_000, "666A") {
        Ok(config) => config,
        Err(e) => {
            uwriteln!(&mut serial, "bad config: {:?}", e).ok();
            loop {}
        }
    };

    let settings = spi::Settings {
        data_order: spi::DataOrder::MostSignificantFirst,
        mode: Mode {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        },
        clock: clock_for(config.spi_baud_hz),
    };

    let sclk = pins.d13.into_output();
    let mosi = pins.d11.into_output();
    let miso = pins.d12.into_pull_up_input();
    let cs = pins.d10.into_output();
    let (spi, cs_pin) = spi::Spi::new(dp.SPI, sclk, mosi, miso, cs, settings);

    // GDO0 goes high on sync word, low at end of packet
    let gdo0 = pins.d2.into_floating_input();

    let mut radio = match Cc1101::new(spi, cs_pin, gdo0, arduino_hal::Delay::new(), config) {
        Ok(radio) => radio,
        Err(e) => {
            uwriteln!(&mut serial, "init failed: {:?}", e).ok();
            loop {}
        }
    };

    if let (Ok(part), Ok(version)) = (radio.part_number(), radio.version()) {
        uwriteln!(&mut serial, "CC1101 part {} version {}", part, version).ok();
    }
    if let Err(e) = radio.setup_rx() {
        uwriteln!(&mut serial, "setup_rx failed: {:?}", e).ok();
    }

    loop {
        match radio.receive_data(PACKET_BYTES) {
            Ok(bits) => {
                uwriteln!(&mut serial, "{}", bits.as_str()).ok();
                if let Ok(rssi) = radio.rssi_dbm() {
                    uwriteln!(&mut serial, "rssi {} dBm", rssi).ok();
                }
            }
            Err(Error::Timeout(_)) => {
                uwriteln!(&mut serial, "nothing heard").ok();
            }
            Err(e) => {
                uwriteln!(&mut serial, "receive failed: {:?}", e).ok();
                arduino_hal::delay_ms(1000);
            }
        }
    }
}
