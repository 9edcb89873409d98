#![no_std]
#![no_main]

use arduino_hal::default_serial;
use arduino_hal::spi;
use cc1101::bits::bits_from_bytes;
use cc1101::{Cc1101, Config};
use embedded_hal::spi::{Mode, Phase, Polarity};
use panic_halt as _;
use ufmt::uwriteln;

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

    // 125 kHz SCK
    let settings = spi::Settings {
        data_order: spi::DataOrder::MostSignificantFirst,
        mode: Mode {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        },
        clock: spi::SerialClockRate::OscfOver128,
    };

    let sclk = pins.d13.into_output();
    let mosi = pins.d11.into_output();
    let miso = pins.d12.into_pull_up_input();
    let cs = pins.d10.into_output();
    let (spi, cs_pin) = spi::Spi::new(dp.SPI, sclk, mosi, miso, cs, settings);
    let gdo0 = pins.d2.into_floating_input();

    let mut radio = match Cc1101::new(spi, cs_pin, gdo0, arduino_hal::Delay::new(), config) {
        Ok(radio) => radio,
        Err(e) => {
            uwriteln!(&mut serial, "init failed: {:?}", e).ok();
            loop {}
        }
    };
    if let Err(e) = radio.setup_tx() {
        uwriteln!(&mut serial, "setup_tx failed: {:?}", e).ok();
    }

    let mut counter: u16 = 0;
    loop {
        // big-endian counter as the payload
        let sent = bits_from_bytes(&counter.to_be_bytes())
            .map_err(cc1101::Error::from)
            .and_then(|payload| radio.send(&payload));
        match sent {
            Ok(()) => {
                uwriteln!(&mut serial, "sent packet {}", counter).ok();
                counter = counter.wrapping_add(1);
            }
            Err(e) => {
                uwriteln!(&mut serial, "send failed: {:?}", e).ok();
            }
        }
        arduino_hal::delay_ms(1000);
    }
}
