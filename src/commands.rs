// src/commands.rs

// Command strobes for the CC1101
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strobe {
    Sres = 0x30,    // Reset chip
    Sfstxon = 0x31, // Enable and calibrate frequency synthesizer
    Sxoff = 0x32,   // Turn off crystal oscillator
    Scal = 0x33,    // Calibrate frequency synthesizer and turn it off
    Srx = 0x34,     // Enable RX
    Stx = 0x35,     // Enable TX
    Sidle = 0x36,   // Exit RX / TX, turn off frequency synthesizer
    Safc = 0x37,    // AFC adjustment of frequency synthesizer
    Swor = 0x38,    // Start automatic RX polling sequence (wake-on-radio)
    Spwd = 0x39,    // Enter power down mode when CSn goes high
    Sfrx = 0x3A,    // Flush the RX FIFO. Only in IDLE or RXFIFO_OVERFLOW
    Sftx = 0x3B,    // Flush the TX FIFO. Only in IDLE or TXFIFO_UNDERFLOW
    Sworrst = 0x3C, // Reset real time clock to Event1 value
    Snop = 0x3D,    // No operation, returns the chip status byte
}

impl Strobe {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}
