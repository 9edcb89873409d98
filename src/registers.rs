// src/registers.rs

// Access-mode bits OR'd into the header byte
pub const WRITE_SINGLE_BYTE: u8 = 0x00;
pub const WRITE_BURST: u8 = 0x40;
pub const READ_SINGLE_BYTE: u8 = 0x80;
pub const READ_BURST: u8 = 0xC0;

/// Depth of each of the TX and RX FIFOs.
pub const FIFO_SIZE: usize = 64;

/// Pending-byte field of TXBYTES / RXBYTES.
pub const BYTES_IN_FIFO_MASK: u8 = 0x7F;

/// Main radio state field of MARCSTATE.
pub const MARCSTATE_MASK: u8 = 0x1F;

/// Configuration registers, plus the PATABLE and FIFO access addresses.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    Iocfg2 = 0x00,   // GDO2 output pin configuration
    Iocfg1 = 0x01,   // GDO1 output pin configuration
    Iocfg0 = 0x02,   // GDO0 output pin configuration
    Fifothr = 0x03,  // RX FIFO and TX FIFO thresholds
    Sync1 = 0x04,    // Sync word, high byte
    Sync0 = 0x05,    // Sync word, low byte
    Pktlen = 0x06,   // Packet length
    Pktctrl1 = 0x07, // Packet automation control
    Pktctrl0 = 0x08, // Packet automation control
    Addr = 0x09,     // Device address
    Channr = 0x0A,   // Channel number
    Fsctrl1 = 0x0B,  // Frequency synthesizer control
    Fsctrl0 = 0x0C,  // Frequency synthesizer control
    Freq2 = 0x0D,    // Frequency control word, high byte
    Freq1 = 0x0E,    // Frequency control word, middle byte
    Freq0 = 0x0F,    // Frequency control word, low byte
    Mdmcfg4 = 0x10,  // Modem configuration
    Mdmcfg3 = 0x11,  // Modem configuration
    Mdmcfg2 = 0x12,  // Modem configuration
    Mdmcfg1 = 0x13,  // Modem configuration
    Mdmcfg0 = 0x14,  // Modem configuration
    Deviatn = 0x15,  // Modem deviation setting
    Mcsm2 = 0x16,    // Main radio control state machine configuration
    Mcsm1 = 0x17,    // Main radio control state machine configuration
    Mcsm0 = 0x18,    // Main radio control state machine configuration
    Foccfg = 0x19,   // Frequency offset compensation configuration
    Bscfg = 0x1A,    // Bit synchronization configuration
    Agcctrl2 = 0x1B, // AGC control
    Agcctrl1 = 0x1C, // AGC control
    Agcctrl0 = 0x1D, // AGC control
    Worevt1 = 0x1E,  // High byte event0 timeout
    Worevt0 = 0x1F,  // Low byte event0 timeout
    Worctrl = 0x20,  // Wake on radio control
    Frend1 = 0x21,   // Front end RX configuration
    Frend0 = 0x22,   // Front end TX configuration
    Fscal3 = 0x23,   // Frequency synthesizer calibration
    Fscal2 = 0x24,   // Frequency synthesizer calibration
    Fscal1 = 0x25,   // Frequency synthesizer calibration
    Fscal0 = 0x26,   // Frequency synthesizer calibration
    Rcctrl1 = 0x27,  // RC oscillator configuration
    Rcctrl0 = 0x28,  // RC oscillator configuration

    // Lose their programming in SLEEP
    Fstest = 0x29,  // Frequency synthesizer calibration control
    Ptest = 0x2A,   // Production test
    Agctest = 0x2B, // AGC test
    Test2 = 0x2C,   // Various test settings
    Test1 = 0x2D,   // Various test settings
    Test0 = 0x2E,   // Various test settings

    Patable = 0x3E, // Power amplifier ramp table
    Fifo = 0x3F,    // TXFIFO on write, RXFIFO on read
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Read-only status registers. The burst bit is already part of the address,
/// which is what tells them apart from the command strobes at 0x30..0x3D.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusRegister {
    Partnum = 0xF0,       // Chip ID
    Version = 0xF1,       // Chip version
    Freqest = 0xF2,       // Frequency offset estimate from demodulator
    Lqi = 0xF3,           // Demodulator estimate for link quality
    Rssi = 0xF4,          // Received signal strength indication
    Marcstate = 0xF5,     // Main radio control state machine state
    Wortime1 = 0xF6,      // High byte of WOR time
    Wortime0 = 0xF7,      // Low byte of WOR time
    Pktstatus = 0xF8,     // Current GDOx status and packet status
    VcoVcDac = 0xF9,      // Current setting from PLL calibration module
    Txbytes = 0xFA,       // Underflow and number of bytes in TXFIFO
    Rxbytes = 0xFB,       // Overflow and number of bytes in RXFIFO
    Rcctrl1Status = 0xFC, // Last RC oscillator calibration result
    Rcctrl0Status = 0xFD, // Last RC oscillator calibration result
}

impl StatusRegister {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}
