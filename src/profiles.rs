// src/profiles.rs

// Register profiles for receive and transmit.
// Each profile is written register by register, in order, with single-byte
// writes. SYNC, FREQ and PATABLE are set at construction and are not part of
// either profile. The FSTEST, PTEST, AGCTEST and TEST2..0 values come from
// TI SmartRF Studio and are not derived from anything.

use crate::registers::Register::{self, *};

/// Power ramp: index 0 off, index 1 is the output level.
pub const PA_TABLE: [u8; 8] = [0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    name: &'static str,
    settings: &'static [(Register, u8)],
}

impl Profile {
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn settings(&self) -> &'static [(Register, u8)] {
        self.settings
    }

    pub fn value_of(&self, register: Register) -> Option<u8> {
        self.settings
            .iter()
            .find(|(reg, _)| *reg == register)
            .map(|&(_, value)| value)
    }

    /// Registers present in both profiles with different values, as
    /// `(register, ours, theirs)`, in this profile's order.
    pub fn differences<'a>(&'a self, other: &'a Profile) -> impl Iterator<Item = (Register, u8, u8)> + 'a {
        self.settings.iter().filter_map(move |&(reg, ours)| match other.value_of(reg) {
            Some(theirs) if theirs != ours => Some((reg, ours, theirs)),
            _ => None,
        })
    }
}

/// 2-FSK receive with 16/16 sync word detection, GDO0 framing the packet.
pub const RX: Profile = Profile {
    name: "rx",
    settings: &[
        (Iocfg2, 0x29),
        (Iocfg1, 0x2E),
        (Iocfg0, 0x06), // asserts on sync word, deasserts at end of packet
        (Fifothr, 0x47),
        (Pktctrl1, 0x00),
        (Pktctrl0, 0x00), // fixed length, no CRC, no whitening
        (Addr, 0x00),
        (Channr, 0x00),
        (Fsctrl1, 0x08),
        (Fsctrl0, 0x00),
        (Mdmcfg4, 0xF7),
        (Mdmcfg3, 0x10),
        (Mdmcfg2, 0x32),
        (Mdmcfg1, 0x22),
        (Mdmcfg0, 0xF8),
        (Deviatn, 0x00),
        (Mcsm2, 0x07),
        (Mcsm1, 0x30),
        (Mcsm0, 0x18),
        (Foccfg, 0x16),
        (Bscfg, 0x6C),
        (Agcctrl2, 0x06),
        (Agcctrl1, 0x00),
        (Agcctrl0, 0x95),
        (Worevt1, 0x87),
        (Worevt0, 0x6B),
        (Worctrl, 0xFB),
        (Frend1, 0xB6),
        (Frend0, 0x11),
        (Fscal3, 0xE9),
        (Fscal2, 0x2A),
        (Fscal1, 0x00),
        (Fscal0, 0x1F),
        (Rcctrl1, 0x41),
        (Rcctrl0, 0x00),
        (Fstest, 0x59),
        (Ptest, 0x7F),
        (Agctest, 0x3F),
        (Test2, 0x81),
        (Test1, 0x35),
        (Test0, 0x09),
    ],
};

/// Raw transmit: no sync word or preamble from the chip, the frame carries its own.
pub const TX: Profile = Profile {
    name: "tx",
    settings: &[
        (Iocfg2, 0x29),
        (Iocfg1, 0x2E),
        (Iocfg0, 0x06),
        (Fifothr, 0x47),
        (Pktctrl1, 0x00),
        (Pktctrl0, 0x00),
        (Addr, 0x00),
        (Channr, 0x00),
        (Fsctrl1, 0x06),
        (Fsctrl0, 0x00),
        (Mdmcfg4, 0xE7),
        (Mdmcfg3, 0x10),
        (Mdmcfg2, 0x30), // 0x32 would have the chip send 16/16 sync bits itself
        (Mdmcfg1, 0x22),
        (Mdmcfg0, 0xF8),
        (Deviatn, 0x15),
        (Mcsm2, 0x07),
        (Mcsm1, 0x20),
        (Mcsm0, 0x18),
        (Foccfg, 0x14),
        (Bscfg, 0x6C),
        (Agcctrl2, 0x03),
        (Agcctrl1, 0x00),
        (Agcctrl0, 0x92),
        (Worevt1, 0x87),
        (Worevt0, 0x6B),
        (Worctrl, 0xFB),
        (Frend1, 0x56),
        (Frend0, 0x11),
        (Fscal3, 0xE9),
        (Fscal2, 0x2A),
        (Fscal1, 0x00),
        (Fscal0, 0x1F),
        (Rcctrl1, 0x41),
        (Rcctrl0, 0x00),
        (Fstest, 0x59),
        (Ptest, 0x7F),
        (Agctest, 0x3F),
        (Test2, 0x81),
        (Test1, 0x35),
        (Test0, 0x0B),
    ],
};
