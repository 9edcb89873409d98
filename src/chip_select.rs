// src/chip_select.rs

use embedded_hal::digital::OutputPin;

/// Active-low chip select, owned by the transport.
pub struct ChipSelect<CS> {
    cs: CS,
}

impl<CS> ChipSelect<CS>
where
    CS: OutputPin,
{
    pub fn new(cs: CS) -> Self {
        ChipSelect { cs }
    }

    pub fn assert(&mut self) -> Result<(), CS::Error> {
        self.cs.set_low()
    }

    pub fn release(&mut self) -> Result<(), CS::Error> {
        self.cs.set_high()
    }

    pub fn into_inner(self) -> CS {
        self.cs
    }
}
