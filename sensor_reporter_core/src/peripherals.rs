//! Take-once bookkeeping of the esp32c6 peripherals the reporter uses.

use std::mem;

/// GPIO0 to GPIO6 are wired to ADC1.
const ANALOG_PIN_COUNT: usize = 7;

/// Error types related to taking peripherals.
#[derive(Debug, PartialEq, Eq)]
pub enum PeripheralError {
    AlreadyTaken,
    NotAPin,
    NotAModem,
}

/// A peripheral that can only be handed out once. Taking it leaves
/// `Peripheral::None` in its slot.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum Peripheral {
    Pin(u8),
    Adc,
    Modem,
    #[default]
    None,
}

impl Peripheral {
    fn take(&mut self) -> Peripheral {
        mem::take(self)
    }
}

/// The ADC capable pins, the ADC itself and the radio modem.
pub struct Peripherals {
    analog_pins: [Peripheral; ANALOG_PIN_COUNT],
    adc: Peripheral,
    modem: Peripheral,
}

impl Peripherals {
    pub fn new() -> Peripherals {
        Peripherals {
            analog_pins: std::array::from_fn(|pin_num| Peripheral::Pin(pin_num as u8)),
            adc: Peripheral::Adc,
            modem: Peripheral::Modem,
        }
    }

    /// Returns the pin if it is connected to ADC1 and was not taken before,
    /// `Peripheral::None` otherwise.
    pub fn get_analog_pin(&mut self, pin_num: usize) -> Peripheral {
        if pin_num < ANALOG_PIN_COUNT {
            return self.analog_pins[pin_num].take();
        }
        Peripheral::None
    }

    pub fn get_adc(&mut self) -> Peripheral {
        self.adc.take()
    }

    pub fn get_wifi_peripheral(&mut self) -> Peripheral {
        self.modem.take()
    }
}

impl Default for Peripherals {
    fn default() -> Self {
        Self::new()
    }
}
