use crate::microcontroller_src::peripherals::{Peripheral, PeripheralError};
use esp_idf_svc::{
    hal::{
        adc::{attenuation::adc_atten_t, oneshot::config::AdcChannelConfig, *},
        gpio::*,
    },
    sys::EspError,
};
use oneshot::{AdcChannelDriver, AdcDriver};
use sensor_reporter_core::sampling::average;
use std::rc::Rc;

const MAX_DIGITAL_VAL: u16 = 4095;

/// ADC1 driver shared by every analog channel.
pub type SharableAdcDriver<'a> = Rc<AdcDriver<'a, ADC1>>;

/// Enums the different errors possible when working with the analog in
#[derive(Debug)]
pub enum AnalogInError {
    AdcDriverError,
    ChannelCreationError,
    ErrorReading,
    InvalidPeripheral(PeripheralError),
    InvalidPin,
    NoSamples,
}

/// Declares one `AnalogChannels` variant per ADC1 capable gpio. In the
/// ESP32-C6 these are GPIO-0 to GPIO-6 inclusive.
macro_rules! analog_channels {
    ($($variant:ident => ($pin_num:literal, $gpio:ident)),* $(,)?) => {
        enum AnalogChannels<'a> {
            $($variant(AdcChannelDriver<'a, $gpio, SharableAdcDriver<'a>>),)*
        }

        impl<'a> AnalogChannels<'a> {
            fn new(
                pin_num: u8,
                adc_driver: SharableAdcDriver<'a>,
                config: &AdcChannelConfig,
            ) -> Result<Self, AnalogInError> {
                match pin_num {
                    $($pin_num => AdcChannelDriver::new(adc_driver, unsafe { $gpio::new() }, config)
                        .map(AnalogChannels::$variant)
                        .map_err(|_| AnalogInError::ChannelCreationError),)*
                    _ => Err(AnalogInError::InvalidPin),
                }
            }

            fn read(&mut self) -> Result<u16, EspError> {
                match self {
                    $(AnalogChannels::$variant(channel_driver) => channel_driver.read(),)*
                }
            }
        }
    };
}

analog_channels! {
    Channel0 => (0, Gpio0),
    Channel1 => (1, Gpio1),
    Channel2 => (2, Gpio2),
    Channel3 => (3, Gpio3),
    Channel4 => (4, Gpio4),
    Channel5 => (5, Gpio5),
    Channel6 => (6, Gpio6),
}

/// Driver for receiving analog inputs from a particular pin
pub struct AnalogIn<'a> {
    channel: AnalogChannels<'a>,
}

impl<'a> AnalogIn<'a> {
    /// Create a new AnalogIn for a specific pin, with 12 bits of resolution
    /// and calibration enabled.
    ///
    /// # Arguments
    ///
    /// - `pin`: A Peripheral of type Pin
    /// - `adc_driver`: An instance of a SharableAdcDriver
    /// - `attenuation`: An adc_atten_t representing the desired attenuation
    ///
    /// # Returns
    ///
    /// A `Result` containing the new `AnalogIn` instance, or an `AnalogInError` if the
    /// initialization failed.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::InvalidPeripheral`: If the pin was already taken or is not a pin.
    /// - `AnalogInError::InvalidPin`: If the pin has no ADC1 channel.
    /// - `AnalogInError::ChannelCreationError`: If the channel could not be created.
    pub(crate) fn new(
        pin: Peripheral,
        adc_driver: SharableAdcDriver<'a>,
        attenuation: adc_atten_t,
    ) -> Result<Self, AnalogInError> {
        let mut config = AdcChannelConfig::new();
        config.attenuation = attenuation;
        config.resolution = Resolution::Resolution12Bit;
        config.calibration = true;

        let channel = match pin {
            Peripheral::Pin(pin_num) => AnalogChannels::new(pin_num, adc_driver, &config)?,
            Peripheral::None => {
                return Err(AnalogInError::InvalidPeripheral(PeripheralError::AlreadyTaken))
            }
            _ => return Err(AnalogInError::InvalidPeripheral(PeripheralError::NotAPin)),
        };
        Ok(AnalogIn { channel })
    }

    /// Returns the calibrated value read from the pin, capped at 4095.
    /// The possible range depends on the attenuation set.
    ///
    /// # Returns
    ///
    /// A `Result` containing the read value, or an `AnalogInError` if the read failed.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::ErrorReading`: If the read operation failed
    pub fn read(&mut self) -> Result<u16, AnalogInError> {
        let read_value = self
            .channel
            .read()
            .map_err(|_| AnalogInError::ErrorReading)?;
        Ok(read_value.min(MAX_DIGITAL_VAL))
    }

    /// Reads `amount_of_samples` times and returns the average value.
    ///
    /// # Arguments
    ///
    /// - `amount_of_samples`: How many conversions to average.
    ///
    /// # Returns
    ///
    /// A `Result` containing the truncated mean of the samples, or an `AnalogInError`
    /// if no value could be produced.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::NoSamples`: If `amount_of_samples` is 0.
    /// - `AnalogInError::ErrorReading`: If any of the reads fails.
    pub fn smooth_read(&mut self, amount_of_samples: u16) -> Result<u16, AnalogInError> {
        let mut samples = Vec::with_capacity(amount_of_samples as usize);
        for _ in 0..amount_of_samples {
            samples.push(self.read()?);
        }
        average(&samples).ok_or(AnalogInError::NoSamples)
    }
}
