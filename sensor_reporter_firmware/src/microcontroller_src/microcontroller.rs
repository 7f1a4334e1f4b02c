use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{adc::*, delay::FreeRtos, task::block_on},
};
use log::info;
use oneshot::AdcDriver;
use std::{future::Future, rc::Rc};

use crate::{
    gpio::{AnalogIn, AnalogInError, SharableAdcDriver},
    microcontroller_src::peripherals::*,
    wifi::{WifiDriver, WifiError},
};

#[derive(Debug)]
pub enum MicrocontrollerError {
    EventLoopTaken,
}

/// Primary abstraction for interacting with the microcontroller, providing access to the
/// drivers the reporter needs.
///
/// - `peripherals`: Which of the ADC pins, the ADC and the modem are still available.
/// - `adc_driver`: The ADC1 driver, started the first time an analog input is requested.
/// - `event_loop`: The system event loop the wifi driver subscribes to.
pub struct Microcontroller<'a> {
    peripherals: Peripherals,
    adc_driver: Option<SharableAdcDriver<'a>>,
    event_loop: EspSystemEventLoop,
}

impl<'a> Microcontroller<'a> {
    /// Creates the Microcontroller. Must be called only once.
    ///
    /// # Returns
    ///
    /// A `Result` containing the Microcontroller, or a `MicrocontrollerError`
    /// if the system event loop could not be taken.
    ///
    /// # Errors
    ///
    /// - `MicrocontrollerError::EventLoopTaken`: If the system event loop was already taken.
    pub fn take() -> Result<Self, MicrocontrollerError> {
        esp_idf_svc::sys::link_patches();
        let event_loop =
            EspSystemEventLoop::take().map_err(|_| MicrocontrollerError::EventLoopTaken)?;
        info!("Microcontroller ready");

        Ok(Microcontroller {
            peripherals: Peripherals::new(),
            adc_driver: None,
            event_loop,
        })
    }

    /// Starts the ADC driver if no other was started before. Bitwidth is always 12,
    /// since the ESP32-C6 only allows that width.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::InvalidPeripheral`: If the ADC was already taken.
    /// - `AnalogInError::AdcDriverError`: If the driver could not be started.
    fn start_adc_driver(&mut self) -> Result<SharableAdcDriver<'a>, AnalogInError> {
        if let Some(driver) = &self.adc_driver {
            return Ok(driver.clone());
        }
        if self.peripherals.get_adc() == Peripheral::None {
            return Err(AnalogInError::InvalidPeripheral(PeripheralError::AlreadyTaken));
        }
        let driver = Rc::new(
            AdcDriver::new(unsafe { ADC1::new() }).map_err(|_| AnalogInError::AdcDriverError)?,
        );
        self.adc_driver.replace(driver.clone());
        Ok(driver)
    }

    /// Sets pin as analog input with attenuation set to 11dB, the full 0 to ~3.1V range.
    ///
    /// # Arguments
    ///
    /// - `pin_num`: The number of the pin, GPIO0 to GPIO6.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalogIn` instance if the channel was created,
    /// or an `AnalogInError` if it failed.
    ///
    /// # Errors
    ///
    /// - `AnalogInError::InvalidPeripheral`: If the ADC or the pin was already taken.
    /// - `AnalogInError::AdcDriverError`: If the ADC driver could not be started.
    /// - Any other `AnalogInError` from creating the channel.
    pub fn set_pin_as_analog_in_high_atten(&mut self, pin_num: usize) -> Result<AnalogIn<'a>, AnalogInError> {
        let adc_driver = self.start_adc_driver()?;
        let pin_peripheral = self.peripherals.get_analog_pin(pin_num);
        AnalogIn::new(pin_peripheral, adc_driver, attenuation::DB_11)
    }

    /// Creates the wifi driver. The modem can only be taken once, so subsequent
    /// calls fail.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `WifiDriver`, or a `WifiError` if it could not
    /// be created.
    ///
    /// # Errors
    ///
    /// - `WifiError::PeripheralError`: If the modem was already taken.
    /// - Any error from `WifiDriver::new`.
    pub fn get_wifi_driver(&mut self) -> Result<WifiDriver<'a>, WifiError> {
        let modem = into_modem(self.peripherals.get_wifi_peripheral())?;
        WifiDriver::new(self.event_loop.clone(), modem)
    }

    /// Drives `fut` to completion on the current task.
    ///
    /// # Arguments
    ///
    /// - `fut`: The future to run.
    ///
    /// # Returns
    ///
    /// Whatever `fut` resolves to.
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        block_on(fut)
    }

    /// Blocks the current task for `miliseconds`, letting the idle task and the
    /// wifi stack run.
    pub fn sleep(&self, miliseconds: u32) {
        FreeRtos::delay_ms(miliseconds)
    }
}
