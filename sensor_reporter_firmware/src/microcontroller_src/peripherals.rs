use esp_idf_svc::hal::modem::Modem;

pub use sensor_reporter_core::peripherals::{Peripheral, PeripheralError, Peripherals};

/// Turns a `Peripheral::Modem` taken from the table into the HAL modem used by
/// the wifi driver.
///
/// # Arguments
///
/// - `peripheral`: What `Peripherals::get_wifi_peripheral` handed out.
///
/// # Returns
///
/// A `Result` containing the HAL modem, or a `PeripheralError` if the modem
/// could not be handed out.
///
/// # Errors
///
/// - `PeripheralError::AlreadyTaken`: If the modem was handed out before.
/// - `PeripheralError::NotAModem`: If the peripheral is anything else.
pub fn into_modem(peripheral: Peripheral) -> Result<Modem, PeripheralError> {
    match peripheral {
        Peripheral::Modem => Ok(unsafe { Modem::new() }),
        Peripheral::None => Err(PeripheralError::AlreadyTaken),
        _ => Err(PeripheralError::NotAModem),
    }
}
