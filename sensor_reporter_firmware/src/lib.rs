mod microcontroller_src;
mod utils;

pub mod gpio;
pub mod sensors;
pub mod wifi;

pub use microcontroller_src::{peripherals::PeripheralError, Microcontroller, MicrocontrollerError};
pub use utils::sensor_reporter_error::SensorReporterError;
