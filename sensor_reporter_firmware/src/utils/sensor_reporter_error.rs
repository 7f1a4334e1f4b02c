use sensor_reporter_core::ConfigError;

use crate::{
    gpio::AnalogInError, microcontroller_src::MicrocontrollerError, wifi::WifiError,
};

/// Setup failures. Once the reporting loop runs, nothing is surfaced as an
/// error anymore.
#[derive(Debug)]
pub enum SensorReporterError {
    AnalogInError(AnalogInError),
    ConfigError(ConfigError),
    MicrocontrollerError(MicrocontrollerError),
    WifiError(WifiError),
}

impl From<AnalogInError> for SensorReporterError {
    fn from(value: AnalogInError) -> Self {
        Self::AnalogInError(value)
    }
}

impl From<ConfigError> for SensorReporterError {
    fn from(value: ConfigError) -> Self {
        Self::ConfigError(value)
    }
}

impl From<MicrocontrollerError> for SensorReporterError {
    fn from(value: MicrocontrollerError) -> Self {
        Self::MicrocontrollerError(value)
    }
}

impl From<WifiError> for SensorReporterError {
    fn from(value: WifiError) -> Self {
        Self::WifiError(value)
    }
}
