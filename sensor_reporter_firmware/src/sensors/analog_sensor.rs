use sensor_reporter_core::{SensorReading, SensorSource};

use crate::gpio::{AnalogIn, AnalogInError};

/// Sensor wired to an ADC pin. Each reading is the average of
/// `samples_per_reading` conversions, reported as is.
pub struct AnalogSensor<'a> {
    input: AnalogIn<'a>,
    samples_per_reading: u16,
}

impl<'a> AnalogSensor<'a> {
    /// Creates a new AnalogSensor
    ///
    /// # Arguments
    ///
    /// - `input`: The analog input the sensor is connected to.
    /// - `samples_per_reading`: Amount of conversions averaged into one reading.
    ///
    /// # Returns
    ///
    /// The new AnalogSensor instance
    pub fn new(input: AnalogIn<'a>, samples_per_reading: u16) -> Self {
        AnalogSensor {
            input,
            samples_per_reading,
        }
    }
}

impl SensorSource for AnalogSensor<'_> {
    type Error = AnalogInError;

    fn read(&mut self) -> Result<SensorReading, Self::Error> {
        self.input
            .smooth_read(self.samples_per_reading)
            .map(SensorReading::from)
    }
}
