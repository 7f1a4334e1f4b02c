use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::payload::PayloadError;

/// A single sensor sample as it travels to the server.
///
/// The only invariant is that the value is a JSON number, so non-finite
/// floats are rejected on construction. Bodies with any other field are
/// rejected when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorReading {
    sensor_value: Number,
}

impl SensorReading {
    /// Creates a reading from a floating point sample.
    ///
    /// # Errors
    ///
    /// - `PayloadError::NotANumber`: If `value` is NaN or infinite.
    pub fn from_f64(value: f64) -> Result<Self, PayloadError> {
        Number::from_f64(value)
            .map(|sensor_value| SensorReading { sensor_value })
            .ok_or(PayloadError::NotANumber)
    }

    /// Same as [`SensorReading::from_f64`] for single precision samples.
    ///
    /// Goes through the shortest decimal form of `value`, so `0.1f32` is sent
    /// as `0.1` and not as its widened binary value.
    ///
    /// # Errors
    ///
    /// - `PayloadError::NotANumber`: If `value` is NaN or infinite.
    pub fn from_f32(value: f32) -> Result<Self, PayloadError> {
        let widened = value
            .to_string()
            .parse::<f64>()
            .map_err(|_| PayloadError::NotANumber)?;
        Self::from_f64(widened)
    }

    /// Returns the sampled value.
    pub fn value(&self) -> &Number {
        &self.sensor_value
    }
}

macro_rules! reading_from_integer {
    ($($int:ty),*) => {
        $(
            impl From<$int> for SensorReading {
                fn from(value: $int) -> Self {
                    SensorReading { sensor_value: Number::from(value) }
                }
            }
        )*
    };
}

reading_from_integer!(u8, u16, u32, u64, i8, i16, i32, i64);
