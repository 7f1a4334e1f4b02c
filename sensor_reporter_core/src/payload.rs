//! Wire format of the update request body.
//!
//! The server expects exactly `{"sensor_value": N}`: compact JSON except for
//! a single space after the colon.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use thiserror::Error;

use crate::reading::SensorReading;

/// Value of the `Content-Type` header sent with every update.
pub const CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum PayloadError {
    /// NaN and infinities have no JSON representation.
    #[error("sensor value is not a finite number")]
    NotANumber,

    #[error("failed to serialize reading: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse reading: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Compact formatter that writes `": "` between a key and its value.
struct SpacedValueFormatter;

impl Formatter for SpacedValueFormatter {
    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Renders a reading as the update request body.
///
/// # Errors
///
/// - `PayloadError::Serialize`: If serde_json fails to write the reading.
pub fn encode(reading: &SensorReading) -> Result<String, PayloadError> {
    let mut body = Vec::with_capacity(32);
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, SpacedValueFormatter);
    reading
        .serialize(&mut serializer)
        .map_err(PayloadError::Serialize)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Parses an update request body back into a reading.
pub fn decode(body: &str) -> Result<SensorReading, PayloadError> {
    serde_json::from_str(body).map_err(PayloadError::Deserialize)
}
