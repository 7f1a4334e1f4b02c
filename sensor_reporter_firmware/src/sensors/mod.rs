mod analog_sensor;

pub use analog_sensor::AnalogSensor;
