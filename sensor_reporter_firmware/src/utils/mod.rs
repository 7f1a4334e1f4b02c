pub mod sensor_reporter_error;
