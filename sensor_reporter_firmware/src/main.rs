//! Reads the sensor on GPIO2 and POSTs it as `{"sensor_value": N}` to the
//! configured server, once per report interval. Cycles where the station is
//! not associated are skipped.
//! Note: Set the SENSOR_REPORTER_* variables (see .cargo/config.toml) before building.

use log::{info, warn};
use sensor_reporter::{
    sensors::AnalogSensor, wifi::http::OneShotHttp, Microcontroller, SensorReporterError,
};
use sensor_reporter_core::{Reporter, ReporterConfig};

const SENSOR_PIN: usize = 2;

fn main() -> Result<(), SensorReporterError> {
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = ReporterConfig::from_build_env()?;
    let mut micro = Microcontroller::take()?;

    let input = micro.set_pin_as_analog_in_high_atten(SENSOR_PIN)?;
    let sensor = AnalogSensor::new(input, config.samples_per_reading);

    let mut wifi = micro.get_wifi_driver()?;
    match micro.block_on(wifi.connect(&config.wifi_ssid, config.wifi_password.as_deref())) {
        Ok(()) => match wifi.get_address_info() {
            Ok(ip) => info!("Reporting to {} from {}", config.endpoint(), ip),
            Err(err) => warn!("Connected but could not read own ip: {:?}", err),
        },
        Err(err) => warn!("Could not connect to {}: {:?}", config.wifi_ssid, err),
    }

    let mut reporter = Reporter::new(config, sensor, wifi, OneShotHttp);
    reporter.run(|interval| {
        micro.sleep(u32::try_from(interval.as_millis()).unwrap_or(u32::MAX))
    })
}
