//! Reporter configuration.
//!
//! Credentials and the server address are literals compiled into the image.
//! They can be replaced at build time by exporting the `SENSOR_REPORTER_*`
//! variables before running cargo; nothing is read at runtime.

use std::{num::ParseIntError, time::Duration};

use thiserror::Error;

const DEFAULT_WIFI_SSID: &str = "WIFI_SSID";
const DEFAULT_WIFI_PASSWORD: &str = "WIFI_PASS";
const DEFAULT_SERVER_HOST: &str = "11.11.136.160";
const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_SERVER_PATH: &str = "/update";
const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_SAMPLES: u16 = 1;

const MAX_SSID_LEN: usize = 32;
const MAX_PASSWORD_LEN: usize = 64;

pub const WIFI_SSID_KEY: &str = "SENSOR_REPORTER_WIFI_SSID";
pub const WIFI_PASSWORD_KEY: &str = "SENSOR_REPORTER_WIFI_PASSWORD";
pub const SERVER_HOST_KEY: &str = "SENSOR_REPORTER_SERVER_HOST";
pub const SERVER_PORT_KEY: &str = "SENSOR_REPORTER_SERVER_PORT";
pub const SERVER_PATH_KEY: &str = "SENSOR_REPORTER_SERVER_PATH";
pub const INTERVAL_MS_KEY: &str = "SENSOR_REPORTER_INTERVAL_MS";
pub const SAMPLES_KEY: &str = "SENSOR_REPORTER_SAMPLES";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("WiFi SSID cannot be empty")]
    EmptySsid,

    #[error("WiFi SSID is {0} bytes long, at most 32 are allowed")]
    SsidTooLong(usize),

    #[error("WiFi password is {0} bytes long, at most 64 are allowed")]
    PasswordTooLong(usize),

    #[error("server host cannot be empty")]
    EmptyHost,

    #[error("server port cannot be 0")]
    InvalidPort,

    #[error("server path must start with '/', got {0:?}")]
    InvalidPath(String),

    #[error("report interval cannot be zero")]
    ZeroInterval,

    #[error("samples per reading cannot be zero")]
    ZeroSamples,

    #[error("{key} is not a valid number: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: ParseIntError,
    },
}

/// Everything the reporting loop needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterConfig {
    pub wifi_ssid: String,
    /// `None` joins an open network.
    pub wifi_password: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub server_path: String,
    pub report_interval: Duration,
    /// ADC samples averaged into a single reading.
    pub samples_per_reading: u16,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        ReporterConfig {
            wifi_ssid: DEFAULT_WIFI_SSID.to_string(),
            wifi_password: Some(DEFAULT_WIFI_PASSWORD.to_string()),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            server_path: DEFAULT_SERVER_PATH.to_string(),
            report_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            samples_per_reading: DEFAULT_SAMPLES,
        }
    }
}

impl ReporterConfig {
    /// Builds the configuration from the values captured at compile time.
    ///
    /// # Errors
    ///
    /// Any `ConfigError` returned by [`ReporterConfig::from_lookup`].
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                WIFI_SSID_KEY => option_env!("SENSOR_REPORTER_WIFI_SSID"),
                WIFI_PASSWORD_KEY => option_env!("SENSOR_REPORTER_WIFI_PASSWORD"),
                SERVER_HOST_KEY => option_env!("SENSOR_REPORTER_SERVER_HOST"),
                SERVER_PORT_KEY => option_env!("SENSOR_REPORTER_SERVER_PORT"),
                SERVER_PATH_KEY => option_env!("SENSOR_REPORTER_SERVER_PATH"),
                INTERVAL_MS_KEY => option_env!("SENSOR_REPORTER_INTERVAL_MS"),
                SAMPLES_KEY => option_env!("SENSOR_REPORTER_SAMPLES"),
                _ => None,
            };
            value.map(String::from)
        })
    }

    /// Starts from the defaults and overrides every field whose key `lookup`
    /// knows about. An empty password selects an open network.
    ///
    /// # Arguments
    ///
    /// - `lookup`: Returns the override for a `SENSOR_REPORTER_*` key, if any.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidNumber`: If a numeric override does not parse.
    /// - Any error from [`ReporterConfig::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ReporterConfig::default();

        if let Some(ssid) = lookup(WIFI_SSID_KEY) {
            config.wifi_ssid = ssid;
        }
        if let Some(password) = lookup(WIFI_PASSWORD_KEY) {
            config.wifi_password = (!password.is_empty()).then_some(password);
        }
        if let Some(host) = lookup(SERVER_HOST_KEY) {
            config.server_host = host;
        }
        if let Some(port) = lookup(SERVER_PORT_KEY) {
            config.server_port = parse_number(SERVER_PORT_KEY, &port)?;
        }
        if let Some(path) = lookup(SERVER_PATH_KEY) {
            config.server_path = path;
        }
        if let Some(interval) = lookup(INTERVAL_MS_KEY) {
            config.report_interval = Duration::from_millis(parse_number(INTERVAL_MS_KEY, &interval)?);
        }
        if let Some(samples) = lookup(SAMPLES_KEY) {
            config.samples_per_reading = parse_number(SAMPLES_KEY, &samples)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the values the drivers would otherwise reject later on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.wifi_ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong(self.wifi_ssid.len()));
        }
        if let Some(password) = &self.wifi_password {
            if password.len() > MAX_PASSWORD_LEN {
                return Err(ConfigError::PasswordTooLong(password.len()));
            }
        }
        if self.server_host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.server_port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !self.server_path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.server_path.clone()));
        }
        if self.report_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.samples_per_reading == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(())
    }

    /// Full URI the readings are posted to.
    pub fn endpoint(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.server_host, self.server_port, self.server_path
        )
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { key, source })
}
