//! Platform agnostic half of the sensor reporter.
//!
//! Everything in here builds and tests on the host. The firmware crate
//! implements the [`link::Link`], [`reporter::Transport`] and
//! [`reporter::SensorSource`] seams on top of the ESP-IDF drivers, and the
//! server crate decodes what the firmware sends with [`payload::decode`].

pub mod config;
pub mod http_header;
pub mod link;
pub mod payload;
pub mod peripherals;
pub mod reading;
pub mod reporter;
pub mod sampling;

pub use config::{ConfigError, ReporterConfig};
pub use link::{connected_or_offline, Link, RejoinPolicy, StationEvent};
pub use payload::PayloadError;
pub use reading::SensorReading;
pub use reporter::{CycleOutcome, ReportStats, Reporter, SensorSource, Transport};
