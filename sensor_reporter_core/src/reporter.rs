//! The reporting cycle: read, check the link, maybe post.
//!
//! A cycle never retries and never escalates. Whatever goes wrong ends up
//! as a [`CycleOutcome`] plus a log line, and the next cycle starts fresh.

use std::{fmt::Debug, time::Duration};

use log::{debug, warn};

use crate::{config::ReporterConfig, link::Link, payload, reading::SensorReading};

/// Something able to POST a body to a URI.
pub trait Transport {
    type Error: Debug;

    /// Posts `body` to `uri` and returns the response status code.
    ///
    /// The reporter only logs the status, it never branches on it.
    fn post(&mut self, uri: &str, content_type: &str, body: &str) -> Result<u16, Self::Error>;
}

/// Source of the value sent each cycle.
pub trait SensorSource {
    type Error: Debug;

    fn read(&mut self) -> Result<SensorReading, Self::Error>;
}

/// What happened during a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The request went out. Any status code counts, including errors.
    Sent { status: u16 },
    /// Not associated, no network call was attempted.
    SkippedOffline,
    ReadFailed,
    SendFailed,
}

/// Counters over every cycle run so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportStats {
    pub cycles: u64,
    pub sent: u64,
    pub skipped_offline: u64,
    pub read_failures: u64,
    pub send_failures: u64,
}

impl ReportStats {
    fn record(&mut self, outcome: CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Sent { .. } => self.sent += 1,
            CycleOutcome::SkippedOffline => self.skipped_offline += 1,
            CycleOutcome::ReadFailed => self.read_failures += 1,
            CycleOutcome::SendFailed => self.send_failures += 1,
        }
    }
}

/// Periodically sends one reading to the configured endpoint.
///
/// - `S`: where readings come from.
/// - `L`: the network link checked before posting.
/// - `T`: the HTTP transport.
pub struct Reporter<S, L, T> {
    config: ReporterConfig,
    endpoint: String,
    sensor: S,
    link: L,
    transport: T,
    stats: ReportStats,
}

impl<S, L, T> Reporter<S, L, T>
where
    S: SensorSource,
    L: Link,
    T: Transport,
{
    pub fn new(config: ReporterConfig, sensor: S, link: L, transport: T) -> Self {
        let endpoint = config.endpoint();
        Reporter {
            config,
            endpoint,
            sensor,
            link,
            transport,
            stats: ReportStats::default(),
        }
    }

    /// Runs a single cycle.
    ///
    /// The sensor is read every cycle. The transport is called exactly once
    /// if the link is up and the reading could be encoded, never otherwise.
    pub fn tick(&mut self) -> CycleOutcome {
        let outcome = self.cycle();
        self.stats.record(outcome);
        outcome
    }

    fn cycle(&mut self) -> CycleOutcome {
        let reading = match self.sensor.read() {
            Ok(reading) => reading,
            Err(err) => {
                warn!("Dropping cycle, sensor read failed: {:?}", err);
                return CycleOutcome::ReadFailed;
            }
        };

        if !self.link.is_connected() {
            debug!("Not connected, skipping reading {}", reading.value());
            return CycleOutcome::SkippedOffline;
        }

        let body = match payload::encode(&reading) {
            Ok(body) => body,
            Err(err) => {
                warn!("Dropping cycle, could not encode reading: {}", err);
                return CycleOutcome::ReadFailed;
            }
        };

        match self
            .transport
            .post(&self.endpoint, payload::CONTENT_TYPE, &body)
        {
            Ok(status) => {
                debug!("POST {} {} -> {}", self.endpoint, body, status);
                CycleOutcome::Sent { status }
            }
            Err(err) => {
                warn!("POST {} failed: {:?}", self.endpoint, err);
                CycleOutcome::SendFailed
            }
        }
    }

    /// Runs `cycles` cycles, calling `sleep` with the report interval after each one.
    pub fn run_cycles<F>(&mut self, cycles: usize, mut sleep: F)
    where
        F: FnMut(Duration),
    {
        for _ in 0..cycles {
            self.tick();
            sleep(self.config.report_interval);
        }
    }

    /// Runs cycles forever, calling `sleep` with the report interval between them.
    pub fn run<F>(&mut self, mut sleep: F) -> !
    where
        F: FnMut(Duration),
    {
        loop {
            self.tick();
            sleep(self.config.report_interval);
        }
    }

    pub fn stats(&self) -> ReportStats {
        self.stats
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    struct ScriptedSensor {
        readings: VecDeque<Result<SensorReading, &'static str>>,
        reads: usize,
    }

    impl ScriptedSensor {
        fn new(readings: Vec<Result<SensorReading, &'static str>>) -> Self {
            ScriptedSensor {
                readings: readings.into(),
                reads: 0,
            }
        }

        fn counting_up() -> Self {
            Self::new((0u16..100).map(|n| Ok(SensorReading::from(n))).collect())
        }
    }

    impl SensorSource for ScriptedSensor {
        type Error = &'static str;

        fn read(&mut self) -> Result<SensorReading, Self::Error> {
            self.reads += 1;
            self.readings.pop_front().unwrap_or(Err("exhausted"))
        }
    }

    struct Wifi {
        connected: bool,
    }

    impl Link for Wifi {
        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    #[derive(Debug, PartialEq)]
    struct Request {
        uri: String,
        content_type: String,
        body: String,
    }

    struct RecordingTransport {
        requests: Vec<Request>,
        response: Result<u16, &'static str>,
    }

    impl RecordingTransport {
        fn answering(response: Result<u16, &'static str>) -> Self {
            RecordingTransport {
                requests: Vec::new(),
                response,
            }
        }
    }

    impl Transport for RecordingTransport {
        type Error = &'static str;

        fn post(&mut self, uri: &str, content_type: &str, body: &str) -> Result<u16, Self::Error> {
            self.requests.push(Request {
                uri: uri.to_string(),
                content_type: content_type.to_string(),
                body: body.to_string(),
            });
            self.response
        }
    }

    fn reporter(
        sensor: ScriptedSensor,
        connected: bool,
        response: Result<u16, &'static str>,
    ) -> Reporter<ScriptedSensor, Wifi, RecordingTransport> {
        Reporter::new(
            ReporterConfig::default(),
            sensor,
            Wifi { connected },
            RecordingTransport::answering(response),
        )
    }

    #[test]
    fn offline_cycles_never_touch_the_transport() {
        let mut reporter = reporter(ScriptedSensor::counting_up(), false, Ok(200));

        for _ in 0..5 {
            assert_eq!(reporter.tick(), CycleOutcome::SkippedOffline);
        }

        assert!(reporter.transport().requests.is_empty());
        assert_eq!(reporter.sensor.reads, 5);
        assert_eq!(reporter.stats().skipped_offline, 5);
    }

    #[test]
    fn connected_cycle_posts_current_reading_once() {
        let mut reporter = reporter(
            ScriptedSensor::new(vec![Ok(SensorReading::from(1234u16))]),
            true,
            Ok(200),
        );

        assert_eq!(reporter.tick(), CycleOutcome::Sent { status: 200 });

        assert_eq!(
            reporter.transport().requests,
            vec![Request {
                uri: "http://11.11.136.160:5000/update".to_string(),
                content_type: "application/json".to_string(),
                body: r#"{"sensor_value": 1234}"#.to_string(),
            }]
        );
    }

    #[test]
    fn one_post_per_connected_cycle() {
        let mut reporter = reporter(ScriptedSensor::counting_up(), true, Ok(201));

        reporter.run_cycles(3, |_| {});

        let bodies: Vec<&str> = reporter
            .transport()
            .requests
            .iter()
            .map(|request| request.body.as_str())
            .collect();
        assert_eq!(
            bodies,
            vec![
                r#"{"sensor_value": 0}"#,
                r#"{"sensor_value": 1}"#,
                r#"{"sensor_value": 2}"#,
            ]
        );
    }

    #[test]
    fn link_changes_are_seen_on_the_next_cycle() {
        let mut reporter = reporter(ScriptedSensor::counting_up(), false, Ok(200));

        assert_eq!(reporter.tick(), CycleOutcome::SkippedOffline);
        reporter.link_mut().connected = true;
        assert_eq!(reporter.tick(), CycleOutcome::Sent { status: 200 });
        reporter.link_mut().connected = false;
        assert_eq!(reporter.tick(), CycleOutcome::SkippedOffline);

        assert_eq!(reporter.transport().requests.len(), 1);
        assert_eq!(
            reporter.transport().requests[0].body,
            r#"{"sensor_value": 1}"#
        );
    }

    #[test]
    fn failed_post_is_dropped_without_retry() {
        let mut reporter = reporter(ScriptedSensor::counting_up(), true, Err("connection refused"));

        assert_eq!(reporter.tick(), CycleOutcome::SendFailed);
        assert_eq!(reporter.transport().requests.len(), 1);

        assert_eq!(reporter.tick(), CycleOutcome::SendFailed);
        assert_eq!(reporter.transport().requests.len(), 2);
        assert_eq!(reporter.transport().requests[1].body, r#"{"sensor_value": 1}"#);
    }

    #[test]
    fn error_status_is_not_treated_differently() {
        let mut reporter = reporter(ScriptedSensor::counting_up(), true, Ok(500));

        assert_eq!(reporter.tick(), CycleOutcome::Sent { status: 500 });
        assert_eq!(reporter.transport().requests.len(), 1);
        assert_eq!(reporter.stats().sent, 1);
    }

    #[test]
    fn failed_read_skips_the_post() {
        let mut reporter = reporter(
            ScriptedSensor::new(vec![Err("adc timeout"), Ok(SensorReading::from(7u8))]),
            true,
            Ok(200),
        );

        assert_eq!(reporter.tick(), CycleOutcome::ReadFailed);
        assert!(reporter.transport().requests.is_empty());
        assert_eq!(reporter.tick(), CycleOutcome::Sent { status: 200 });
        assert_eq!(reporter.transport().requests[0].body, r#"{"sensor_value": 7}"#);
    }

    #[test]
    fn run_cycles_sleeps_for_the_interval_after_each_cycle() {
        let config = ReporterConfig {
            report_interval: Duration::from_millis(250),
            ..Default::default()
        };
        let mut reporter = Reporter::new(
            config,
            ScriptedSensor::counting_up(),
            Wifi { connected: true },
            RecordingTransport::answering(Ok(200)),
        );
        let mut sleeps = Vec::new();

        reporter.run_cycles(4, |interval| sleeps.push(interval));

        assert_eq!(sleeps, vec![Duration::from_millis(250); 4]);
    }

    #[test]
    fn stats_count_every_outcome() {
        let mut reporter = reporter(
            ScriptedSensor::new(vec![
                Ok(SensorReading::from(1u8)),
                Err("glitch"),
                Ok(SensorReading::from(2u8)),
            ]),
            true,
            Ok(200),
        );

        reporter.tick();
        reporter.tick();
        reporter.link_mut().connected = false;
        reporter.tick();

        assert_eq!(
            reporter.stats(),
            ReportStats {
                cycles: 3,
                sent: 1,
                skipped_offline: 1,
                read_failures: 1,
                send_failures: 0,
            }
        );
    }
}
