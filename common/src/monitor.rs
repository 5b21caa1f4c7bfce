//! The sense, format, transmit and persist loop.

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::clock::{ClockSync, TimeSource};
use crate::config::Config;
use crate::error::StartupError;
use crate::reading::Reading;
use crate::recorder::Recorder;
use crate::sensor::{Baseline, MotionProbe, SensorReader, TemperatureProbe};
use crate::threshold::{is_over_temperature, Alert, FaultTracker};
use crate::uploader::{HttpTransport, Uploader};

/// Network link state, polled once per cycle.
pub trait Connectivity {
    fn is_connected(&mut self) -> bool;
}

/// Hardware and network handles the monitor takes ownership of at boot.
pub struct Components<T, M, S, H, L, D> {
    pub temperature: T,
    pub motion: M,
    pub time: S,
    pub transport: H,
    pub link: L,
    pub delay: D,
}

/// Running counters since boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub offline: u64,
    pub uploads_failed: u64,
    pub records_failed: u64,
    pub sensor_errors: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    pub reading: Reading,
    pub over_temperature: bool,
    pub uploaded: bool,
    pub recorded: bool,
    pub alerts: Vec<Alert>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// The link was down, nothing was read, sent or written.
    Offline,
    Completed(CycleReport),
}

/// Polls `link` until it reports a connection, at most `max_attempts` times.
///
/// Returns the attempt on which the link came up.
pub fn wait_for_link<L, D>(
    link: &mut L,
    delay: &mut D,
    max_attempts: u32,
    retry_delay: Duration,
) -> Result<u32, StartupError>
where
    L: Connectivity,
    D: DelayNs,
{
    for attempt in 1..=max_attempts {
        if link.is_connected() {
            return Ok(attempt);
        }
        delay.delay_ms(millis(retry_delay));
        info!("Connecting to WiFi... ({}/{})", attempt, max_attempts);
    }

    error!("WiFi not connected after {} attempts", max_attempts);
    Err(StartupError::NetworkUnavailable {
        attempts: max_attempts,
    })
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// Owns every component for the lifetime of the process.
pub struct Monitor<T, M, S, H, L, D> {
    config: Config,
    sensors: SensorReader<T, M>,
    clock: ClockSync<S>,
    uploader: Uploader<H>,
    recorder: Recorder,
    link: L,
    delay: D,
    faults: FaultTracker,
    stats: CycleStats,
}

impl<T, M, S, H, L, D> Monitor<T, M, S, H, L, D>
where
    T: TemperatureProbe,
    M: MotionProbe,
    S: TimeSource,
    H: HttpTransport,
    L: Connectivity,
    D: DelayNs,
{
    /// Brings the monitor up: network, clock, motion baseline, storage, in that order.
    ///
    /// Any error is terminal; the caller decides how to park the device.
    pub fn boot(
        config: Config,
        components: Components<T, M, S, H, L, D>,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let Components {
            temperature,
            motion,
            time,
            transport,
            mut link,
            mut delay,
        } = components;

        let attempts = wait_for_link(
            &mut link,
            &mut delay,
            config.connect_max_attempts,
            config.connect_retry_delay,
        )?;
        info!("Connected to WiFi after {} attempt(s)", attempts);

        let mut clock = ClockSync::new(time, config.utc_offset_secs);
        clock.begin();

        let sensors = SensorReader::new(temperature, motion)?;

        let recorder = Recorder::open(&config.log_path).map_err(|e| {
            error!("Failed to initialize storage: {}", e);
            StartupError::StorageUnavailable(e)
        })?;

        info!("System ready!");

        Ok(Self {
            faults: FaultTracker::new(config.over_temperature_streak),
            uploader: Uploader::new(transport, config.endpoint.clone()),
            config,
            sensors,
            clock,
            recorder,
            link,
            delay,
            stats: CycleStats::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn baseline(&self) -> &Baseline {
        self.sensors.baseline()
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Runs the body of one iteration without the trailing delays.
    ///
    /// Failures are logged and counted, never returned.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.stats.cycles += 1;

        if !self.link.is_connected() {
            warn!("WiFi Disconnected!");
            self.stats.offline += 1;
            return CycleOutcome::Offline;
        }

        let timestamp = self.clock.current_time_string();
        let temperature = self.sensors.read_temperature();
        let vibration_high = match self.sensors.vibration_high(self.config.vibration_limit) {
            Ok(high) => high,
            Err(e) => {
                error!("{}", e);
                self.stats.sensor_errors += 1;
                false
            }
        };

        let reading = Reading::new(timestamp, temperature, vibration_high);
        if reading.has_sensor_error() {
            self.stats.sensor_errors += 1;
        }

        let uploaded = self.uploader.send(&reading).is_ok();
        if !uploaded {
            self.stats.uploads_failed += 1;
        }

        info!("{}", reading);

        let over_temperature = is_over_temperature(temperature, self.config.temperature_limit);
        if over_temperature {
            warn!(
                "Temperature {:.2} °C above limit of {:.2} °C",
                temperature, self.config.temperature_limit
            );
        }
        let alerts = self.faults.observe(over_temperature, vibration_high);

        let recorded = match self.recorder.append(&reading) {
            Ok(()) => true,
            Err(e) => {
                error!("Error opening file on storage: {}", e);
                self.stats.records_failed += 1;
                false
            }
        };

        debug!("{:?}", self.stats);

        CycleOutcome::Completed(CycleReport {
            reading,
            over_temperature,
            uploaded,
            recorded,
            alerts,
        })
    }

    /// One full iteration: the cycle, the short pause after a completed cycle and the loop delay.
    pub fn step(&mut self) -> CycleOutcome {
        let outcome = self.run_cycle();
        if let CycleOutcome::Completed(_) = outcome {
            self.delay.delay_ms(millis(self.config.post_upload_delay));
        }
        self.delay.delay_ms(millis(self.config.loop_delay));
        outcome
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }
}
