use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Spreadsheet script that receives the readings.
pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbzDBpGLNFldK01ENAk_Ju5Hb2rvptrOz55I9MNBPGBu5BxYO5PiI-ZNcMkWyPlDp3P9Iw/exec";

pub const DEFAULT_SSID: &str = "Wokwi-GUEST";
pub const DEFAULT_PASSWORD: &str = "";

/// Maximum acceptable part temperature in °C.
pub const TEMPERATURE_LIMIT: f32 = 60.0;

/// Raw accelerometer deviation from the baseline that counts as strong vibration.
pub const VIBRATION_LIMIT: f32 = 2000.0;

/// Build-time configuration of the monitor.
///
/// `WIFI_SSID`, `WIFI_PASS` and `PART_MONITOR_ENDPOINT` may be set in the build environment to
/// replace the defaults. Nothing here changes after the binary is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub endpoint: String,

    /// Offset applied to the synchronised UTC time before formatting.
    pub utc_offset_secs: i32,

    pub temperature_limit: f32,
    pub vibration_limit: f32,

    /// Number of consecutive faulty cycles that raise an alert.
    pub over_temperature_streak: u32,

    /// Delay at the end of every iteration, connected or not.
    pub loop_delay: Duration,
    /// Extra delay after a completed cycle.
    pub post_upload_delay: Duration,

    pub connect_retry_delay: Duration,
    pub connect_max_attempts: u32,

    /// CSV file the readings are appended to.
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wifi_ssid: option_env!("WIFI_SSID").unwrap_or(DEFAULT_SSID).into(),
            wifi_password: option_env!("WIFI_PASS").unwrap_or(DEFAULT_PASSWORD).into(),
            endpoint: option_env!("PART_MONITOR_ENDPOINT")
                .unwrap_or(DEFAULT_ENDPOINT)
                .into(),
            utc_offset_secs: 0,
            temperature_limit: TEMPERATURE_LIMIT,
            vibration_limit: VIBRATION_LIMIT,
            over_temperature_streak: 3,
            loop_delay: Duration::from_millis(1000),
            post_upload_delay: Duration::from_millis(500),
            connect_retry_delay: Duration::from_millis(1000),
            connect_max_attempts: 30,
            log_path: PathBuf::from("data.csv"),
        }
    }
}

impl Config {
    /// Checks the values the monitor relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if !self.temperature_limit.is_finite() {
            return Err(ConfigError::InvalidLimit {
                name: "temperature_limit",
                value: self.temperature_limit,
            });
        }
        if !self.vibration_limit.is_finite() || self.vibration_limit <= 0.0 {
            return Err(ConfigError::InvalidLimit {
                name: "vibration_limit",
                value: self.vibration_limit,
            });
        }
        if self.connect_max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.over_temperature_streak == 0 {
            return Err(ConfigError::ZeroStreak);
        }
        Ok(())
    }
}
