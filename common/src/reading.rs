use core::fmt::Display;

/// Temperature reported when the probe could not deliver a valid value.
pub const TEMPERATURE_SENTINEL: f32 = -1000.0;

/// One sample of the monitored part, taken once per cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    timestamp: String,
    temperature: f32,
    vibration_high: bool,
}

impl Reading {
    pub fn new(timestamp: impl Into<String>, temperature: f32, vibration_high: bool) -> Self {
        Self {
            timestamp: timestamp.into(),
            temperature,
            vibration_high,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Temperature in °C, or [`TEMPERATURE_SENTINEL`].
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn vibration_high(&self) -> bool {
        self.vibration_high
    }

    pub fn has_sensor_error(&self) -> bool {
        self.temperature == TEMPERATURE_SENTINEL
    }

    /// Vibration label sent to the spreadsheet.
    pub fn vibration_label(&self) -> &'static str {
        if self.vibration_high {
            "HIGH"
        } else {
            "NORMAL"
        }
    }

    /// Vibration label written to the local log.
    pub fn record_label(&self) -> &'static str {
        if self.vibration_high {
            "HIGH VIBRATION"
        } else {
            "NORMAL"
        }
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Time: {} | Temperature: {:.2} °C | Vibration: {}",
            self.timestamp,
            self.temperature,
            self.vibration_label()
        )
    }
}

#[test]
fn test_reading_labels() {
    let calm = Reading::new("12:00:00", 25.5, false);
    assert_eq!(calm.vibration_label(), "NORMAL");
    assert_eq!(calm.record_label(), "NORMAL");
    assert!(!calm.has_sensor_error());

    let shaking = Reading::new("12:00:01", TEMPERATURE_SENTINEL, true);
    assert_eq!(shaking.vibration_label(), "HIGH");
    assert_eq!(shaking.record_label(), "HIGH VIBRATION");
    assert!(shaking.has_sensor_error());
    assert_eq!(
        shaking.to_string(),
        "Time: 12:00:01 | Temperature: -1000.00 °C | Vibration: HIGH"
    );
}
