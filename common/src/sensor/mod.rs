pub mod dht22;
pub mod mpu6050;

use log::{error, info};

use crate::error::{SensorError, StartupError};
use crate::reading::TEMPERATURE_SENTINEL;
use crate::threshold::is_vibration_high;

/// A probe delivering the part temperature in °C.
pub trait TemperatureProbe {
    type Error: core::fmt::Debug;

    /// Reads the temperature. A NaN result is treated like an error by [`SensorReader`].
    fn read_celsius(&mut self) -> Result<f32, Self::Error>;
}

/// A 6-axis motion probe (accelerometer plus gyroscope).
pub trait MotionProbe {
    type Error: core::fmt::Debug;

    /// Checks once whether the probe answers on its bus.
    fn test_connection(&mut self) -> bool;

    fn read_motion(&mut self) -> Result<MotionSample, Self::Error>;
}

/// Raw 6-axis sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

/// Acceleration at power-on, the zero reference for vibration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Baseline {
    pub ax0: f32,
    pub ay0: f32,
    pub az0: f32,
}

impl From<&MotionSample> for Baseline {
    fn from(sample: &MotionSample) -> Self {
        Self {
            ax0: sample.ax.into(),
            ay0: sample.ay.into(),
            az0: sample.az.into(),
        }
    }
}

/// Owns both probes and the baseline captured when it was created.
pub struct SensorReader<T, M> {
    temperature: T,
    motion: M,
    baseline: Baseline,
}

impl<T: TemperatureProbe, M: MotionProbe> SensorReader<T, M> {
    /// Checks the motion probe and captures the baseline from its first sample.
    pub fn new(temperature: T, mut motion: M) -> Result<Self, StartupError> {
        if !motion.test_connection() {
            error!("Failed to connect to the motion sensor");
            return Err(StartupError::MotionSensorMissing);
        }

        let first = motion
            .read_motion()
            .map_err(|e| StartupError::Baseline(SensorError::Motion(format!("{:?}", e))))?;
        let baseline = Baseline::from(&first);
        info!(
            "Motion baseline: ax0={} ay0={} az0={}",
            baseline.ax0, baseline.ay0, baseline.az0
        );

        Ok(Self {
            temperature,
            motion,
            baseline,
        })
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Reads the temperature, falling back to [`TEMPERATURE_SENTINEL`] on any failure.
    pub fn read_temperature(&mut self) -> f32 {
        match self.temperature.read_celsius() {
            Ok(celsius) if !celsius.is_nan() => celsius,
            Ok(_) => {
                error!("Error reading temperature probe: not a number");
                TEMPERATURE_SENTINEL
            }
            Err(e) => {
                error!("Error reading temperature probe: {:?}", e);
                TEMPERATURE_SENTINEL
            }
        }
    }

    pub fn read_motion(&mut self) -> Result<MotionSample, SensorError> {
        self.motion
            .read_motion()
            .map_err(|e| SensorError::Motion(format!("{:?}", e)))
    }

    /// Samples the motion probe and compares it against the baseline.
    pub fn vibration_high(&mut self, limit: f32) -> Result<bool, SensorError> {
        let sample = self.read_motion()?;
        Ok(is_vibration_high(&sample, &self.baseline, limit))
    }
}
