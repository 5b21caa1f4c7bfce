//! Platform-agnostic core of the part monitor.
//!
//! Everything that touches hardware or the network sits behind a small trait so the whole
//! sense, format, transmit and persist loop runs unchanged on the ESP32 and on the desktop.

pub mod clock;
pub mod config;
pub mod error;
pub mod monitor;
pub mod reading;
pub mod recorder;
pub mod sensor;
pub mod threshold;
pub mod uploader;

pub use clock::{ClockSync, SystemClock, TimeSource};
pub use config::Config;
pub use error::{
    ClockError, ConfigError, RecorderError, SensorError, StartupError, TransportError,
    UploadError,
};
pub use monitor::{Components, Connectivity, CycleOutcome, CycleReport, CycleStats, Monitor};
pub use reading::{Reading, TEMPERATURE_SENTINEL};
pub use recorder::Recorder;
pub use sensor::{Baseline, MotionProbe, MotionSample, SensorReader, TemperatureProbe};
pub use threshold::{Alert, Fault, FaultTracker};
pub use uploader::{HttpResponse, HttpTransport, Payload, Uploader};
