//! Simulated probes and platform glue for running the monitor on a desktop.

use std::convert::Infallible;
use std::net::ToSocketAddrs;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use part_monitor_common::{Connectivity, MotionProbe, MotionSample, TemperatureProbe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Part temperature between 50 and 65 °C with the odd 35 °C spike.
pub struct SimulatedThermometer {
    rng: StdRng,
}

impl SimulatedThermometer {
    const SPIKE_PROBABILITY: f64 = 0.1;
    const FAILURE_PROBABILITY: f64 = 0.02;

    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl TemperatureProbe for SimulatedThermometer {
    type Error = Infallible;

    fn read_celsius(&mut self) -> Result<f32, Self::Error> {
        if self.rng.gen_bool(Self::FAILURE_PROBABILITY) {
            return Ok(f32::NAN);
        }
        let base: f32 = self.rng.gen_range(50.0..65.0);
        let spike: f32 = if self.rng.gen_bool(Self::SPIKE_PROBABILITY) {
            35.0
        } else {
            0.0
        };
        Ok(base + spike)
    }
}

/// Accelerometer lying flat (1 g on Z) with sensor noise and occasional shakes.
pub struct SimulatedAccelerometer {
    rng: StdRng,
}

impl SimulatedAccelerometer {
    const ONE_G: i16 = 16384;
    const NOISE: i16 = 300;
    const SHAKE_PROBABILITY: f64 = 0.05;

    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    fn jitter(&mut self) -> i16 {
        self.rng.gen_range(-Self::NOISE..=Self::NOISE)
    }
}

impl MotionProbe for SimulatedAccelerometer {
    type Error = Infallible;

    fn test_connection(&mut self) -> bool {
        true
    }

    fn read_motion(&mut self) -> Result<MotionSample, Self::Error> {
        let mut sample = MotionSample {
            ax: self.jitter(),
            ay: self.jitter(),
            az: Self::ONE_G + self.jitter(),
            gx: self.jitter(),
            gy: self.jitter(),
            gz: self.jitter(),
        };
        if self.rng.gen_bool(Self::SHAKE_PROBABILITY) {
            let shake: i16 = self.rng.gen_range(2500..4000);
            sample.ax = sample.ax.saturating_add(shake);
        }
        Ok(sample)
    }
}

/// Considers the network up while the endpoint's host name resolves.
pub struct ResolverLink {
    address: String,
}

impl ResolverLink {
    pub fn for_endpoint(endpoint: &str) -> anyhow::Result<Self> {
        let (default_port, rest) = if let Some(rest) = endpoint.strip_prefix("https://") {
            (443, rest)
        } else if let Some(rest) = endpoint.strip_prefix("http://") {
            (80, rest)
        } else {
            anyhow::bail!("Unsupported endpoint scheme: {}", endpoint);
        };

        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            anyhow::bail!("Endpoint has no host: {}", endpoint);
        }
        let address = if authority.contains(':') {
            authority.to_string()
        } else {
            format!("{}:{}", authority, default_port)
        };

        Ok(Self { address })
    }
}

impl Connectivity for ResolverLink {
    fn is_connected(&mut self) -> bool {
        self.address
            .to_socket_addrs()
            .map(|mut addresses| addresses.next().is_some())
            .unwrap_or(false)
    }
}

/// Blocking delay on the current thread.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }
}

/// Seeded generators keep a simulation reproducible when `PART_MONITOR_SEED` is set.
pub fn rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_address() {
        let link =
            ResolverLink::for_endpoint("https://script.google.com/macros/s/abc/exec").unwrap();
        assert_eq!(link.address, "script.google.com:443");

        let link = ResolverLink::for_endpoint("http://localhost:8080/append").unwrap();
        assert_eq!(link.address, "localhost:8080");

        assert!(ResolverLink::for_endpoint("ftp://example.com").is_err());
    }

    #[test]
    fn simulated_temperature_stays_in_range() {
        let mut thermometer = SimulatedThermometer::new(rng(Some(7), 0));
        for _ in 0..200 {
            let celsius = thermometer.read_celsius().unwrap();
            assert!(celsius.is_nan() || (50.0..100.0).contains(&celsius));
        }
    }

    #[test]
    fn simulated_motion_rests_near_one_g() {
        let mut accelerometer = SimulatedAccelerometer::new(rng(Some(7), 1));
        for _ in 0..200 {
            let sample = accelerometer.read_motion().unwrap();
            assert!(
                (sample.az - SimulatedAccelerometer::ONE_G).abs() <= SimulatedAccelerometer::NOISE
            );
            assert!(sample.ay.abs() <= SimulatedAccelerometer::NOISE);
        }
    }
}
