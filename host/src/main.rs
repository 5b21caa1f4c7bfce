//! Desktop build of the part monitor: simulated probes, real clock, real upload, local CSV log.

mod http;
mod sim;

use log::info;
use part_monitor_common::{Components, Config, Monitor, SystemClock};

use crate::http::UreqTransport;
use crate::sim::{ResolverLink, SimulatedAccelerometer, SimulatedThermometer, StdDelay};

/// A minimal main function that boots the monitor and runs it forever.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::default();
    info!("Posting readings to {}", config.endpoint);
    info!("Appending readings to {}", config.log_path.display());

    let seed = option_env!("PART_MONITOR_SEED").and_then(|seed| seed.parse().ok());

    let components = Components {
        temperature: SimulatedThermometer::new(sim::rng(seed, 0)),
        motion: SimulatedAccelerometer::new(sim::rng(seed, 1)),
        time: SystemClock,
        transport: UreqTransport::new(),
        link: ResolverLink::for_endpoint(&config.endpoint)?,
        delay: StdDelay,
    };

    let mut monitor = Monitor::boot(config, components)?;
    monitor.run()
}
