use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::{info, warn};

use crate::error::ClockError;

/// Wall-clock source, usually backed by a network time client.
pub trait TimeSource {
    /// Asks the source to refresh itself. Sources that synchronise in the background just
    /// report whether they have done so.
    fn sync(&mut self) -> Result<(), ClockError>;

    /// Current UTC time as the source knows it.
    fn now(&self) -> DateTime<Utc>;
}

/// The host clock, already kept in sync by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn sync(&mut self) -> Result<(), ClockError> {
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Produces the `HH:MM:SS` timestamps attached to every reading.
pub struct ClockSync<S> {
    source: S,
    offset: FixedOffset,
}

impl<S: TimeSource> ClockSync<S> {
    pub const FORMAT: &'static str = "%H:%M:%S";

    pub fn new(source: S, utc_offset_secs: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| {
            warn!("Invalid UTC offset {}s, using UTC", utc_offset_secs);
            Utc.fix()
        });
        Self { source, offset }
    }

    /// First synchronisation at boot. A failure is not fatal.
    pub fn begin(&mut self) {
        match self.source.sync() {
            Ok(()) => info!("Clock synchronised: {}", self.source.now()),
            Err(e) => warn!("Clock not synchronised yet: {}", e),
        }
    }

    /// Refreshes the source and formats the current time.
    ///
    /// When the refresh fails the last synchronised clock keeps running and is used as is.
    pub fn current_time_string(&mut self) -> String {
        if let Err(e) = self.source.sync() {
            warn!("Time update failed: {}", e);
        }
        self.source
            .now()
            .with_timezone(&self.offset)
            .format(Self::FORMAT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FrozenTime {
        at: DateTime<Utc>,
        reachable: bool,
        syncs: u32,
    }

    impl TimeSource for FrozenTime {
        fn sync(&mut self) -> Result<(), ClockError> {
            self.syncs += 1;
            if self.reachable {
                Ok(())
            } else {
                Err(ClockError::Unreachable("pool.ntp.org".into()))
            }
        }

        fn now(&self) -> DateTime<Utc> {
            self.at
        }
    }

    fn frozen(reachable: bool) -> FrozenTime {
        FrozenTime {
            at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            reachable,
            syncs: 0,
        }
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        let mut clock = ClockSync::new(frozen(true), 0);
        assert_eq!(clock.current_time_string(), "09:26:53");
        assert_eq!(clock.source.syncs, 1);
    }

    #[test]
    fn applies_offset() {
        let mut clock = ClockSync::new(frozen(true), -3 * 3600);
        assert_eq!(clock.current_time_string(), "06:26:53");
    }

    #[test]
    fn unreachable_source_still_yields_time() {
        let mut clock = ClockSync::new(frozen(false), 0);
        clock.begin();
        assert_eq!(clock.current_time_string(), "09:26:53");
        assert_eq!(clock.source.syncs, 2);
    }
}
