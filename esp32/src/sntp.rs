use chrono::{DateTime, Utc};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use part_monitor_common::{ClockError, TimeSource};

/// System time kept in sync by the SNTP service in the background.
pub struct SntpTime {
    sntp: EspSntp<'static>,
    synced: bool,
}

impl SntpTime {
    const POLLS: u32 = 20;
    const POLL_MS: u32 = 100;

    pub fn start() -> anyhow::Result<Self> {
        Ok(Self {
            sntp: EspSntp::new_default()?,
            synced: false,
        })
    }
}

impl TimeSource for SntpTime {
    /// Waits up to two seconds for the first synchronisation, then always succeeds.
    fn sync(&mut self) -> Result<(), ClockError> {
        if self.synced {
            return Ok(());
        }
        for _ in 0..Self::POLLS {
            if self.sntp.get_sync_status() == SyncStatus::Completed {
                self.synced = true;
                return Ok(());
            }
            FreeRtos::delay_ms(Self::POLL_MS);
        }
        Err(ClockError::NotSynchronized)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
