use log::error;

use crate::reading::TEMPERATURE_SENTINEL;
use crate::sensor::{Baseline, MotionSample};

/// True when any acceleration axis deviates from the baseline by strictly more than `limit`.
///
/// The angular-rate axes are not evaluated.
pub fn is_vibration_high(sample: &MotionSample, baseline: &Baseline, limit: f32) -> bool {
    let deviations = [
        (f32::from(sample.ax) - baseline.ax0).abs(),
        (f32::from(sample.ay) - baseline.ay0).abs(),
        (f32::from(sample.az) - baseline.az0).abs(),
    ];
    deviations.iter().any(|deviation| *deviation > limit)
}

/// True for a valid temperature strictly above `limit`. The sentinel never counts.
pub fn is_over_temperature(temperature: f32, limit: f32) -> bool {
    temperature != TEMPERATURE_SENTINEL && temperature > limit
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    OverTemperature,
    Vibration,
}

/// Raised when a fault persisted for a full streak of cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alert {
    pub fault: Fault,
    pub streak: u32,
}

/// Counts consecutive faulty cycles per fault kind.
#[derive(Clone, Debug)]
pub struct FaultTracker {
    threshold: u32,
    over_temperature: u32,
    vibration: u32,
}

impl FaultTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            over_temperature: 0,
            vibration: 0,
        }
    }

    /// Feeds the fault flags of one cycle and returns the alerts it raised.
    pub fn observe(&mut self, over_temperature: bool, vibration_high: bool) -> Vec<Alert> {
        let threshold = self.threshold;
        [
            (Fault::OverTemperature, over_temperature, &mut self.over_temperature),
            (Fault::Vibration, vibration_high, &mut self.vibration),
        ]
        .into_iter()
        .filter_map(|(fault, active, streak)| {
            if !active {
                *streak = 0;
                return None;
            }
            *streak += 1;
            if *streak < threshold {
                return None;
            }
            *streak = 0;
            error!("ALERT: {:?} for {} consecutive cycles", fault, threshold);
            Some(Alert {
                fault,
                streak: threshold,
            })
        })
        .collect()
    }
}
