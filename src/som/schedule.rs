//! Step-size schedule for online training.

use crate::config::ScheduleConfig;

/// Exponentially decaying step size.
///
/// `step(t) = initial * exp(-t / (horizon_factor * cells * neurons))`, so the
/// decay horizon scales with the number of weight vectors being trained.
#[derive(Debug, Clone)]
pub struct StepSchedule {
    initial: f64,
    horizon: f64,
}

impl StepSchedule {
    /// Creates a schedule for a field of `cells` maps with `neurons` each.
    pub fn new(config: &ScheduleConfig, cells: usize, neurons: usize) -> Self {
        let horizon = config.horizon_factor * (cells * neurons) as f64;
        Self {
            initial: config.initial_step,
            horizon,
        }
    }

    /// Step size after `count` samples.
    #[inline]
    pub fn step(&self, count: usize) -> f64 {
        if self.horizon > 0.0 {
            self.initial * (-(count as f64) / self.horizon).exp()
        } else {
            self.initial
        }
    }

    /// Step size for the first sample.
    #[inline]
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Samples needed for the step to fall by a factor of e.
    #[inline]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }
}
