//! Initial weight policies.

use crate::error::{Result, VisMotorError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A closed numeric interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub low: f64,
    /// Upper bound.
    pub high: f64,
}

impl Interval {
    /// Creates a new interval.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// The unit interval, used for dimensions without an explicit range.
    pub const fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Returns true if `value` lies within the closed interval.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Checks that both bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(VisMotorError::InvalidConfiguration(format!(
                "interval bounds must be finite, got [{}, {}]",
                self.low, self.high
            )));
        }
        if self.low > self.high {
            return Err(VisMotorError::InvalidConfiguration(format!(
                "interval is inverted: [{}, {}]",
                self.low, self.high
            )));
        }
        Ok(())
    }

    /// Draws a uniform sample from the interval.
    #[inline]
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.low + (self.high - self.low) * rng.gen::<f64>()
    }
}

/// How a map's weights are set at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitPolicy {
    /// Uniform draws per dimension index. Dimensions past the end of
    /// `ranges` draw from `[0, 1]`; ranges past the input dimension are
    /// ignored.
    Uniform {
        /// Range for each leading dimension.
        ranges: Vec<Interval>,
    },
    /// Exact values, one row per neuron.
    Explicit {
        /// K rows of N weights.
        weights: Vec<Vec<f64>>,
    },
}

impl Default for InitPolicy {
    fn default() -> Self {
        Self::arm_four_joint()
    }
}

impl InitPolicy {
    /// Uniform `[0, 1]` in every dimension.
    pub fn unit() -> Self {
        InitPolicy::Uniform { ranges: Vec::new() }
    }

    /// Safe starting postures for a three-joint shoulder/elbow arm, in degrees.
    pub fn arm_three_joint() -> Self {
        InitPolicy::Uniform {
            ranges: vec![
                Interval::new(-95.0, -60.0),
                Interval::new(10.0, 100.0),
                Interval::new(10.0, 100.0),
            ],
        }
    }

    /// Safe starting postures for a four-joint shoulder/elbow arm, in degrees.
    pub fn arm_four_joint() -> Self {
        InitPolicy::Uniform {
            ranges: vec![
                Interval::new(-60.0, 0.0),
                Interval::new(0.0, 90.0),
                Interval::new(-35.0, 60.0),
                Interval::new(10.0, 100.0),
            ],
        }
    }

    /// Checks the policy against a map shape.
    pub fn validate(&self, neurons: usize, input_dim: usize) -> Result<()> {
        match self {
            InitPolicy::Uniform { ranges } => {
                for range in ranges.iter().take(input_dim) {
                    range.validate()?;
                }
                Ok(())
            }
            InitPolicy::Explicit { weights } => {
                if weights.len() != neurons {
                    return Err(VisMotorError::InvalidConfiguration(format!(
                        "explicit weights have {} rows, expected {}",
                        weights.len(),
                        neurons
                    )));
                }
                let bad_row = weights
                    .iter()
                    .enumerate()
                    .find(|(_, r)| r.len() != input_dim);
                if let Some((i, row)) = bad_row {
                    return Err(VisMotorError::InvalidConfiguration(format!(
                        "explicit weight row {} has {} columns, expected {}",
                        i,
                        row.len(),
                        input_dim
                    )));
                }
                Ok(())
            }
        }
    }

    /// Produces a row-major `neurons x input_dim` weight buffer.
    pub fn initial_weights<R: Rng>(
        &self,
        neurons: usize,
        input_dim: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        self.validate(neurons, input_dim)?;

        let weights = match self {
            InitPolicy::Uniform { ranges } => {
                let mut weights = Vec::with_capacity(neurons * input_dim);
                for _ in 0..neurons {
                    for j in 0..input_dim {
                        let range = ranges.get(j).copied().unwrap_or_else(Interval::unit);
                        weights.push(range.sample(rng));
                    }
                }
                weights
            }
            InitPolicy::Explicit { weights } => weights.concat(),
        };

        Ok(weights)
    }
}
