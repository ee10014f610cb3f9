//! Configuration for the visuomotor SOM engine.

use crate::error::{Result, VisMotorError};
use crate::som::{InitPolicy, Interval, NeighborhoodTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration: map shape, visual field lattice and step schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-cell SOM configuration.
    pub som: SomConfig,

    /// Visual field lattice configuration.
    pub field: FieldConfig,

    /// Learning step schedule.
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Self-Organizing Map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SomConfig {
    /// Number of neurons on the ring (K).
    /// Default: 2.
    pub neurons: usize,

    /// Input dimensionality (N), e.g. the number of arm joints learned.
    /// Default: 4.
    pub input_dim: usize,

    /// Random seed for weight initialization.
    /// Default: None (OS entropy).
    pub seed: Option<u64>,

    /// Neighborhood weight per ring distance.
    /// Default: [`NeighborhoodTable::corrected`].
    pub neighborhood: NeighborhoodTable,

    /// Initial weight policy.
    /// Default: [`InitPolicy::arm_four_joint`].
    pub init: InitPolicy,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            neurons: 2,
            input_dim: 4,
            seed: None,
            neighborhood: NeighborhoodTable::corrected(),
            init: InitPolicy::arm_four_joint(),
        }
    }
}

impl SomConfig {
    /// Creates a configuration with the given shape and defaults elsewhere.
    pub fn with_shape(neurons: usize, input_dim: usize) -> Self {
        Self {
            neurons,
            input_dim,
            ..Default::default()
        }
    }

    /// Checks the map shape.
    pub fn validate(&self) -> Result<()> {
        if self.neurons == 0 {
            return Err(VisMotorError::InvalidConfiguration(
                "neuron count must be greater than zero".to_string(),
            ));
        }
        if self.input_dim == 0 {
            return Err(VisMotorError::InvalidConfiguration(
                "input dimension must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upper bound on the number of cells in a visual field lattice.
pub const MAX_FIELD_CELLS: usize = 1 << 20;

/// Gaze-angle extent of the visual field, in degrees. Each interval is
/// half-open: `low` is inside the field, `high` is not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GazeBounds {
    /// Head azimuth (yaw).
    pub azimuth: Interval,
    /// Head elevation (pitch).
    pub elevation: Interval,
    /// Eye vergence.
    pub vergence: Interval,
}

impl Default for GazeBounds {
    fn default() -> Self {
        Self {
            azimuth: Interval::new(-80.0, 0.0),
            elevation: Interval::new(-80.0, 0.0),
            vergence: Interval::new(0.0, 20.0),
        }
    }
}

impl GazeBounds {
    /// Returns the axes in lattice order.
    pub fn axes(&self) -> [Interval; 3] {
        [self.azimuth, self.elevation, self.vergence]
    }
}

/// Visual field lattice configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Gaze extent covered by the lattice.
    pub gaze: GazeBounds,

    /// Lattice cells per degree of gaze angle.
    /// Default: 0.2.
    pub resolution: f64,

    /// Step multiplier for training the face-adjacent cells of the selected
    /// cell. `None` trains the selected cell only.
    /// Default: None.
    pub neighbor_spread: Option<f64>,

    /// Per-joint limits checked on recalled commands. Joints past the end of
    /// the list are unchecked.
    /// Default: the four-joint arm limits.
    pub joint_limits: Option<Vec<Interval>>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            gaze: GazeBounds::default(),
            resolution: 0.2,
            neighbor_spread: None,
            joint_limits: Some(vec![
                Interval::new(-60.0, 0.0),
                Interval::new(0.0, 100.0),
                Interval::new(-35.0, 60.0),
                Interval::new(10.0, 100.0),
            ]),
        }
    }
}

impl FieldConfig {
    /// Number of lattice cells along each axis.
    pub fn shape(&self) -> [usize; 3] {
        self.gaze.axes().map(|axis| {
            let extent = ((axis.high - axis.low) * self.resolution).floor();
            if extent.is_finite() && extent > 0.0 {
                extent as usize
            } else {
                0
            }
        })
    }

    /// Total number of lattice cells, saturating at `usize::MAX`.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.shape()
            .iter()
            .fold(1usize, |total, &n| total.saturating_mul(n))
    }

    /// Checks resolution, extents and spread factor.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(VisMotorError::InvalidConfiguration(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if let Some(axis) = self.shape().iter().position(|&n| n == 0) {
            return Err(VisMotorError::InvalidConfiguration(format!(
                "gaze axis {} spans no lattice cells",
                axis
            )));
        }
        let total = self
            .shape()
            .iter()
            .try_fold(1usize, |total, &n| total.checked_mul(n));
        match total {
            Some(total) if total <= MAX_FIELD_CELLS => {}
            _ => {
                return Err(VisMotorError::InvalidConfiguration(format!(
                    "lattice {:?} exceeds {} cells",
                    self.shape(),
                    MAX_FIELD_CELLS
                )))
            }
        }
        if let Some(factor) = self.neighbor_spread {
            if !(factor.is_finite() && factor >= 0.0) {
                return Err(VisMotorError::InvalidConfiguration(format!(
                    "neighbor spread must be non-negative, got {}",
                    factor
                )));
            }
        }
        if let Some(limits) = &self.joint_limits {
            for limit in limits {
                limit.validate()?;
            }
        }
        Ok(())
    }
}

/// Step-size schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Step size for the first sample.
    /// Default: 0.5.
    pub initial_step: f64,

    /// Decay horizon, in multiples of (cells x neurons) samples.
    /// Default: 5.0.
    pub horizon_factor: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            initial_step: 0.5,
            horizon_factor: 5.0,
        }
    }
}

impl ScheduleConfig {
    /// Checks that the schedule yields positive step sizes.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(VisMotorError::InvalidConfiguration(format!(
                "initial step must be positive, got {}",
                self.initial_step
            )));
        }
        if !(self.horizon_factor.is_finite() && self.horizon_factor >= 0.0) {
            return Err(VisMotorError::InvalidConfiguration(format!(
                "horizon factor must be non-negative, got {}",
                self.horizon_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.som.neurons, 2);
        assert_eq!(config.som.input_dim, 4);
        assert_eq!(config.field.shape(), [16, 16, 4]);
        assert_eq!(config.field.total_cells(), 1024);
        assert!((config.schedule.initial_step - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_som_config_validation() {
        assert!(SomConfig::with_shape(3, 2).validate().is_ok());
        assert!(matches!(
            SomConfig::with_shape(0, 2).validate(),
            Err(VisMotorError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SomConfig::with_shape(3, 0).validate(),
            Err(VisMotorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_field_config_rejects_empty_axis() {
        let mut config = FieldConfig::default();
        config.resolution = 0.01;
        config.gaze.vergence = Interval::new(0.0, 20.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_field_config_rejects_oversized_lattice() {
        let config = Config::from_json_str(r#"{ "field": { "resolution": 1e7 } }"#).unwrap();
        assert_eq!(config.field.total_cells(), usize::MAX);
        assert!(matches!(
            config.field.validate(),
            Err(VisMotorError::InvalidConfiguration(_))
        ));

        let mut config = FieldConfig::default();
        config.resolution = 20.0;
        assert!(config.total_cells() > MAX_FIELD_CELLS);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_schedule_validation() {
        assert!(ScheduleConfig::default().validate().is_ok());
        let config = ScheduleConfig {
            initial_step: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json_str(r#"{ "som": { "neurons": 5, "seed": 7 } }"#).unwrap();
        assert_eq!(config.som.neurons, 5);
        assert_eq!(config.som.input_dim, 4);
        assert_eq!(config.som.seed, Some(7));
        assert!((config.field.resolution - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_json_roundtrip_keeps_tables() {
        let mut config = Config::default();
        config.som.neighborhood = NeighborhoodTable::repulsive();
        let json = config.to_json_pretty().unwrap();
        let back = Config::from_json_str(&json).unwrap();
        assert_eq!(back.som.neighborhood, NeighborhoodTable::repulsive());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            Config::from_json_str("{ not json"),
            Err(VisMotorError::Config(_))
        ));
    }
}
