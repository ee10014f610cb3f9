//! Reach command recall from a trained field.

use super::{CellIndex, VisuomotorField};
use crate::error::{Result, VisMotorError};

/// Sharpness of the basin used to score neurons against the current posture.
pub const BASIN_BETA: f64 = 1e-7;

/// Gaussian basin `exp(-beta * x^2)`.
#[inline]
pub fn basin(beta: f64, x: f64) -> f64 {
    (-beta * x * x).exp()
}

/// A posture recalled for a gaze target.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachCommand {
    /// Cell the target fell into.
    pub cell: CellIndex,
    /// Neuron whose weights were chosen.
    pub neuron: usize,
    /// Joint targets (the chosen neuron's weights).
    pub command: Vec<f64>,
    /// Normalized score of every neuron in the cell.
    pub scores: Vec<f64>,
}

impl VisuomotorField {
    /// Recalls a reach posture for a gaze target.
    ///
    /// Each neuron of the target's cell is scored by a basin of its squared
    /// distance to `current_posture`, normalized by the summed score of the
    /// other neurons; the best-scoring neuron's weights become the command.
    /// The command is checked against the configured joint limits.
    pub fn recall(&self, gaze: &[f64], current_posture: &[f64]) -> Result<ReachCommand> {
        if current_posture.len() != self.posture_dim() {
            return Err(VisMotorError::dimension(
                self.posture_dim(),
                current_posture.len(),
            ));
        }
        let cell = self
            .cell_for(gaze)?
            .ok_or_else(|| VisMotorError::GazeOutOfRange(format!("{:?}", gaze)))?;
        let som = self.cell(cell).ok_or(VisMotorError::IndexOutOfRange {
            index: self.to_linear(cell),
            max: self.total_cells(),
        })?;

        let raw = (0..som.neurons())
            .map(|k| Ok(basin(BASIN_BETA, som.distance_squared(k, current_posture)?)))
            .collect::<Result<Vec<f64>>>()?;
        let total: f64 = raw.iter().sum();
        let scores: Vec<f64> = raw
            .iter()
            .map(|&s| {
                let others = total - s;
                if others > 0.0 {
                    s / others
                } else if s > 0.0 {
                    f64::INFINITY
                } else {
                    0.0
                }
            })
            .collect();

        let mut neuron = 0;
        for (k, &score) in scores.iter().enumerate() {
            if score > scores[neuron] {
                neuron = k;
            }
        }

        let command = som
            .weights_of(neuron)
            .map(<[f64]>::to_vec)
            .unwrap_or_default();

        if let Some(limits) = &self.config.joint_limits {
            for (joint, (&value, limit)) in command.iter().zip(limits).enumerate() {
                if !limit.contains(value) {
                    return Err(VisMotorError::UnsafeCommand {
                        joint,
                        value,
                        low: limit.low,
                        high: limit.high,
                    });
                }
            }
        }

        Ok(ReachCommand {
            cell,
            neuron,
            command,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SomConfig};
    use crate::som::{InitPolicy, Interval, NeighborhoodTable};

    fn field_with(rows: Vec<Vec<f64>>, limits: Option<Vec<Interval>>) -> VisuomotorField {
        let mut config = Config::default();
        config.som = SomConfig {
            neurons: rows.len(),
            input_dim: rows[0].len(),
            seed: Some(5),
            neighborhood: NeighborhoodTable::corrected(),
            init: InitPolicy::Explicit { weights: rows },
        };
        config.field.resolution = 0.05;
        config.field.joint_limits = limits;
        VisuomotorField::new(&config).unwrap()
    }

    #[test]
    fn test_basin() {
        assert_eq!(basin(1.0, 0.0), 1.0);
        assert!((basin(1.0, 1.0) - (-1.0f64).exp()).abs() < 1e-12);
        assert!(basin(BASIN_BETA, 10.0) > basin(BASIN_BETA, 100.0));
    }

    #[test]
    fn test_recall_picks_nearest_neuron() {
        let field = field_with(vec![vec![-30.0, 20.0], vec![-10.0, 80.0]], None);
        let near_second = field.recall(&[-40.0, -40.0, 10.0], &[-12.0, 75.0]).unwrap();
        assert_eq!(near_second.neuron, 1);
        assert_eq!(near_second.command, vec![-10.0, 80.0]);
        assert_eq!(near_second.scores.len(), 2);

        let near_first = field.recall(&[-40.0, -40.0, 10.0], &[-31.0, 22.0]).unwrap();
        assert_eq!(near_first.neuron, 0);
    }

    #[test]
    fn test_recall_gaze_out_of_range() {
        let field = field_with(vec![vec![-30.0, 20.0], vec![-10.0, 80.0]], None);
        assert!(matches!(
            field.recall(&[10.0, -40.0, 10.0], &[0.0, 0.0]),
            Err(VisMotorError::GazeOutOfRange(_))
        ));
    }

    #[test]
    fn test_recall_checks_limits() {
        let limits = vec![Interval::new(-60.0, 0.0), Interval::new(0.0, 50.0)];
        let field = field_with(vec![vec![-30.0, 20.0], vec![-10.0, 80.0]], Some(limits));
        assert!(field.recall(&[-40.0, -40.0, 10.0], &[-31.0, 22.0]).is_ok());
        assert!(matches!(
            field.recall(&[-40.0, -40.0, 10.0], &[-10.0, 80.0]),
            Err(VisMotorError::UnsafeCommand { joint: 1, .. })
        ));
    }

    #[test]
    fn test_recall_single_neuron() {
        let field = field_with(vec![vec![-5.0, 5.0]], None);
        let reach = field.recall(&[-1.0, -1.0, 1.0], &[-50.0, 50.0]).unwrap();
        assert_eq!(reach.neuron, 0);
        assert_eq!(reach.command, vec![-5.0, 5.0]);
    }
}
