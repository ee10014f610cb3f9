//! Ring Self-Organizing Map engine.

use crate::config::SomConfig;
use crate::error::{Result, VisMotorError};
use crate::som::{ring_distance, NeighborhoodTable};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A Self-Organizing Map whose neurons sit on a 1-D ring.
///
/// Each of the `K` neurons owns a weight vector of length `N`. Activation is
/// the plain inner product of a neuron's weights with the input; the neuron
/// with the largest activation wins, and every neuron then moves toward the
/// input in proportion to its neighborhood weight relative to the winner.
///
/// Weights live in one contiguous row-major buffer of `K * N` values.
#[derive(Debug, Clone)]
pub struct SomEngine {
    neurons: usize,
    input_dim: usize,
    weights: Vec<f64>,
    activation: Vec<f64>,
    table: NeighborhoodTable,
}

impl SomEngine {
    /// Creates a map from its configuration.
    ///
    /// Uses a ChaCha generator seeded from `config.seed`, or from OS entropy
    /// when no seed is given.
    pub fn new(config: &SomConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Creates a map, drawing initial weights from the supplied generator.
    pub fn with_rng<R: Rng>(config: &SomConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        if !config.neighborhood.is_finite() {
            return Err(VisMotorError::InvalidConfiguration(
                "neighborhood table entries must be finite".to_string(),
            ));
        }

        let weights = config
            .init
            .initial_weights(config.neurons, config.input_dim, rng)?;

        Ok(Self {
            neurons: config.neurons,
            input_dim: config.input_dim,
            weights,
            activation: vec![0.0; config.neurons],
            table: config.neighborhood,
        })
    }

    /// Number of neurons on the ring (K).
    #[inline]
    pub fn neurons(&self) -> usize {
        self.neurons
    }

    /// Input dimensionality (N).
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// The neighborhood table in use.
    #[inline]
    pub fn neighborhood_table(&self) -> &NeighborhoodTable {
        &self.table
    }

    /// Activations from the most recent [`activate`](Self::activate) or
    /// [`learn`](Self::learn) call. All zeros before the first call.
    #[inline]
    pub fn activation(&self) -> &[f64] {
        &self.activation
    }

    /// The full row-major weight matrix.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The weight vector of one neuron.
    #[inline]
    pub fn weights_of(&self, neuron: usize) -> Option<&[f64]> {
        if neuron < self.neurons {
            Some(self.row(neuron))
        } else {
            None
        }
    }

    /// A single weight.
    pub fn weight(&self, neuron: usize, dim: usize) -> Result<f64> {
        self.check_index(neuron, dim)?;
        Ok(self.weights[neuron * self.input_dim + dim])
    }

    /// Overwrites a single weight, bypassing learning.
    pub fn set_weight(&mut self, neuron: usize, dim: usize, value: f64) -> Result<()> {
        self.check_index(neuron, dim)?;
        self.weights[neuron * self.input_dim + dim] = value;
        Ok(())
    }

    /// Computes every neuron's activation for `input` and returns the winner.
    ///
    /// Ties go to the lowest index.
    pub fn activate(&mut self, input: &[f64]) -> Result<usize> {
        self.check_input(input)?;

        for (i, row) in self.weights.chunks_exact(self.input_dim).enumerate() {
            self.activation[i] = row.iter().zip(input).map(|(w, x)| w * x).sum();
        }

        let mut winner = 0;
        for (i, &a) in self.activation.iter().enumerate() {
            if a > self.activation[winner] {
                winner = i;
            }
        }

        Ok(winner)
    }

    /// Neighborhood weight of neuron `i` relative to `winner`.
    ///
    /// Depends only on the ring distance between the two. Both indices must
    /// name neurons of this map.
    pub fn neighborhood(&self, i: usize, winner: usize) -> Result<f64> {
        for index in [i, winner] {
            if index >= self.neurons {
                return Err(VisMotorError::IndexOutOfRange {
                    index,
                    max: self.neurons,
                });
            }
        }
        Ok(self.table.between(i, winner, self.neurons))
    }

    /// Runs one competitive learning step and returns the winner.
    ///
    /// Every weight moves by `step * (x - w) * h`, where `h` is the neuron's
    /// neighborhood weight. Nothing is modified if validation fails.
    pub fn learn(&mut self, input: &[f64], step: f64) -> Result<usize> {
        self.check_input(input)?;
        if !(step.is_finite() && step > 0.0) {
            return Err(VisMotorError::InvalidArgument(format!(
                "step size must be positive, got {}",
                step
            )));
        }

        let winner = self.activate(input)?;
        let neurons = self.neurons;
        let table = self.table;

        for (i, row) in self.weights.chunks_exact_mut(self.input_dim).enumerate() {
            let h = table.weight(ring_distance(i, winner, neurons));
            if h == 0.0 {
                continue;
            }
            let influence = step * h;
            for (w, x) in row.iter_mut().zip(input) {
                *w += influence * (x - *w);
            }
        }

        debug!(
            "SOM learn: winner={} activation={:.4} step={:.4}",
            winner, self.activation[winner], step
        );

        Ok(winner)
    }

    /// Squared Euclidean distance between a neuron's weights and `input`.
    pub fn distance_squared(&self, neuron: usize, input: &[f64]) -> Result<f64> {
        self.check_input(input)?;
        let row = self.weights_of(neuron).ok_or(VisMotorError::IndexOutOfRange {
            index: neuron,
            max: self.neurons,
        })?;
        Ok(row.iter().zip(input).map(|(w, x)| (w - x).powi(2)).sum())
    }

    /// Euclidean distance between a neuron's weights and `input`.
    pub fn distance(&self, neuron: usize, input: &[f64]) -> Result<f64> {
        self.distance_squared(neuron, input).map(f64::sqrt)
    }

    #[inline]
    fn row(&self, neuron: usize) -> &[f64] {
        let start = neuron * self.input_dim;
        &self.weights[start..start + self.input_dim]
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_dim {
            return Err(VisMotorError::dimension(self.input_dim, input.len()));
        }
        if let Some(j) = input.iter().position(|x| !x.is_finite()) {
            return Err(VisMotorError::InvalidArgument(format!(
                "input component {} is not finite: {}",
                j, input[j]
            )));
        }
        Ok(())
    }

    fn check_index(&self, neuron: usize, dim: usize) -> Result<()> {
        if neuron >= self.neurons {
            return Err(VisMotorError::IndexOutOfRange {
                index: neuron,
                max: self.neurons,
            });
        }
        if dim >= self.input_dim {
            return Err(VisMotorError::IndexOutOfRange {
                index: dim,
                max: self.input_dim,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::som::InitPolicy;

    fn explicit(rows: Vec<Vec<f64>>, table: NeighborhoodTable) -> SomEngine {
        let config = SomConfig {
            neurons: rows.len(),
            input_dim: rows[0].len(),
            seed: Some(0),
            neighborhood: table,
            init: InitPolicy::Explicit { weights: rows },
        };
        SomEngine::new(&config).unwrap()
    }

    fn seeded(neurons: usize, input_dim: usize) -> SomEngine {
        let config = SomConfig {
            neurons,
            input_dim,
            seed: Some(42),
            init: InitPolicy::unit(),
            ..Default::default()
        };
        SomEngine::new(&config).unwrap()
    }

    #[test]
    fn test_engine_shape() {
        for (k, n) in [(1, 1), (3, 4), (10, 2), (7, 13)] {
            let som = seeded(k, n);
            assert_eq!(som.neurons(), k);
            assert_eq!(som.input_dim(), n);
            assert_eq!(som.weights().len(), k * n);
            assert_eq!(som.activation().len(), k);
            assert!(som.activation().iter().all(|&a| a == 0.0));
        }
    }

    #[test]
    fn test_invalid_shape() {
        let mut config = SomConfig::with_shape(0, 3);
        config.seed = Some(1);
        assert!(matches!(
            SomEngine::new(&config),
            Err(VisMotorError::InvalidConfiguration(_))
        ));
        let mut config = SomConfig::with_shape(3, 0);
        config.seed = Some(1);
        assert!(matches!(
            SomEngine::new(&config),
            Err(VisMotorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_seeded_construction_reproducible() {
        let a = seeded(5, 3);
        let b = seeded(5, 3);
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn test_activate_dot_product() {
        let mut som = explicit(
            vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![1.0, 1.0]],
            NeighborhoodTable::corrected(),
        );
        let winner = som.activate(&[3.0, 1.0]).unwrap();
        assert_eq!(som.activation(), &[3.0, 2.0, 4.0]);
        assert_eq!(winner, 2);
    }

    #[test]
    fn test_activate_zero_input() {
        let mut som = seeded(6, 3);
        let winner = som.activate(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(winner, 0);
        assert!(som.activation().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let mut som = explicit(
            vec![vec![0.0], vec![2.0], vec![2.0]],
            NeighborhoodTable::corrected(),
        );
        assert_eq!(som.activate(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn test_neighborhood_self_and_symmetry() {
        let som = explicit(vec![vec![0.0]; 10], NeighborhoodTable::repulsive());
        for i in 0..10 {
            assert_eq!(som.neighborhood(i, i).unwrap(), 0.6);
            for w in 0..10 {
                assert_eq!(som.neighborhood(i, w).unwrap(), som.neighborhood(w, i).unwrap());
            }
        }
        assert_eq!(som.neighborhood(0, 5).unwrap(), som.neighborhood(1, 6).unwrap());
        assert_eq!(som.neighborhood(0, 8).unwrap(), -0.5);
        assert_eq!(som.neighborhood(9, 0).unwrap(), 0.2);
    }

    #[test]
    fn test_neighborhood_rejects_out_of_range() {
        let som = explicit(vec![vec![0.0]; 4], NeighborhoodTable::corrected());
        assert!(matches!(
            som.neighborhood(4, 0),
            Err(VisMotorError::IndexOutOfRange { index: 4, max: 4 })
        ));
        assert!(matches!(
            som.neighborhood(0, 7),
            Err(VisMotorError::IndexOutOfRange { index: 7, max: 4 })
        ));
    }

    #[test]
    fn test_learn_winner_take_all_scenario() {
        let mut som = explicit(
            vec![vec![0.0], vec![1.0], vec![2.0]],
            NeighborhoodTable::winner_take_all(),
        );
        let winner = som.learn(&[1.0], 1.0).unwrap();
        assert_eq!(winner, 2);
        assert_eq!(som.weights(), &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_learn_spreads_to_neighbors() {
        let mut som = explicit(vec![vec![0.0]; 5], NeighborhoodTable::corrected());
        som.set_weight(2, 0, 1.0).unwrap();
        let winner = som.learn(&[2.0], 0.5).unwrap();
        assert_eq!(winner, 2);
        let w = som.weights();
        assert!((w[2] - 1.5).abs() < 1e-12);
        assert!((w[1] - 0.25).abs() < 1e-12);
        assert!((w[3] - 0.25).abs() < 1e-12);
        assert_eq!(w[0], 0.0);
        assert_eq!(w[4], 0.0);
    }

    #[test]
    fn test_repulsive_lobe_pushes_away() {
        let mut som = explicit(vec![vec![0.0]; 7], NeighborhoodTable::repulsive());
        som.set_weight(3, 0, 1.0).unwrap();
        som.learn(&[1.0], 0.5).unwrap();
        // distance 2 from the winner moves away from the input
        assert!(som.weight(1, 0).unwrap() < 0.0);
        assert!(som.weight(5, 0).unwrap() < 0.0);
        assert!(som.weight(2, 0).unwrap() > 0.0);
        assert_eq!(som.weight(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_learn_rejects_bad_step() {
        let mut som = seeded(4, 2);
        let before = som.weights().to_vec();
        for step in [0.0, -0.1, f64::NAN] {
            assert!(matches!(
                som.learn(&[1.0, 1.0], step),
                Err(VisMotorError::InvalidArgument(_))
            ));
        }
        assert_eq!(som.weights(), before.as_slice());
    }

    #[test]
    fn test_learn_rejects_non_finite_input() {
        let mut som = seeded(4, 2);
        let before = som.weights().to_vec();
        for input in [[f64::NAN, 1.0], [1.0, f64::INFINITY], [f64::NEG_INFINITY, 0.0]] {
            assert!(matches!(
                som.learn(&input, 0.5),
                Err(VisMotorError::InvalidArgument(_))
            ));
            assert!(matches!(
                som.activate(&input),
                Err(VisMotorError::InvalidArgument(_))
            ));
        }
        assert_eq!(som.weights(), before.as_slice());
        assert!(som.weights().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_dimension_mismatch_leaves_state() {
        let mut som = seeded(4, 2);
        let before = som.weights().to_vec();
        assert!(matches!(
            som.learn(&[1.0], 0.5),
            Err(VisMotorError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            som.activate(&[1.0, 2.0, 3.0]),
            Err(VisMotorError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert_eq!(som.weights(), before.as_slice());
    }

    #[test]
    fn test_set_weight_bounds() {
        let mut som = seeded(3, 2);
        let before = som.weights().to_vec();
        assert!(matches!(
            som.set_weight(3, 0, 9.0),
            Err(VisMotorError::IndexOutOfRange { index: 3, max: 3 })
        ));
        assert!(matches!(
            som.set_weight(0, 2, 9.0),
            Err(VisMotorError::IndexOutOfRange { index: 2, max: 2 })
        ));
        assert_eq!(som.weights(), before.as_slice());

        som.set_weight(1, 1, 9.0).unwrap();
        assert_eq!(som.weight(1, 1).unwrap(), 9.0);
    }

    #[test]
    fn test_distance() {
        let som = explicit(vec![vec![0.0, 0.0], vec![3.0, 4.0]], NeighborhoodTable::corrected());
        assert!((som.distance(1, &[0.0, 0.0]).unwrap() - 5.0).abs() < 1e-12);
        assert!(som.distance(2, &[0.0, 0.0]).is_err());
    }
}
