//! Ring topology and the distance-bucketed neighborhood kernel.

use crate::error::{Result, VisMotorError};
use serde::{Deserialize, Serialize};

/// Ring distance between neurons `i` and `j` on a ring of `k` neurons:
/// the shorter of the two arcs.
#[inline]
pub fn ring_distance(i: usize, j: usize, k: usize) -> usize {
    let diff = i.abs_diff(j) % k.max(1);
    diff.min(k - diff)
}

/// Neighborhood weight for ring distances 0, 1, 2 and anything farther.
///
/// A negative entry pushes neurons at that distance away from the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodTable {
    /// Weight of the winner itself.
    pub d0: f64,
    /// Weight of the winner's immediate neighbors.
    pub d1: f64,
    /// Weight at ring distance 2.
    pub d2: f64,
    /// Weight at ring distance 3 and beyond.
    pub d_other: f64,
}

impl Default for NeighborhoodTable {
    fn default() -> Self {
        Self::corrected()
    }
}

impl NeighborhoodTable {
    /// Creates a table from explicit entries.
    pub const fn new(d0: f64, d1: f64, d2: f64, d_other: f64) -> Self {
        Self { d0, d1, d2, d_other }
    }

    /// Full pull on the winner, a quarter on its neighbors, nothing farther.
    pub const fn corrected() -> Self {
        Self::new(1.0, 0.25, 0.0, 0.0)
    }

    /// Partial pull on the winner and its neighbors with a repulsive lobe at
    /// distance 2.
    pub const fn repulsive() -> Self {
        Self::new(0.6, 0.2, -0.5, 0.0)
    }

    /// Winner-take-all: only the winner moves.
    pub const fn winner_take_all() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Looks up the weight for a ring distance.
    #[inline]
    pub fn weight(&self, distance: usize) -> f64 {
        match distance {
            0 => self.d0,
            1 => self.d1,
            2 => self.d2,
            _ => self.d_other,
        }
    }

    /// Weight of neuron `i` relative to `winner` on a ring of `k` neurons.
    #[inline]
    pub fn between(&self, i: usize, winner: usize, k: usize) -> f64 {
        self.weight(ring_distance(i, winner, k))
    }

    /// Weight for every ring distance that occurs on a ring of `k` neurons.
    pub fn profile(&self, k: usize) -> Result<Vec<(usize, f64)>> {
        if k == 0 {
            return Err(VisMotorError::InvalidConfiguration(
                "neuron count must be greater than zero".to_string(),
            ));
        }
        Ok((0..=k / 2).map(|d| (d, self.weight(d))).collect())
    }

    /// Returns true if every entry is finite.
    pub fn is_finite(&self) -> bool {
        [self.d0, self.d1, self.d2, self.d_other]
            .iter()
            .all(|w| w.is_finite())
    }
}
