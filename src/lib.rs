//! # Vismotor - Ring SOMs for visuomotor learning
//!
//! Vismotor learns a mapping from gaze direction to arm posture with small
//! Self-Organizing Maps. It is meant to sit behind whatever transport feeds
//! it samples: the library never opens ports, files or devices on its own.
//!
//! ## Overview
//!
//! The core is [`SomEngine`], a competitive learner whose neurons sit on a
//! 1-D ring. For an input vector, each neuron's activation is the inner
//! product of its weights with the input; the most active neuron wins, and
//! every neuron moves toward the input scaled by a neighborhood weight that
//! depends only on its ring distance to the winner.
//!
//! [`VisuomotorField`] quantizes gaze space (azimuth, elevation, vergence)
//! into a lattice of cells, each owning one engine. Training routes a
//! `(gaze, posture)` sample to its cell; recall returns the learned posture
//! closest to the current one for a visual target.
//!
//! ## Quick Start
//!
//! ```rust
//! use vismotor::{InitPolicy, NeighborhoodTable, SomConfig, SomEngine};
//!
//! let config = SomConfig {
//!     neurons: 3,
//!     input_dim: 1,
//!     seed: Some(42),
//!     neighborhood: NeighborhoodTable::winner_take_all(),
//!     init: InitPolicy::Explicit { weights: vec![vec![0.0], vec![1.0], vec![2.0]] },
//! };
//! let mut som = SomEngine::new(&config)?;
//!
//! let winner = som.learn(&[1.0], 1.0)?;
//! assert_eq!(winner, 2);
//! assert_eq!(som.weights(), &[0.0, 1.0, 1.0]);
//! # Ok::<(), vismotor::VisMotorError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`som`] - Ring SOM engine, neighborhood kernel, init policies, schedule
//! - [`field`] - Gaze-indexed lattice of engines
//! - [`config`] - Serde configuration
//! - [`error`] - Error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod field;
pub mod som;

// Re-export commonly used types
pub use config::{Config, FieldConfig, GazeBounds, ScheduleConfig, SomConfig, MAX_FIELD_CELLS};
pub use error::{Result, VisMotorError};
pub use field::{CellIndex, FieldUpdate, ReachCommand, Sample, VisuomotorField};
pub use som::{ring_distance, InitPolicy, Interval, NeighborhoodTable, SomEngine, StepSchedule};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
