//! Visual field lattice of ring SOMs.
//!
//! The gaze space (azimuth, elevation, vergence) is quantized into a 3-D
//! lattice of cells. Each cell owns an independent [`SomEngine`] that learns
//! arm postures observed while the gaze rested in that cell, so recalling a
//! cell's weights yields reach postures for a visual target.

mod recall;
pub mod samples;

pub use recall::{basin, ReachCommand, BASIN_BETA};
pub use samples::{read_samples, Sample};

use crate::config::{Config, FieldConfig};
use crate::error::{Result, VisMotorError};
use crate::som::{SomEngine, StepSchedule};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::fmt;

/// Gaze vector length: azimuth, elevation, vergence.
pub const GAZE_DIM: usize = 3;

/// Position of a cell in the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    /// Azimuth bin.
    pub azimuth: usize,
    /// Elevation bin.
    pub elevation: usize,
    /// Vergence bin.
    pub vergence: usize,
}

impl CellIndex {
    /// Creates a cell index.
    pub const fn new(azimuth: usize, elevation: usize, vergence: usize) -> Self {
        Self {
            azimuth,
            elevation,
            vergence,
        }
    }

    fn as_array(&self) -> [usize; 3] {
        [self.azimuth, self.elevation, self.vergence]
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.azimuth, self.elevation, self.vergence)
    }
}

/// Outcome of one training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Cell selected by the gaze.
    pub cell: CellIndex,
    /// Winning neuron within that cell.
    pub winner: usize,
    /// Step size applied to the selected cell.
    pub step: f64,
    /// Number of adjacent cells also trained.
    pub neighbors_trained: usize,
}

/// A lattice of ring SOMs indexed by quantized gaze direction.
#[derive(Debug, Clone)]
pub struct VisuomotorField {
    config: FieldConfig,
    shape: [usize; 3],
    cells: Vec<SomEngine>,
    hits: Vec<usize>,
    schedule: StepSchedule,
    samples_seen: usize,
}

impl VisuomotorField {
    /// Builds the lattice, one map per cell.
    ///
    /// Every cell draws its initial weights from its own ChaCha stream of the
    /// configured seed, so a single seed reproduces the whole field.
    pub fn new(config: &Config) -> Result<Self> {
        config.field.validate()?;
        config.som.validate()?;
        config.schedule.validate()?;

        let shape = config.field.shape();
        let total = config.field.total_cells();
        let seed = match config.som.seed {
            Some(seed) => seed,
            None => ChaCha8Rng::from_entropy().gen(),
        };

        info!(
            "Building visual field: {}x{}x{} cells, {} neurons x {} dims each",
            shape[0], shape[1], shape[2], config.som.neurons, config.som.input_dim
        );

        let cells = (0..total)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                SomEngine::with_rng(&config.som, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        let schedule = StepSchedule::new(&config.schedule, total, config.som.neurons);

        Ok(Self {
            config: config.field.clone(),
            shape,
            cells,
            hits: vec![0; total],
            schedule,
            samples_seen: 0,
        })
    }

    /// Lattice extent along each axis.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of cells.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Training samples received, including those outside the field.
    #[inline]
    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    /// The step-size schedule.
    #[inline]
    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    /// Step size the next sample will use.
    #[inline]
    pub fn current_step(&self) -> f64 {
        self.schedule.step(self.samples_seen + 1)
    }

    /// Input dimensionality of every cell.
    #[inline]
    pub fn posture_dim(&self) -> usize {
        self.cells[0].input_dim()
    }

    /// The field configuration.
    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Gets the map of a cell.
    pub fn cell(&self, index: CellIndex) -> Option<&SomEngine> {
        self.linear(index).map(|i| &self.cells[i])
    }

    /// Gets a mutable reference to the map of a cell.
    pub fn cell_mut(&mut self, index: CellIndex) -> Option<&mut SomEngine> {
        match self.linear(index) {
            Some(i) => Some(&mut self.cells[i]),
            None => None,
        }
    }

    /// Number of samples a cell was selected for.
    pub fn hits(&self, index: CellIndex) -> usize {
        self.linear(index).map_or(0, |i| self.hits[i])
    }

    /// Cells that were selected by at least one sample, in lattice order.
    pub fn trained_cells(&self) -> impl Iterator<Item = (CellIndex, &SomEngine, usize)> + '_ {
        self.cells
            .iter()
            .zip(&self.hits)
            .enumerate()
            .filter(|(_, (_, &hits))| hits > 0)
            .map(|(i, (som, &hits))| (self.coords(i), som, hits))
    }

    /// Quantizes a gaze direction. Returns `None` outside the lattice.
    pub fn cell_for(&self, gaze: &[f64]) -> Result<Option<CellIndex>> {
        if gaze.len() != GAZE_DIM {
            return Err(VisMotorError::dimension(GAZE_DIM, gaze.len()));
        }

        let axes = self.config.gaze.axes();
        let mut bins = [0usize; 3];
        for axis in 0..GAZE_DIM {
            let bin = ((gaze[axis] - axes[axis].low) * self.config.resolution).floor();
            if !bin.is_finite() || bin < 0.0 || bin >= self.shape[axis] as f64 {
                return Ok(None);
            }
            bins[axis] = bin as usize;
        }

        Ok(Some(CellIndex::new(bins[0], bins[1], bins[2])))
    }

    /// Trains the cell selected by `gaze` on an observed arm posture.
    ///
    /// Gazes outside the lattice are skipped and yield `Ok(None)`, but still
    /// advance the step schedule.
    pub fn train(&mut self, gaze: &[f64], posture: &[f64]) -> Result<Option<FieldUpdate>> {
        if posture.len() != self.posture_dim() {
            return Err(VisMotorError::dimension(self.posture_dim(), posture.len()));
        }
        if posture.iter().any(|x| !x.is_finite()) {
            return Err(VisMotorError::InvalidArgument(format!(
                "posture has non-finite components: {:?}",
                posture
            )));
        }
        let cell = self.cell_for(gaze)?;

        self.samples_seen += 1;
        let step = self.schedule.step(self.samples_seen);

        let cell = match cell {
            Some(cell) => cell,
            None => {
                debug!("Gaze {:?} outside visual field, sample skipped", gaze);
                return Ok(None);
            }
        };

        let idx = self.to_linear(cell);
        let winner = self.cells[idx].learn(posture, step)?;
        self.hits[idx] += 1;

        let mut neighbors_trained = 0;
        if let Some(factor) = self.config.neighbor_spread {
            let spread_step = step * factor;
            if spread_step > 0.0 {
                for neighbor in self.neighbors(cell) {
                    let n = self.to_linear(neighbor);
                    self.cells[n].learn(posture, spread_step)?;
                    neighbors_trained += 1;
                }
            }
        }

        debug!(
            "Trained cell {} winner={} step={:.4} neighbors={}",
            cell, winner, step, neighbors_trained
        );

        Ok(Some(FieldUpdate {
            cell,
            winner,
            step,
            neighbors_trained,
        }))
    }

    /// Face-adjacent cells of `cell` that lie inside the lattice.
    pub fn neighbors(&self, cell: CellIndex) -> Vec<CellIndex> {
        let base = cell.as_array();
        let mut out = Vec::with_capacity(6);
        for axis in 0..GAZE_DIM {
            if base[axis] > 0 {
                let mut n = base;
                n[axis] -= 1;
                out.push(CellIndex::new(n[0], n[1], n[2]));
            }
            if base[axis] + 1 < self.shape[axis] {
                let mut n = base;
                n[axis] += 1;
                out.push(CellIndex::new(n[0], n[1], n[2]));
            }
        }
        out
    }

    fn linear(&self, index: CellIndex) -> Option<usize> {
        let a = index.as_array();
        if a.iter().zip(&self.shape).all(|(&v, &n)| v < n) {
            Some(self.to_linear(index))
        } else {
            None
        }
    }

    #[inline]
    fn to_linear(&self, index: CellIndex) -> usize {
        (index.azimuth * self.shape[1] + index.elevation) * self.shape[2] + index.vergence
    }

    #[inline]
    fn coords(&self, linear: usize) -> CellIndex {
        let vergence = linear % self.shape[2];
        let rest = linear / self.shape[2];
        CellIndex::new(rest / self.shape[1], rest % self.shape[1], vergence)
    }
}
