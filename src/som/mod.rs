//! Ring Self-Organizing Map (SOM).
//!
//! - **Engine**: activation, winner search and competitive learning (map.rs)
//! - **Neighborhood**: ring distance and the bucketed kernel (neighborhood.rs)
//! - **Initialization**: uniform-range and explicit weight policies (init.rs)
//! - **Schedule**: exponentially decaying step size (schedule.rs)

mod init;
mod map;
mod neighborhood;
mod schedule;

pub use init::{InitPolicy, Interval};
pub use map::SomEngine;
pub use neighborhood::{ring_distance, NeighborhoodTable};
pub use schedule::StepSchedule;
