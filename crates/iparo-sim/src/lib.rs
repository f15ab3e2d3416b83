//! Simulation harness for comparing linking strategies.
//!
//! A [`VersionGenerator`] produces a synthetic capture history from a
//! [`VersionDensity`]. A [`Simulation`] writes that history into an
//! in-memory archive and then replays lookups, recording how many store and
//! naming operations each one costs.

pub mod density;
pub mod error;
pub mod operation;
pub mod simulation;

pub use density::{VersionDensity, VersionGenerator, VersionVolume};
pub use error::{SimError, SimResult};
pub use operation::{OpSample, Operation, Stats, Summary};
pub use simulation::{OperationReport, Simulation, SimulationConfig, SimulationReport, StoreSample};
