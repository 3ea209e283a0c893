// Library root: fantasy football lineup optimization.
//
// Assigns a roster to lineup slots by projected points, then derives the
// ordered move chains that take the current lineup to the optimal one.

pub mod config;
pub mod error;
pub mod lineup;
pub mod optimizer;
pub mod projections;
pub mod provider;
pub mod waiver;

pub use error::EngineError;
pub use optimizer::{LineupEngine, OptimizationResult};
