use sim_core::ValidationError;
use sim_engine::SimError;
use thiserror::Error;

/// Why a season or prediction run did not produce a result.
#[derive(Debug, Error, PartialEq)]
pub enum RunError {
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimError),
    /// Cancelled by the host; no partial result is returned.
    #[error("run aborted")]
    Aborted,
    #[error("worker failed: {0}")]
    Worker(String),
}
