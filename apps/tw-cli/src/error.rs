//! Error type returned by every CLI command.

use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] tw_project::ProjectError),

    #[error("Winding error: {0}")]
    Winding(#[from] tw_winding::WindingError),

    #[error("RLC error: {0}")]
    Rlc(#[from] tw_rlc::RlcError),

    #[error("Solver error: {0}")]
    Solver(#[from] tw_solver::SolverError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
