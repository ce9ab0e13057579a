//! Error types for frequency-response solving.

use thiserror::Error;
use tw_core::TwError;
use tw_rlc::RlcError;
use tw_winding::WindingError;

/// Errors raised while setting up or evaluating a response model.
///
/// Inside a sweep, errors from a single frequency are caught and recorded as
/// a failed sample; only setup errors abort the sweep.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Invalid sweep configuration: {what}")]
    Config { what: String },

    #[error("Topology error: {what}")]
    Topology { what: String },

    #[error("Singular system: {what}")]
    Singular { what: String },

    #[error("Ill-conditioned system: condition number {condition:e} exceeds {limit:e}")]
    IllConditioned { condition: f64, limit: f64 },

    #[error("Non-finite {what}")]
    NonFinite { what: String },

    #[error("Winding error: {0}")]
    Winding(#[from] WindingError),

    #[error("RLC error: {0}")]
    Rlc(#[from] RlcError),

    #[error("Graph error: {0}")]
    Graph(#[from] tw_graph::GraphError),

    #[error(transparent)]
    Core(#[from] TwError),
}

pub type SolverResult<T> = Result<T, SolverError>;
