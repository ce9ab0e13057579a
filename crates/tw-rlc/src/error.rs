//! Error types for RLC matrix calculation.

use thiserror::Error;
use tw_core::TwError;

pub type RlcResult<T> = Result<T, RlcError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlcError {
    #[error("Invalid calculator configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Turn {turn}: {what}")]
    Geometry { turn: usize, what: String },

    #[error("Non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Topology has no turns")]
    Empty,

    #[error(transparent)]
    Core(#[from] TwError),
}
