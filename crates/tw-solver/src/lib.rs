//! Frequency-response solver for transformer windings.
//!
//! Two models implement [`ResponseModel`]: the multiconductor transmission
//! line model ([`MtlModel`]) and a lumped nodal model ([`LumpedModel`]).
//! [`Sweep`] evaluates either over a log-spaced range of frequencies.

pub mod error;
pub mod expm;
pub mod lumped;
pub mod mtl;
pub mod response;
pub mod sweep;
pub mod terminal;

pub use error::{SolverError, SolverResult};
pub use expm::{CMatrix, ExpmMethod, expm, expm_with_method};
pub use lumped::{LumpedConfig, LumpedModel, condition_number};
pub use mtl::{MtlConfig, MtlModel};
pub use response::{ModelKind, PointResponse, ResponseModel};
pub use sweep::{FreqResponse, FrequencySample, SampleOutcome, Sweep, SweepConfig};
pub use terminal::{Boundary, BoundaryGroup, TerminalMatrixFactory, TurnEnd, boundary_groups};
