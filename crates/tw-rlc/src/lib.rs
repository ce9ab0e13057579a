//! tw-rlc: per-unit-length resistance, inductance and capacitance matrices
//! for the turns of a finalized winding topology.
//!
//! The solvers only see the [`MatrixCalculator`] trait. [`AnalyticCalculator`]
//! is the built-in implementation; its inductance terms can be evaluated in
//! closed form or by numerical integration of Neumann's formula.

pub mod analytic;
pub mod calculator;
pub mod elliptic;
pub mod error;
pub mod neumann;

pub use analytic::{AnalyticCalculator, AnalyticConfig, InductanceMethod};
pub use calculator::MatrixCalculator;
pub use error::{RlcError, RlcResult};
