//! tw-core: stable foundation for the transient winding workspace.
//!
//! Contains:
//! - units (uom SI types + constructors for the electrical quantities)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for graph and winding objects)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TwError, TwResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
