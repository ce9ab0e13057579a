//! Winding construction errors.

use thiserror::Error;
use tw_graph::GraphError;

pub type WindingResult<T> = Result<T, WindingError>;

/// Configuration and topology errors raised while building a transformer.
///
/// All of these are fatal at build time; nothing is corrected silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WindingError {
    #[error("Invalid geometry for segment '{segment}': {what}")]
    InvalidGeometry { segment: String, what: String },

    #[error("Invalid tap on segment '{segment}': {what}")]
    InvalidTap { segment: String, what: String },

    #[error("Duplicate label '{label}' in {context}")]
    DuplicateLabel { label: String, context: String },

    #[error("No {what} labelled '{label}'")]
    LabelNotFound { what: &'static str, label: String },

    #[error("Label '{label}' matches {count} {what}s")]
    AmbiguousLabel {
        what: &'static str,
        label: String,
        count: usize,
    },

    #[error("{what} index {index} out of range (len={len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Unknown {what} id {id}")]
    UnknownId { what: &'static str, id: u32 },

    #[error("Terminal configuration error: {what}")]
    Terminals { what: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}
