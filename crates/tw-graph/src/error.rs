//! Graph-specific error types.

use thiserror::Error;
use tw_core::{EntityId, NodeId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and union errors.
///
/// Every variant is a topology-contract violation: it means the caller (or the
/// index itself) is inconsistent, and the build must stop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The node was merged away by an earlier union or never existed.
    #[error("Node {node} is not live")]
    DeadNode { node: NodeId },

    /// An entity id that the graph never handed out.
    #[error("Entity {entity} is not registered")]
    UnknownEntity { entity: EntityId },

    /// An entity was asked to repoint a node it does not reference.
    #[error("Entity {entity} has no port on node {node}")]
    PortNotHeld { entity: EntityId, node: NodeId },

    /// An entity needs at least two ports.
    #[error("Entity needs at least 2 ports, got {count}")]
    TooFewPorts { count: usize },

    /// The touching index disagrees with an entity's actual ports.
    #[error("Touching index mismatch at node {node}: {what}")]
    IndexMismatch { node: NodeId, what: String },
}
