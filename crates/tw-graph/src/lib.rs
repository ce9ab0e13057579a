//! tw-graph: electrical topology layer for winding assemblies.
//!
//! Provides:
//! - Node arena with stable, never-reused IDs
//! - Entities (branches, segments) whose ports are graph nodes
//! - Node merging (`union` / `short`) that repoints every touching entity
//! - Index validation and stable solver indexing
//!
//! # Example
//!
//! ```
//! use tw_core::Id;
//! use tw_graph::{EntityKind, Graph};
//!
//! let mut graph = Graph::new();
//! let a = graph.create_node();
//! let b = graph.create_node();
//! let c = graph.create_node();
//! let s1 = graph
//!     .register(EntityKind::Segment { segment: Id::from_index(0) }, vec![a, b])
//!     .unwrap();
//! graph.union(c, b).unwrap();
//!
//! assert_eq!(graph.live_node_count(), 2);
//! assert_eq!(graph.touching(b), vec![s1]);
//! ```

pub mod entity;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod node;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use entity::{ConnectedEntity, Entity, EntityKind};
pub use error::{GraphError, GraphResult};
pub use graph::Graph;
pub use indexing::IndexMap;
pub use node::Node;
