//! Stable indexing for solver integration.
//!
//! Provides a bidirectional mapping between live node IDs and the contiguous
//! solver indices handed out by `Graph::assign_solver_indices`.

use tw_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Index map providing O(1) lookup between node IDs and solver indices.
#[derive(Debug, Clone)]
pub struct IndexMap {
    /// Contiguous list of node IDs (index -> NodeId).
    node_ids: Vec<NodeId>,

    /// Reverse lookup, sized to the number of nodes ever created.
    node_to_idx: Vec<Option<usize>>,
}

impl IndexMap {
    /// Build from a graph whose live nodes already carry solver indices.
    pub fn from_graph(graph: &Graph) -> GraphResult<Self> {
        let live: Vec<_> = graph.live_nodes().collect();
        let mut node_ids = vec![None; live.len()];
        let mut node_to_idx = vec![None; graph.created_node_count()];

        for node in live {
            let idx = node.solver_index.ok_or_else(|| GraphError::IndexMismatch {
                node: node.id,
                what: "solver index not assigned".to_string(),
            })?;
            let slot = node_ids.get_mut(idx).ok_or_else(|| GraphError::IndexMismatch {
                node: node.id,
                what: format!("solver index {idx} out of range"),
            })?;
            *slot = Some(node.id);
            node_to_idx[node.id.slot()] = Some(idx);
        }

        let node_ids = node_ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                id.ok_or_else(|| GraphError::IndexMismatch {
                    node: NodeId::from_index(i as u32),
                    what: format!("solver index {i} unused"),
                })
            })
            .collect::<GraphResult<Vec<_>>>()?;

        Ok(Self {
            node_ids,
            node_to_idx,
        })
    }

    /// Number of nodes in the index.
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Get the contiguous index for a node ID.
    pub fn node_idx(&self, id: NodeId) -> GraphResult<usize> {
        self.node_to_idx
            .get(id.slot())
            .and_then(|&opt| opt)
            .ok_or(GraphError::DeadNode { node: id })
    }

    /// Get the node ID for a contiguous index (panics if out of bounds).
    pub fn node_id(&self, i: usize) -> NodeId {
        self.node_ids[i]
    }

    /// All node IDs in index order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }
}
