//! Consistency checks for the touching-entity index.

use std::collections::BTreeSet;

use tw_core::{EntityId, NodeId};

use crate::entity::ConnectedEntity;
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

impl Graph {
    /// Re-derive the node -> entities index from entity ports and compare.
    ///
    /// Fails when an entity references a dead node, or when a live node's
    /// touching set differs from the entities that actually hold it.
    pub fn validate(&self) -> GraphResult<()> {
        let mut expected: Vec<BTreeSet<EntityId>> = vec![BTreeSet::new(); self.nodes.len()];

        for entity in &self.entities {
            for &port in entity.ports() {
                if !self.is_live(port) {
                    return Err(GraphError::DeadNode { node: port });
                }
                expected[port.slot()].insert(entity.id());
            }
        }

        for (slot, (want, have)) in expected.iter().zip(&self.touching).enumerate() {
            let node = NodeId::from_index(slot as u32);
            if self.nodes[slot].is_none() {
                if !have.is_empty() {
                    return Err(GraphError::IndexMismatch {
                        node,
                        what: format!("dead node still lists {} entities", have.len()),
                    });
                }
                continue;
            }
            if want != have {
                return Err(GraphError::IndexMismatch {
                    node,
                    what: format!("expected {:?}, index has {:?}", want, have),
                });
            }
        }

        Ok(())
    }
}
