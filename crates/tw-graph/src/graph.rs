//! Node arena, entity registry and node merging.

use std::collections::BTreeSet;

use tracing::trace;
use tw_core::{EntityId, NodeId};

use crate::entity::{ConnectedEntity, Entity, EntityKind};
use crate::error::{GraphError, GraphResult};
use crate::node::Node;

/// The electrical graph of a winding assembly.
///
/// Nodes live in an arena indexed by id; a merged-away node leaves a `None`
/// slot behind so ids are never reused. Entities are stored by id as well,
/// and `touching[node]` lists every entity whose ports contain `node`.
///
/// The graph is mutated only while a topology is being built. Once solver
/// indices are assigned it is handed out behind a shared reference.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) entities: Vec<Entity>,
    pub(crate) touching: Vec<BTreeSet<EntityId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, untagged node.
    pub fn create_node(&mut self) -> NodeId {
        self.push_node(None)
    }

    /// Allocate a fresh node with a display tag.
    pub fn create_tagged_node(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_node(Some(tag.into()))
    }

    fn push_node(&mut self, tag: Option<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(id, tag)));
        self.touching.push(BTreeSet::new());
        id
    }

    /// Register an entity with the given ports and index it under each port.
    pub fn register(&mut self, kind: EntityKind, ports: Vec<NodeId>) -> GraphResult<EntityId> {
        if ports.len() < 2 {
            return Err(GraphError::TooFewPorts { count: ports.len() });
        }
        for &port in &ports {
            self.ensure_live(port)?;
        }

        let id = EntityId::from_index(self.entities.len() as u32);
        for &port in &ports {
            self.touching[port.slot()].insert(id);
        }
        self.entities.push(Entity { id, kind, ports });
        Ok(id)
    }

    /// Merge `from` into `to` and return the survivor.
    ///
    /// Every entity touching `from` has all of its `from` ports repointed to
    /// `to`; `from` is then dropped from the live set. Merging a node with
    /// itself changes nothing.
    pub fn union(&mut self, from: NodeId, to: NodeId) -> GraphResult<NodeId> {
        if from == to {
            return Ok(to);
        }
        self.ensure_live(from)?;
        self.ensure_live(to)?;

        // Every repoint is checked up front; a failed union changes nothing.
        let moved: Vec<EntityId> = self.touching[from.slot()].iter().copied().collect();
        for &entity_id in &moved {
            if !self.entity(entity_id)?.ports().contains(&from) {
                return Err(GraphError::PortNotHeld {
                    entity: entity_id,
                    node: from,
                });
            }
        }

        self.touching[from.slot()].clear();
        for &entity_id in &moved {
            self.entities[entity_id.slot()].repoint_port(from, to)?;
            self.touching[to.slot()].insert(entity_id);
        }

        // A tag on the losing node survives when the winner has none.
        let from_tag = self.nodes[from.slot()].take().and_then(|n| n.tag);
        if let Some(node) = self.nodes[to.slot()].as_mut() {
            if node.tag.is_none() {
                node.tag = from_tag;
            }
        }

        trace!(%from, %to, repointed = moved.len(), "union");
        Ok(to)
    }

    /// Tie two nodes together; same semantics as `union(a, b)`.
    pub fn short(&mut self, a: NodeId, b: NodeId) -> GraphResult<NodeId> {
        self.union(a, b)
    }

    /// Get a live node by ID (returns None for merged-away or unknown IDs).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot()).and_then(|slot| slot.as_ref())
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Iterate over live nodes in creation order.
    pub fn live_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn live_node_count(&self) -> usize {
        self.live_nodes().count()
    }

    /// Total number of nodes ever created, merged or not.
    pub fn created_node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn entity(&self, id: EntityId) -> GraphResult<&Entity> {
        self.entities
            .get(id.slot())
            .ok_or(GraphError::UnknownEntity { entity: id })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entities whose ports contain `node` (empty for dead nodes).
    pub fn touching(&self, node: NodeId) -> Vec<EntityId> {
        if !self.is_live(node) {
            return Vec::new();
        }
        self.touching[node.slot()].iter().copied().collect()
    }

    /// Number live nodes `0..M` in creation order and return `M`.
    pub fn assign_solver_indices(&mut self) -> usize {
        let mut next = 0;
        for node in self.nodes.iter_mut().flatten() {
            node.solver_index = Some(next);
            next += 1;
        }
        next
    }

    pub fn solver_index(&self, node: NodeId) -> Option<usize> {
        self.node(node).and_then(|n| n.solver_index)
    }

    pub(crate) fn ensure_live(&self, node: NodeId) -> GraphResult<()> {
        if self.is_live(node) {
            Ok(())
        } else {
            Err(GraphError::DeadNode { node })
        }
    }
}
