//! Electrical entities whose ports are graph nodes.

use tw_core::{EntityId, NodeId, SegmentId};

use crate::error::{GraphError, GraphResult};

/// Anything with an ordered list of ports drawn from graph nodes.
///
/// The graph keeps a node -> entities index and calls `repoint_port` on every
/// entity touching a node that is being merged away.
pub trait ConnectedEntity {
    fn id(&self) -> EntityId;

    fn ports(&self) -> &[NodeId];

    /// Replace every port equal to `old` with `new`.
    ///
    /// Fails with `PortNotHeld` when no port equals `old`; the touching index
    /// and the entity have drifted apart at that point.
    fn repoint_port(&mut self, old: NodeId, new: NodeId) -> GraphResult<()>;
}

/// What an entity represents in the winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A contiguous turn range of one segment (one piece of a tap split).
    Branch {
        segment: SegmentId,
        /// Position of this branch within its segment.
        index: usize,
        start_turn: usize,
        num_turns: usize,
    },
    /// A whole segment, seen from outside as its aggregate start and end.
    Segment { segment: SegmentId },
}

impl EntityKind {
    pub fn segment(&self) -> SegmentId {
        match *self {
            EntityKind::Branch { segment, .. } | EntityKind::Segment { segment } => segment,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, EntityKind::Branch { .. })
    }
}

/// A registered entity: its kind plus the nodes it currently touches.
///
/// Two-port entities store `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) ports: Vec<NodeId>,
}

impl Entity {
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// First port.
    pub fn start(&self) -> NodeId {
        self.ports[0]
    }

    /// Last port.
    pub fn end(&self) -> NodeId {
        self.ports[self.ports.len() - 1]
    }
}

impl ConnectedEntity for Entity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn ports(&self) -> &[NodeId] {
        &self.ports
    }

    fn repoint_port(&mut self, old: NodeId, new: NodeId) -> GraphResult<()> {
        let mut found = false;
        for port in self.ports.iter_mut().filter(|p| **p == old) {
            *port = new;
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(GraphError::PortNotHeld {
                entity: self.id,
                node: old,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Id;

    fn branch(ports: Vec<NodeId>) -> Entity {
        Entity {
            id: Id::from_index(0),
            kind: EntityKind::Branch {
                segment: Id::from_index(0),
                index: 0,
                start_turn: 0,
                num_turns: 3,
            },
            ports,
        }
    }

    #[test]
    fn repoint_replaces_both_equal_ports() {
        let a = Id::from_index(1);
        let b = Id::from_index(2);
        let mut e = branch(vec![a, a]);
        e.repoint_port(a, b).unwrap();
        assert_eq!(e.ports(), &[b, b]);
    }

    #[test]
    fn repoint_of_foreign_node_is_rejected() {
        let a = Id::from_index(1);
        let b = Id::from_index(2);
        let c = Id::from_index(3);
        let mut e = branch(vec![a, b]);
        let err = e.repoint_port(c, a).unwrap_err();
        assert!(matches!(err, GraphError::PortNotHeld { .. }));
        assert_eq!(e.ports(), &[a, b]);
    }

    #[test]
    fn start_and_end_accessors() {
        let a = Id::from_index(4);
        let b = Id::from_index(5);
        let e = branch(vec![a, b]);
        assert_eq!(e.start(), a);
        assert_eq!(e.end(), b);
        assert!(e.kind().is_branch());
    }
}
