//! Finalized, read-only transformer topology.

use tw_core::{EntityId, NodeId, SegmentId};
use tw_graph::{Graph, IndexMap, Node};

use crate::error::{WindingError, WindingResult};
use crate::geometry::Conductor;
use crate::segment::Segment;
use crate::terminal::ResolvedTerminal;
use crate::transformer::{find_unique, Winding};

/// One branch laid out in global turn numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchView {
    pub entity: EntityId,
    pub segment: SegmentId,
    /// Position of the branch within its segment.
    pub index: usize,
    /// Global index of the branch's first turn.
    pub first_turn: usize,
    pub num_turns: usize,
}

impl BranchView {
    pub fn turns(&self) -> std::ops::Range<usize> {
        self.first_turn..self.first_turn + self.num_turns
    }

    pub fn last_turn(&self) -> usize {
        self.first_turn + self.num_turns - 1
    }
}

/// A transformer whose graph can no longer change.
///
/// Turns are numbered globally: windings in declaration order, then their
/// segments in declaration order, then turns in electrical order.
#[derive(Debug, Clone)]
pub struct Topology {
    graph: Graph,
    index: IndexMap,
    windings: Vec<Winding>,
    segments: Vec<Segment>,
    branches: Vec<BranchView>,
    /// turn -> index into `branches`
    turn_branch: Vec<usize>,
    conductors: Vec<Conductor>,
    turn_lengths: Vec<f64>,
    terminals: Vec<ResolvedTerminal>,
}

impl Topology {
    pub(crate) fn new(
        graph: Graph,
        windings: Vec<Winding>,
        segments: Vec<Segment>,
        branches: Vec<BranchView>,
        conductors: Vec<Conductor>,
        terminals: Vec<ResolvedTerminal>,
    ) -> WindingResult<Self> {
        let mut turn_branch = Vec::with_capacity(conductors.len());
        for (b, branch) in branches.iter().enumerate() {
            if branch.first_turn != turn_branch.len() {
                return Err(WindingError::IndexOutOfRange {
                    what: "branch start turn",
                    index: branch.first_turn,
                    len: turn_branch.len(),
                });
            }
            turn_branch.extend(std::iter::repeat(b).take(branch.num_turns));
        }
        if turn_branch.len() != conductors.len() {
            return Err(WindingError::IndexOutOfRange {
                what: "conductor",
                index: turn_branch.len(),
                len: conductors.len(),
            });
        }
        let turn_lengths = conductors.iter().map(Conductor::turn_length).collect();
        let index = IndexMap::from_graph(&graph)?;

        Ok(Self {
            graph,
            index,
            windings,
            segments,
            branches,
            turn_branch,
            conductors,
            turn_lengths,
            terminals,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn num_turns(&self) -> usize {
        self.conductors.len()
    }

    /// Number of live nodes, equal to the solver index range.
    pub fn num_nodes(&self) -> usize {
        self.graph.live_node_count()
    }

    pub fn windings(&self) -> &[Winding] {
        &self.windings
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> WindingResult<&Segment> {
        self.segments.get(id.slot()).ok_or(WindingError::UnknownId {
            what: "segment",
            id: id.index(),
        })
    }

    pub fn segment_by_label(&self, label: &str) -> WindingResult<&Segment> {
        find_unique(&self.segments, label)
    }

    /// Branches in global turn order.
    pub fn branches(&self) -> &[BranchView] {
        &self.branches
    }

    /// Branches of one segment, in turn order.
    pub fn segment_branches(&self, segment: SegmentId) -> impl Iterator<Item = &BranchView> + '_ {
        self.branches.iter().filter(move |b| b.segment == segment)
    }

    pub fn branch_of_turn(&self, turn: usize) -> Option<&BranchView> {
        self.turn_branch.get(turn).map(|&b| &self.branches[b])
    }

    /// Node at the start of `turn`, if the turn opens its branch.
    ///
    /// Interior turn boundaries are not graph nodes.
    pub fn turn_start_node(&self, turn: usize) -> WindingResult<Option<NodeId>> {
        let branch = self.branch_at(turn)?;
        if turn == branch.first_turn {
            Ok(Some(self.graph.entity(branch.entity)?.start()))
        } else {
            Ok(None)
        }
    }

    /// Node at the end of `turn`, if the turn closes its branch.
    pub fn turn_end_node(&self, turn: usize) -> WindingResult<Option<NodeId>> {
        let branch = self.branch_at(turn)?;
        if turn == branch.last_turn() {
            Ok(Some(self.graph.entity(branch.entity)?.end()))
        } else {
            Ok(None)
        }
    }

    fn branch_at(&self, turn: usize) -> WindingResult<&BranchView> {
        self.branch_of_turn(turn)
            .ok_or(WindingError::IndexOutOfRange {
                what: "turn",
                index: turn,
                len: self.num_turns(),
            })
    }

    /// Conductors in global turn order.
    pub fn conductors(&self) -> &[Conductor] {
        &self.conductors
    }

    /// Turn lengths (m) in global turn order.
    pub fn turn_lengths(&self) -> &[f64] {
        &self.turn_lengths
    }

    pub fn terminals(&self) -> &[ResolvedTerminal] {
        &self.terminals
    }

    pub fn terminal(&self, label: &str) -> WindingResult<&ResolvedTerminal> {
        self.terminals
            .iter()
            .find(|t| t.label == label)
            .ok_or_else(|| WindingError::LabelNotFound {
                what: "terminal",
                label: label.to_string(),
            })
    }

    /// The single source terminal; a sweep cannot run without one.
    pub fn source(&self) -> WindingResult<&ResolvedTerminal> {
        self.terminals
            .iter()
            .find(|t| t.kind.is_source())
            .ok_or_else(|| WindingError::Terminals {
                what: "no source terminal".to_string(),
            })
    }

    pub fn loads(&self) -> impl Iterator<Item = &ResolvedTerminal> + '_ {
        self.terminals.iter().filter(|t| !t.kind.is_source())
    }

    /// Solver index of a live node.
    pub fn node_index(&self, node: NodeId) -> WindingResult<usize> {
        Ok(self.index.node_idx(node)?)
    }

    /// Live nodes in solver index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.index
            .node_ids()
            .iter()
            .filter_map(|&id| self.graph.node(id))
    }
}
