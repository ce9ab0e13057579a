//! Transformer builder: windings, segments, connections and terminals.

use tracing::debug;
use tw_core::{EntityId, NodeId, SegmentId, WindingId};
use tw_graph::{EntityKind, Graph};

use crate::connection::{apply_parallel, apply_series, Connectable, ConnectionKind, InternalConnection};
use crate::error::{WindingError, WindingResult};
use crate::geometry::WindingGeometry;
use crate::segment::Segment;
use crate::tap::{split_segment, SplitSegment, TapDefinition};
use crate::terminal::{ResolvedTerminal, Terminal, TerminalLocation};
use crate::topology::{BranchView, Topology};

/// A named group of segments plus the connection rules between them.
#[derive(Debug, Clone)]
pub struct Winding {
    id: WindingId,
    label: String,
    segments: Vec<SegmentId>,
    connections: Vec<InternalConnection>,
}

impl Winding {
    pub fn id(&self) -> WindingId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Segments in declaration order.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn connections(&self) -> &[InternalConnection] {
        &self.connections
    }
}

/// Mutable description of a transformer, consumed by [`Transformer::finalize`].
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    windings: Vec<Winding>,
    segments: Vec<Segment>,
    terminals: Vec<Terminal>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_winding(&mut self, label: impl Into<String>) -> WindingResult<WindingId> {
        let label = label.into();
        if self.windings.iter().any(|w| w.label == label) {
            return Err(WindingError::DuplicateLabel {
                label,
                context: "windings".to_string(),
            });
        }
        let id = WindingId::from_index(self.windings.len() as u32);
        self.windings.push(Winding {
            id,
            label,
            segments: Vec::new(),
            connections: Vec::new(),
        });
        Ok(id)
    }

    /// Append a segment to a winding. Geometry and taps are checked here.
    pub fn add_segment(
        &mut self,
        winding: WindingId,
        label: impl Into<String>,
        geometry: WindingGeometry,
        taps: Vec<TapDefinition>,
    ) -> WindingResult<SegmentId> {
        let slot = self.winding_slot(winding)?;
        let id = SegmentId::from_index(self.segments.len() as u32);
        let segment = Segment::new(id, winding, label.into(), geometry, taps)?;
        self.segments.push(segment);
        self.windings[slot].segments.push(id);
        Ok(id)
    }

    pub fn add_connection(
        &mut self,
        winding: WindingId,
        connection: InternalConnection,
    ) -> WindingResult<()> {
        let slot = self.winding_slot(winding)?;
        self.windings[slot].connections.push(connection);
        Ok(())
    }

    pub fn add_terminal(&mut self, terminal: Terminal) -> WindingResult<()> {
        if self.terminals.iter().any(|t| t.label == terminal.label) {
            return Err(WindingError::DuplicateLabel {
                label: terminal.label,
                context: "terminals".to_string(),
            });
        }
        self.terminals.push(terminal);
        Ok(())
    }

    pub fn windings(&self) -> &[Winding] {
        &self.windings
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    pub fn segment(&self, id: SegmentId) -> WindingResult<&Segment> {
        self.segments.get(id.slot()).ok_or(WindingError::UnknownId {
            what: "segment",
            id: id.index(),
        })
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> WindingResult<&mut Segment> {
        self.segments
            .get_mut(id.slot())
            .ok_or(WindingError::UnknownId {
                what: "segment",
                id: id.index(),
            })
    }

    /// Total turns over all segments.
    pub fn num_turns(&self) -> usize {
        self.segments.iter().map(Segment::num_turns).sum()
    }

    fn winding_slot(&self, id: WindingId) -> WindingResult<usize> {
        if id.slot() < self.windings.len() {
            Ok(id.slot())
        } else {
            Err(WindingError::UnknownId {
                what: "winding",
                id: id.index(),
            })
        }
    }

    /// Build the electrical graph and freeze the description.
    ///
    /// Order: split every segment into branches, apply each winding's
    /// connections in declaration order, attach terminals, number the live
    /// nodes and validate the graph.
    pub fn finalize(mut self) -> WindingResult<Topology> {
        let mut graph = Graph::new();

        // Global turn order: windings, then their segments, then turns.
        let order: Vec<SegmentId> = self
            .windings
            .iter()
            .flat_map(|w| w.segments.iter().copied())
            .collect();

        let mut splits: Vec<Option<SplitSegment>> = vec![None; self.segments.len()];
        let mut branches = Vec::new();
        let mut conductors = Vec::new();
        let mut offset = 0;
        for &id in &order {
            let segment = &mut self.segments[id.slot()];
            let split = split_segment(&mut graph, id, segment.num_turns(), segment.taps())?;
            for (index, &entity) in split.branches.iter().enumerate() {
                let e = graph.entity(entity)?;
                if let EntityKind::Branch {
                    start_turn,
                    num_turns,
                    ..
                } = *e.kind()
                {
                    branches.push(BranchView {
                        entity,
                        segment: id,
                        index,
                        first_turn: offset + start_turn,
                        num_turns,
                    });
                }
            }
            conductors.extend_from_slice(segment.conductors());
            offset += segment.num_turns();
            splits[id.slot()] = Some(split);
        }

        for winding in &self.windings {
            let members: Vec<(SegmentId, &str)> = winding
                .segments
                .iter()
                .map(|&id| (id, self.segments[id.slot()].label()))
                .collect();
            for connection in &winding.connections {
                let resolved = connection.selector.resolve(&members)?;
                let entities = resolved
                    .iter()
                    .map(|c| entity_for(&splits, *c))
                    .collect::<WindingResult<Vec<EntityId>>>()?;
                match connection.kind {
                    ConnectionKind::Series => apply_series(&mut graph, &entities)?,
                    ConnectionKind::Parallel => apply_parallel(&mut graph, &entities)?,
                }
            }
        }

        let mut terminals: Vec<ResolvedTerminal> = Vec::with_capacity(self.terminals.len());
        for terminal in &self.terminals {
            let target = self.locate(&graph, &splits, &terminal.location)?;
            let external = graph.create_tagged_node(terminal.label.clone());
            let node = graph.union(external, target)?;
            if let Some(other) = terminals.iter().find(|t| t.node == node) {
                return Err(WindingError::Terminals {
                    what: format!(
                        "terminals '{}' and '{}' attach to the same node",
                        other.label, terminal.label
                    ),
                });
            }
            terminals.push(ResolvedTerminal {
                label: terminal.label.clone(),
                node,
                kind: terminal.kind,
            });
        }
        let sources = terminals.iter().filter(|t| t.kind.is_source()).count();
        if sources > 1 {
            return Err(WindingError::Terminals {
                what: format!("{sources} source terminals declared, at most one allowed"),
            });
        }

        let num_nodes = graph.assign_solver_indices();
        graph.validate()?;

        debug!(
            windings = self.windings.len(),
            segments = self.segments.len(),
            branches = branches.len(),
            turns = offset,
            nodes = num_nodes,
            terminals = terminals.len(),
            "transformer finalized"
        );

        Topology::new(
            graph,
            self.windings,
            self.segments,
            branches,
            conductors,
            terminals,
        )
    }

    /// Live node a terminal location currently refers to.
    fn locate(
        &self,
        graph: &Graph,
        splits: &[Option<SplitSegment>],
        location: &TerminalLocation,
    ) -> WindingResult<NodeId> {
        let segment = find_unique(&self.segments, location.segment())?;
        let split = split_of(splits, segment.id())?;
        let node = match location {
            TerminalLocation::SegmentStart { .. } => graph.entity(split.segment_entity)?.start(),
            TerminalLocation::SegmentEnd { .. } => graph.entity(split.segment_entity)?.end(),
            TerminalLocation::Tap { tap, .. } => {
                let k = segment
                    .taps()
                    .iter()
                    .position(|t| &t.label == tap)
                    .ok_or_else(|| WindingError::LabelNotFound {
                        what: "tap",
                        label: format!("{}:{}", segment.label(), tap),
                    })?;
                // Tap k sits between branch k and branch k+1.
                graph.entity(split.branches[k])?.end()
            }
        };
        Ok(node)
    }
}

/// The single segment carrying `label`; several matches are an error.
pub(crate) fn find_unique<'a>(segments: &'a [Segment], label: &str) -> WindingResult<&'a Segment> {
    let mut matches = segments.iter().filter(|s| s.label() == label);
    match (matches.next(), matches.count()) {
        (Some(s), 0) => Ok(s),
        (None, _) => Err(WindingError::LabelNotFound {
            what: "segment",
            label: label.to_string(),
        }),
        (Some(_), rest) => Err(WindingError::AmbiguousLabel {
            what: "segment",
            label: label.to_string(),
            count: rest + 1,
        }),
    }
}

fn split_of(splits: &[Option<SplitSegment>], id: SegmentId) -> WindingResult<&SplitSegment> {
    splits
        .get(id.slot())
        .and_then(Option::as_ref)
        .ok_or(WindingError::UnknownId {
            what: "segment",
            id: id.index(),
        })
}

fn entity_for(splits: &[Option<SplitSegment>], target: Connectable) -> WindingResult<EntityId> {
    match target {
        Connectable::Segment(id) => Ok(split_of(splits, id)?.segment_entity),
        Connectable::Branch { segment, index } => {
            let split = split_of(splits, segment)?;
            split
                .branches
                .get(index)
                .copied()
                .ok_or(WindingError::IndexOutOfRange {
                    what: "branch",
                    index,
                    len: split.branches.len(),
                })
        }
    }
}
