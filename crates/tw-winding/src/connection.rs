//! Series and parallel connections between segments and branches.

use tw_core::{EntityId, NodeId, SegmentId};
use tw_graph::Graph;

use crate::error::{WindingError, WindingResult};

/// Something a connection can join: a whole segment or one of its branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectable {
    Segment(SegmentId),
    Branch { segment: SegmentId, index: usize },
}

/// Which members of a winding a connection applies to.
///
/// Resolution order: references, then labels, then indices. The first
/// non-empty selector wins; when all are empty the connection covers every
/// segment of the winding in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub refs: Vec<Connectable>,
    pub labels: Vec<String>,
    pub indices: Vec<usize>,
}

impl Selector {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn refs(refs: impl IntoIterator<Item = Connectable>) -> Self {
        Self {
            refs: refs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Resolve against the winding's segments, given as `(id, label)` in
    /// declaration order.
    pub fn resolve(&self, segments: &[(SegmentId, &str)]) -> WindingResult<Vec<Connectable>> {
        if !self.refs.is_empty() {
            return Ok(self.refs.clone());
        }

        if !self.labels.is_empty() {
            return self
                .labels
                .iter()
                .map(|label| {
                    let matches: Vec<SegmentId> = segments
                        .iter()
                        .filter(|(_, l)| *l == label.as_str())
                        .map(|(id, _)| *id)
                        .collect();
                    match matches.as_slice() {
                        [id] => Ok(Connectable::Segment(*id)),
                        [] => Err(WindingError::LabelNotFound {
                            what: "segment",
                            label: label.clone(),
                        }),
                        _ => Err(WindingError::AmbiguousLabel {
                            what: "segment",
                            label: label.clone(),
                            count: matches.len(),
                        }),
                    }
                })
                .collect();
        }

        if !self.indices.is_empty() {
            return self
                .indices
                .iter()
                .map(|&index| {
                    segments
                        .get(index)
                        .map(|(id, _)| Connectable::Segment(*id))
                        .ok_or(WindingError::IndexOutOfRange {
                            what: "segment",
                            index,
                            len: segments.len(),
                        })
                })
                .collect();
        }

        Ok(segments
            .iter()
            .map(|(id, _)| Connectable::Segment(*id))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Series,
    Parallel,
}

/// A declarative connection rule, applied when the transformer is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalConnection {
    pub kind: ConnectionKind,
    pub selector: Selector,
}

impl InternalConnection {
    pub fn series(selector: Selector) -> Self {
        Self {
            kind: ConnectionKind::Series,
            selector,
        }
    }

    pub fn parallel(selector: Selector) -> Self {
        Self {
            kind: ConnectionKind::Parallel,
            selector,
        }
    }
}

/// Current `(start, end)` nodes of an entity.
fn ends(graph: &Graph, entity: EntityId) -> WindingResult<(NodeId, NodeId)> {
    let e = graph.entity(entity)?;
    Ok((e.start(), e.end()))
}

/// Chain members end-to-start: member `i+1` starts where member `i` ends.
///
/// Fewer than two members is a no-op. Ports are re-read after every union so
/// earlier merges never leave a stale node behind.
pub fn apply_series(graph: &mut Graph, members: &[EntityId]) -> WindingResult<()> {
    if members.len() < 2 {
        return Ok(());
    }
    for pair in members.windows(2) {
        let (_, prev_end) = ends(graph, pair[0])?;
        let (next_start, _) = ends(graph, pair[1])?;
        graph.union(next_start, prev_end)?;
    }
    Ok(())
}

/// Tie every member's start to the first member's start and every end to the
/// first member's end. Fewer than two members is a no-op.
pub fn apply_parallel(graph: &mut Graph, members: &[EntityId]) -> WindingResult<()> {
    if members.len() < 2 {
        return Ok(());
    }
    for &other in &members[1..] {
        let (common_start, _) = ends(graph, members[0])?;
        let (other_start, _) = ends(graph, other)?;
        graph.union(other_start, common_start)?;

        let (_, common_end) = ends(graph, members[0])?;
        let (_, other_end) = ends(graph, other)?;
        graph.union(other_end, common_end)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Id;

    fn segs() -> Vec<(SegmentId, &'static str)> {
        vec![
            (Id::from_index(0), "A"),
            (Id::from_index(1), "B"),
            (Id::from_index(2), "C"),
        ]
    }

    #[test]
    fn default_selector_takes_all_in_order() {
        let resolved = Selector::all().resolve(&segs()).unwrap();
        assert_eq!(
            resolved,
            vec![
                Connectable::Segment(Id::from_index(0)),
                Connectable::Segment(Id::from_index(1)),
                Connectable::Segment(Id::from_index(2)),
            ]
        );
    }

    #[test]
    fn labels_resolve_in_given_order() {
        let resolved = Selector::labels(["C", "A"]).resolve(&segs()).unwrap();
        assert_eq!(
            resolved,
            vec![
                Connectable::Segment(Id::from_index(2)),
                Connectable::Segment(Id::from_index(0)),
            ]
        );
    }

    #[test]
    fn missing_and_ambiguous_labels_fail() {
        assert!(matches!(
            Selector::labels(["Z"]).resolve(&segs()),
            Err(WindingError::LabelNotFound { .. })
        ));
        let mut dup = segs();
        dup.push((Id::from_index(3), "A"));
        assert!(matches!(
            Selector::labels(["A"]).resolve(&dup),
            Err(WindingError::AmbiguousLabel { count: 2, .. })
        ));
    }

    #[test]
    fn index_out_of_range_fails() {
        assert!(matches!(
            Selector::indices([0, 3]).resolve(&segs()),
            Err(WindingError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn refs_take_precedence_over_labels() {
        let sel = Selector {
            refs: vec![Connectable::Branch {
                segment: Id::from_index(1),
                index: 0,
            }],
            labels: vec!["A".into()],
            indices: vec![2],
        };
        assert_eq!(sel.resolve(&segs()).unwrap(), sel.refs);
    }
}
