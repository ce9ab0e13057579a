//! Tap definitions and splitting a segment into branches.

use tw_core::{EntityId, NodeId, SegmentId};
use tw_graph::{EntityKind, Graph};

use crate::error::{WindingError, WindingResult};

/// A labelled connection point after a given turn.
///
/// `turn` is 1-based: a tap at turn 25 sits between turns 25 and 26, so the
/// branch before it holds 25 turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapDefinition {
    pub label: String,
    pub turn: usize,
}

impl TapDefinition {
    pub fn new(label: impl Into<String>, turn: usize) -> Self {
        Self {
            label: label.into(),
            turn,
        }
    }
}

/// Check that taps are strictly increasing, interior, and uniquely labelled.
pub fn validate_taps(segment: &str, num_turns: usize, taps: &[TapDefinition]) -> WindingResult<()> {
    let err = |what: String| WindingError::InvalidTap {
        segment: segment.to_string(),
        what,
    };

    let mut prev = 0;
    for (i, tap) in taps.iter().enumerate() {
        if tap.turn == 0 || tap.turn >= num_turns {
            return Err(err(format!(
                "tap '{}' at turn {} leaves a zero-length branch (segment has {} turns)",
                tap.label, tap.turn, num_turns
            )));
        }
        if i > 0 && tap.turn <= prev {
            return Err(err(format!(
                "tap '{}' at turn {} does not follow turn {}",
                tap.label, tap.turn, prev
            )));
        }
        if taps[..i].iter().any(|t| t.label == tap.label) {
            return Err(WindingError::DuplicateLabel {
                label: tap.label.clone(),
                context: format!("taps of segment '{segment}'"),
            });
        }
        prev = tap.turn;
    }
    Ok(())
}

/// `(start_turn, num_turns)` for each branch of a tapped segment.
pub fn branch_ranges(num_turns: usize, taps: &[TapDefinition]) -> Vec<(usize, usize)> {
    let mut bounds = Vec::with_capacity(taps.len() + 2);
    bounds.push(0);
    bounds.extend(taps.iter().map(|t| t.turn));
    bounds.push(num_turns);
    bounds.windows(2).map(|w| (w[0], w[1] - w[0])).collect()
}

/// Branch and segment entities created for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSegment {
    /// Branch entities in turn order.
    pub branches: Vec<EntityId>,
    /// The whole-segment entity (aggregate start and end).
    pub segment_entity: EntityId,
}

/// Create nodes and register branch and segment entities for one segment.
///
/// Consecutive branches share one node at each tap boundary. Taps must have
/// been validated.
pub fn split_segment(
    graph: &mut Graph,
    segment: SegmentId,
    num_turns: usize,
    taps: &[TapDefinition],
) -> WindingResult<SplitSegment> {
    let ranges = branch_ranges(num_turns, taps);
    let nodes: Vec<NodeId> = (0..=ranges.len()).map(|_| graph.create_node()).collect();

    let mut branches = Vec::with_capacity(ranges.len());
    for (index, &(start_turn, count)) in ranges.iter().enumerate() {
        let kind = EntityKind::Branch {
            segment,
            index,
            start_turn,
            num_turns: count,
        };
        branches.push(graph.register(kind, vec![nodes[index], nodes[index + 1]])?);
    }

    let segment_entity = graph.register(
        EntityKind::Segment { segment },
        vec![nodes[0], nodes[ranges.len()]],
    )?;

    Ok(SplitSegment {
        branches,
        segment_entity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Id;
    use tw_graph::ConnectedEntity;

    fn taps(turns: &[usize]) -> Vec<TapDefinition> {
        turns
            .iter()
            .enumerate()
            .map(|(i, &t)| TapDefinition::new(format!("T{i}"), t))
            .collect()
    }

    #[test]
    fn ranges_without_taps() {
        assert_eq!(branch_ranges(10, &[]), vec![(0, 10)]);
    }

    #[test]
    fn ranges_with_taps() {
        assert_eq!(
            branch_ranges(100, &taps(&[25, 50, 75])),
            vec![(0, 25), (25, 25), (50, 25), (75, 25)]
        );
    }

    #[test]
    fn rejects_degenerate_taps() {
        assert!(validate_taps("S", 10, &taps(&[0])).is_err());
        assert!(validate_taps("S", 10, &taps(&[10])).is_err());
        assert!(validate_taps("S", 10, &taps(&[11])).is_err());
        assert!(validate_taps("S", 10, &taps(&[4, 4])).is_err());
        assert!(validate_taps("S", 10, &taps(&[6, 4])).is_err());
        assert!(validate_taps("S", 10, &taps(&[3, 6, 9])).is_ok());
    }

    #[test]
    fn rejects_duplicate_tap_labels() {
        let t = vec![TapDefinition::new("X", 2), TapDefinition::new("X", 5)];
        assert!(matches!(
            validate_taps("S", 10, &t),
            Err(WindingError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn split_links_branches_end_to_start() {
        let mut g = Graph::new();
        let split = split_segment(&mut g, Id::from_index(0), 9, &taps(&[3, 6])).unwrap();
        assert_eq!(split.branches.len(), 3);
        for pair in split.branches.windows(2) {
            let a = g.entity(pair[0]).unwrap();
            let b = g.entity(pair[1]).unwrap();
            assert_eq!(a.end(), b.start());
        }
        let seg = g.entity(split.segment_entity).unwrap();
        assert_eq!(seg.start(), g.entity(split.branches[0]).unwrap().start());
        assert_eq!(seg.end(), g.entity(split.branches[2]).unwrap().end());
        assert_eq!(seg.ports().len(), 2);
        assert_eq!(g.live_node_count(), 4);
    }
}
