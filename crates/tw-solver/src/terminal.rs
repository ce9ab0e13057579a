//! Boundary conditions of the multiconductor line: the HA / HB matrices.
//!
//! Every turn has a start and an end terminal. Terminals that meet at one
//! electrical point form a [`BoundaryGroup`]: either an interior turn-to-turn
//! boundary inside a branch, or a live graph node. A group with `k` members
//! contributes `k - 1` voltage ties and one current row, so the boundary
//! block always has `2N` rows for `N` turns.
//!
//! Row order: the source row, all voltage ties, KCL rows of floating groups,
//! load rows. Columns of HA are `[V_start(0..N), V_end(0..N)]`, columns of HB
//! are `[I_start(0..N), I_end(0..N)]`.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use num_complex::Complex64;
use tw_core::NodeId;
use tw_winding::{TerminalKind, Topology};

use crate::error::{SolverError, SolverResult};
use crate::expm::CMatrix;

/// One end of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TurnEnd {
    Start(usize),
    End(usize),
}

impl TurnEnd {
    pub fn turn(self) -> usize {
        match self {
            TurnEnd::Start(t) | TurnEnd::End(t) => t,
        }
    }

    /// Column of this terminal within a `[start(0..N), end(0..N)]` block.
    pub fn column(self, n: usize) -> usize {
        match self {
            TurnEnd::Start(t) => t,
            TurnEnd::End(t) => n + t,
        }
    }

    /// Sign of this terminal's current leaving the group into the line.
    pub fn outflow_sign(self) -> f64 {
        match self {
            TurnEnd::Start(_) => 1.0,
            TurnEnd::End(_) => -1.0,
        }
    }

    /// Position along the winding: start(t) before end(t) before start(t+1).
    fn key(self) -> usize {
        match self {
            TurnEnd::Start(t) => 2 * t,
            TurnEnd::End(t) => 2 * t + 1,
        }
    }
}

/// What is attached to a boundary group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    Floating,
    /// Unit source behind `r + j omega l`.
    Source { r: f64, l: f64 },
    /// `r + j omega l` to ground.
    Load { r: f64, l: f64 },
}

impl Boundary {
    pub fn impedance(&self, omega: f64) -> Complex64 {
        match *self {
            Boundary::Floating => Complex64::new(0.0, 0.0),
            Boundary::Source { r, l } | Boundary::Load { r, l } => Complex64::new(r, omega * l),
        }
    }
}

/// Turn terminals sharing one electrical point.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryGroup {
    /// Sorted along the winding; `members[0]` carries the group voltage.
    pub members: Vec<TurnEnd>,
    pub boundary: Boundary,
    /// The graph node, `None` for a boundary inside a branch.
    pub node: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Source { group: usize },
    Tie { a: TurnEnd, b: TurnEnd },
    Kcl { group: usize },
    Load { group: usize },
}

/// Builds HA once and HB per frequency for a finalized topology.
#[derive(Debug, Clone)]
pub struct TerminalMatrixFactory {
    n: usize,
    groups: Vec<BoundaryGroup>,
    source_group: usize,
    rows: Vec<Row>,
    ha: DMatrix<f64>,
}

impl TerminalMatrixFactory {
    pub fn new(topology: &Topology) -> SolverResult<Self> {
        let n = topology.num_turns();
        if n == 0 {
            return Err(SolverError::Topology {
                what: "topology has no turns".to_string(),
            });
        }
        let groups = boundary_groups(topology)?;

        let source = topology.source()?;
        let source_group = groups
            .iter()
            .position(|g| g.node == Some(source.node))
            .ok_or_else(|| SolverError::Topology {
                what: format!("source '{}' is not on a turn terminal", source.label),
            })?;

        let mut rows = vec![Row::Source {
            group: source_group,
        }];
        for g in &groups {
            for &b in &g.members[1..] {
                rows.push(Row::Tie {
                    a: g.members[0],
                    b,
                });
            }
        }
        for (i, g) in groups.iter().enumerate() {
            if g.boundary == Boundary::Floating {
                rows.push(Row::Kcl { group: i });
            }
        }
        for (i, g) in groups.iter().enumerate() {
            if matches!(g.boundary, Boundary::Load { .. }) {
                rows.push(Row::Load { group: i });
            }
        }
        if rows.len() != 2 * n {
            return Err(SolverError::Topology {
                what: format!("{} boundary rows for {} turns", rows.len(), n),
            });
        }

        let mut ha = DMatrix::<f64>::zeros(2 * n, 2 * n);
        for (r, row) in rows.iter().enumerate() {
            match *row {
                Row::Source { group } | Row::Load { group } => {
                    ha[(r, groups[group].members[0].column(n))] = 1.0;
                }
                Row::Tie { a, b } => {
                    ha[(r, a.column(n))] = 1.0;
                    ha[(r, b.column(n))] = -1.0;
                }
                Row::Kcl { .. } => {}
            }
        }

        Ok(Self {
            n,
            groups,
            source_group,
            rows,
            ha,
        })
    }

    pub fn num_turns(&self) -> usize {
        self.n
    }

    pub fn groups(&self) -> &[BoundaryGroup] {
        &self.groups
    }

    pub fn source_group(&self) -> &BoundaryGroup {
        &self.groups[self.source_group]
    }

    /// Voltage coefficients of the boundary rows (`2N x 2N`).
    pub fn ha(&self) -> &DMatrix<f64> {
        &self.ha
    }

    /// Current coefficients of the boundary rows at angular frequency `omega`.
    pub fn hb(&self, omega: f64) -> CMatrix {
        let n = self.n;
        let mut hb = CMatrix::zeros(2 * n, 2 * n);
        for (r, row) in self.rows.iter().enumerate() {
            match *row {
                Row::Source { group } | Row::Load { group } => {
                    // source: V + Zs * (sum I_start - sum I_end) = 1
                    // load:   V - Zl * (sum I_end - sum I_start) = 0
                    let g = &self.groups[group];
                    let z = g.boundary.impedance(omega);
                    for &m in &g.members {
                        hb[(r, m.column(n))] = z * m.outflow_sign();
                    }
                }
                Row::Kcl { group } => {
                    for &m in &self.groups[group].members {
                        hb[(r, m.column(n))] = Complex64::new(-m.outflow_sign(), 0.0);
                    }
                }
                Row::Tie { .. } => {}
            }
        }
        hb
    }
}

/// Collect the boundary groups of a topology, sorted along the winding.
pub fn boundary_groups(topology: &Topology) -> SolverResult<Vec<BoundaryGroup>> {
    let graph = topology.graph();
    let mut at_node: BTreeMap<NodeId, Vec<TurnEnd>> = BTreeMap::new();
    let mut groups = Vec::new();

    for branch in topology.branches() {
        let entity = graph.entity(branch.entity)?;
        at_node
            .entry(entity.start())
            .or_default()
            .push(TurnEnd::Start(branch.first_turn));
        at_node
            .entry(entity.end())
            .or_default()
            .push(TurnEnd::End(branch.last_turn()));
        for t in branch.first_turn..branch.last_turn() {
            groups.push(BoundaryGroup {
                members: vec![TurnEnd::End(t), TurnEnd::Start(t + 1)],
                boundary: Boundary::Floating,
                node: None,
            });
        }
    }

    for (node, mut members) in at_node {
        members.sort_by_key(|m| m.key());
        let boundary = match topology.terminals().iter().find(|t| t.node == node) {
            None => Boundary::Floating,
            Some(t) => {
                let (r, l) = t.kind.impedance().si();
                match t.kind {
                    TerminalKind::Source(_) => Boundary::Source { r, l },
                    TerminalKind::Load(_) => Boundary::Load { r, l },
                }
            }
        };
        groups.push(BoundaryGroup {
            members,
            boundary,
            node: Some(node),
        });
    }

    groups.sort_by_key(|g| g.members[0].key());
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::{henry, ohm};
    use tw_winding::geometry::{ConductorSize, HelicalGeometry, WindingGeometry};
    use tw_winding::{
        InternalConnection, Selector, Terminal, TerminalImpedance, TerminalLocation, Transformer,
    };

    fn helix(turns: usize, z0: f64) -> WindingGeometry {
        WindingGeometry::Helical(HelicalGeometry {
            inner_radius_m: 0.3,
            z_bottom_m: z0,
            num_turns: turns,
            conductor: ConductorSize {
                width_m: 0.003,
                height_m: 0.01,
            },
            turn_gap_m: 0.002,
        })
    }

    /// `segments` helices chained in series, source at the first start and a
    /// load at the last end.
    fn chain(segments: usize, turns: usize, load: TerminalImpedance) -> Topology {
        let mut t = Transformer::new();
        let w = t.add_winding("HV").unwrap();
        let mut labels = Vec::new();
        for s in 0..segments {
            let label = format!("S{s}");
            t.add_segment(w, label.clone(), helix(turns, s as f64 * 0.1), vec![])
                .unwrap();
            labels.push(label);
        }
        t.add_connection(w, InternalConnection::series(Selector::all()))
            .unwrap();
        t.add_terminal(Terminal::source(
            "IN",
            TerminalLocation::SegmentStart {
                segment: labels[0].clone(),
            },
            TerminalImpedance::new(ohm(5.0), henry(0.0)),
        ))
        .unwrap();
        t.add_terminal(Terminal::load(
            "OUT",
            TerminalLocation::SegmentEnd {
                segment: labels[segments - 1].clone(),
            },
            load,
        ))
        .unwrap();
        t.finalize().unwrap()
    }

    #[test]
    fn chain_layout_matches_shifted_identity() {
        let n = 6;
        // two segments of three turns: the series joint is a graph node
        let topo = chain(2, 3, TerminalImpedance::new(ohm(50.0), henry(1e-3)));
        let f = TerminalMatrixFactory::new(&topo).unwrap();
        let ha = f.ha();

        assert_eq!(ha.shape(), (2 * n, 2 * n));
        // source row: identity on V_start(0)
        assert_eq!(ha[(0, 0)], 1.0);
        assert_eq!(ha.row(0).iter().filter(|v| **v != 0.0).count(), 1);
        // ties: +1 on V_end(t), -1 on V_start(t+1)
        for t in 0..n - 1 {
            let r = 1 + t;
            assert_eq!(ha[(r, n + t)], 1.0);
            assert_eq!(ha[(r, t + 1)], -1.0);
        }
        // current rows have no voltage part
        for r in n..2 * n - 1 {
            assert!(ha.row(r).iter().all(|v| *v == 0.0));
        }
        // load row: identity on V_end(N-1)
        assert_eq!(ha[(2 * n - 1, 2 * n - 1)], 1.0);

        let omega = 1000.0;
        let hb = f.hb(omega);
        assert_eq!(hb[(0, 0)], Complex64::new(5.0, 0.0));
        for t in 0..n - 1 {
            let r = n + t;
            assert_eq!(hb[(r, n + t)], Complex64::new(1.0, 0.0));
            assert_eq!(hb[(r, t + 1)], Complex64::new(-1.0, 0.0));
        }
        assert_eq!(
            hb[(2 * n - 1, 2 * n - 1)],
            -Complex64::new(50.0, omega * 1e-3)
        );
        for r in 1..n {
            assert!(hb.row(r).iter().all(|v| v.norm() == 0.0));
        }
    }

    #[test]
    fn groups_cover_every_terminal_once() {
        let topo = chain(3, 4, TerminalImpedance::short());
        let groups = boundary_groups(&topo).unwrap();
        let mut seen: Vec<TurnEnd> = groups.iter().flat_map(|g| g.members.clone()).collect();
        seen.sort();
        let mut expected: Vec<TurnEnd> = (0..12)
            .flat_map(|t| [TurnEnd::Start(t), TurnEnd::End(t)])
            .collect();
        expected.sort();
        assert_eq!(seen, expected);
        assert_eq!(
            groups
                .iter()
                .filter(|g| matches!(g.boundary, Boundary::Source { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn parallel_node_gets_one_kcl_row() {
        let mut t = Transformer::new();
        let w = t.add_winding("LV").unwrap();
        t.add_segment(w, "A", helix(2, 0.0), vec![]).unwrap();
        t.add_segment(w, "B", helix(2, 0.1), vec![]).unwrap();
        t.add_connection(w, InternalConnection::parallel(Selector::all()))
            .unwrap();
        t.add_terminal(Terminal::source(
            "IN",
            TerminalLocation::SegmentStart {
                segment: "A".into(),
            },
            TerminalImpedance::short(),
        ))
        .unwrap();
        let topo = t.finalize().unwrap();
        let f = TerminalMatrixFactory::new(&topo).unwrap();

        // source node holds start(0) and start(2): one tie plus the source row
        let src = f.source_group();
        assert_eq!(src.members, vec![TurnEnd::Start(0), TurnEnd::Start(2)]);
        assert_eq!(f.ha().nrows(), 8);

        let hb = f.hb(1.0);
        // rows: source, 4 ties, then KCL for the groups at keys 1, 3, 5;
        // the shared far end (key 3) is floating and sums both end currents
        let far = hb.row(6);
        assert_eq!(far[4 + 1], Complex64::new(1.0, 0.0));
        assert_eq!(far[4 + 3], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn missing_source_is_a_topology_error() {
        let mut t = Transformer::new();
        let w = t.add_winding("W").unwrap();
        t.add_segment(w, "S", helix(3, 0.0), vec![]).unwrap();
        let topo = t.finalize().unwrap();
        assert!(matches!(
            TerminalMatrixFactory::new(&topo),
            Err(SolverError::Winding(_))
        ));
    }
}
