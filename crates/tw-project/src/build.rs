//! Conversion from a validated project into library types.

use tw_core::{henry, hz, ohm};
use tw_rlc::{AnalyticConfig, InductanceMethod};
use tw_solver::{LumpedConfig, ModelKind, MtlConfig, SweepConfig};
use tw_winding::geometry::{
    ConductorSize, DiscGeometry, HelicalGeometry, InterleavedDiscGeometry, LayerGeometry,
    MultiStartGeometry, WindingGeometry,
};
use tw_winding::{
    Connectable, InternalConnection, Selector, TapDefinition, Terminal, TerminalImpedance,
    TerminalLocation, Transformer,
};

use crate::ProjectResult;
use crate::schema::{
    ConductorDef, ConnectionDef, ConnectionKindDef, GeometryDef, InductanceDef, LocationDef,
    ModelKindDef, Project, TerminalDef, TerminalKindDef,
};

fn conductor(c: ConductorDef) -> ConductorSize {
    ConductorSize {
        width_m: c.width_m,
        height_m: c.height_m,
    }
}

pub fn geometry(def: &GeometryDef) -> WindingGeometry {
    match *def {
        GeometryDef::Disc {
            inner_radius_m,
            z_bottom_m,
            num_discs,
            turns_per_disc,
            conductor: c,
            turn_gap_m,
            disc_gap_m,
        } => WindingGeometry::Disc(DiscGeometry {
            inner_radius_m,
            z_bottom_m,
            num_discs,
            turns_per_disc,
            conductor: conductor(c),
            turn_gap_m,
            disc_gap_m,
        }),
        GeometryDef::Helical {
            inner_radius_m,
            z_bottom_m,
            num_turns,
            conductor: c,
            turn_gap_m,
        } => WindingGeometry::Helical(HelicalGeometry {
            inner_radius_m,
            z_bottom_m,
            num_turns,
            conductor: conductor(c),
            turn_gap_m,
        }),
        GeometryDef::Layer {
            inner_radius_m,
            z_bottom_m,
            num_layers,
            turns_per_layer,
            conductor: c,
            turn_gap_m,
            layer_gap_m,
        } => WindingGeometry::Layer(LayerGeometry {
            inner_radius_m,
            z_bottom_m,
            num_layers,
            turns_per_layer,
            conductor: conductor(c),
            turn_gap_m,
            layer_gap_m,
        }),
        GeometryDef::MultiStart {
            inner_radius_m,
            z_bottom_m,
            num_starts,
            turns_per_start,
            conductor: c,
            turn_gap_m,
        } => WindingGeometry::MultiStart(MultiStartGeometry {
            inner_radius_m,
            z_bottom_m,
            num_starts,
            turns_per_start,
            conductor: conductor(c),
            turn_gap_m,
        }),
        GeometryDef::InterleavedDisc {
            inner_radius_m,
            z_bottom_m,
            num_disc_pairs,
            turns_per_disc,
            conductor: c,
            turn_gap_m,
            disc_gap_m,
        } => WindingGeometry::InterleavedDisc(InterleavedDiscGeometry {
            inner_radius_m,
            z_bottom_m,
            num_disc_pairs,
            turns_per_disc,
            conductor: conductor(c),
            turn_gap_m,
            disc_gap_m,
        }),
    }
}

fn location(def: &LocationDef) -> TerminalLocation {
    match def {
        LocationDef::SegmentStart { segment } => TerminalLocation::SegmentStart {
            segment: segment.clone(),
        },
        LocationDef::SegmentEnd { segment } => TerminalLocation::SegmentEnd {
            segment: segment.clone(),
        },
        LocationDef::Tap { segment, tap } => TerminalLocation::Tap {
            segment: segment.clone(),
            tap: tap.clone(),
        },
    }
}

fn terminal(def: &TerminalDef) -> Terminal {
    let z = TerminalImpedance::new(ohm(def.resistance_ohm), henry(def.inductance_h));
    let at = location(&def.location);
    match def.kind {
        TerminalKindDef::Source => Terminal::source(def.label.clone(), at, z),
        TerminalKindDef::Load => Terminal::load(def.label.clone(), at, z),
        TerminalKindDef::Ground => Terminal::ground(def.label.clone(), at),
    }
}

/// Build the (unfinalized) transformer described by a project.
pub fn build_transformer(project: &Project) -> ProjectResult<Transformer> {
    let mut t = Transformer::new();
    for w in &project.windings {
        let winding = t.add_winding(w.label.clone())?;
        let mut ids = Vec::with_capacity(w.segments.len());
        for s in &w.segments {
            let taps = s
                .taps
                .iter()
                .map(|tap| TapDefinition::new(tap.label.clone(), tap.turn))
                .collect();
            let id = t.add_segment(winding, s.label.clone(), geometry(&s.geometry), taps)?;
            ids.push((s.label.as_str(), id));
        }
        for c in &w.connections {
            t.add_connection(winding, connection(c, &ids))?;
        }
    }
    for def in &project.terminals {
        t.add_terminal(terminal(def))?;
    }
    Ok(t)
}

fn connection(def: &ConnectionDef, ids: &[(&str, tw_core::SegmentId)]) -> InternalConnection {
    let refs: Vec<Connectable> = def
        .branches
        .iter()
        .filter_map(|b| {
            ids.iter()
                .find(|(label, _)| *label == b.segment)
                .map(|&(_, segment)| Connectable::Branch {
                    segment,
                    index: b.index,
                })
        })
        .collect();
    let selector = Selector {
        refs,
        labels: def.segments.clone(),
        indices: def.indices.clone(),
    };
    match def.kind {
        ConnectionKindDef::Series => InternalConnection::series(selector),
        ConnectionKindDef::Parallel => InternalConnection::parallel(selector),
    }
}

pub fn analytic_config(project: &Project) -> AnalyticConfig {
    let m = &project.material;
    AnalyticConfig {
        resistivity_ohm_m: m.resistivity_ohm_m,
        relative_permittivity: m.relative_permittivity,
        core_radius_m: m.core_radius_m,
        inductance: match m.inductance {
            InductanceDef::Elliptic => InductanceMethod::Elliptic,
            InductanceDef::Neumann { points } => InductanceMethod::Neumann { points },
        },
        ..AnalyticConfig::default()
    }
}

pub fn sweep_config(project: &Project) -> SweepConfig {
    let s = &project.sweep;
    SweepConfig {
        min_freq: hz(s.min_freq_hz),
        max_freq: hz(s.max_freq_hz),
        num_steps: s.num_steps,
        parallelism: s.parallelism,
    }
}

pub fn model_kind(project: &Project) -> ModelKind {
    match project.model.kind {
        ModelKindDef::Mtl => ModelKind::Mtl,
        ModelKindDef::Lumped => ModelKind::Lumped,
    }
}

pub fn mtl_config(project: &Project) -> MtlConfig {
    MtlConfig {
        loss_tangent: project.material.loss_tangent,
    }
}

pub fn lumped_config(project: &Project) -> LumpedConfig {
    LumpedConfig {
        loss_tangent: project.material.loss_tangent,
        max_condition: project.model.max_condition,
    }
}
