//! Project schema definitions.
//!
//! Everything is stored in SI base units with the unit in the field name.

use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub material: MaterialDef,
    #[serde(default)]
    pub windings: Vec<WindingDef>,
    #[serde(default)]
    pub terminals: Vec<TerminalDef>,
    #[serde(default)]
    pub sweep: SweepDef,
    #[serde(default)]
    pub model: ModelDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    #[serde(default = "default_resistivity")]
    pub resistivity_ohm_m: f64,
    #[serde(default = "default_permittivity")]
    pub relative_permittivity: f64,
    #[serde(default = "default_loss_tangent")]
    pub loss_tangent: f64,
    #[serde(default = "default_core_radius")]
    pub core_radius_m: f64,
    #[serde(default)]
    pub inductance: InductanceDef,
}

fn default_resistivity() -> f64 {
    1.72e-8
}

fn default_permittivity() -> f64 {
    3.5
}

fn default_loss_tangent() -> f64 {
    0.005
}

fn default_core_radius() -> f64 {
    0.1
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            resistivity_ohm_m: default_resistivity(),
            relative_permittivity: default_permittivity(),
            loss_tangent: default_loss_tangent(),
            core_radius_m: default_core_radius(),
            inductance: InductanceDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InductanceDef {
    #[default]
    Elliptic,
    Neumann {
        points: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindingDef {
    pub label: String,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentDef {
    pub label: String,
    pub geometry: GeometryDef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taps: Vec<TapDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConductorDef {
    pub width_m: f64,
    pub height_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryDef {
    Disc {
        inner_radius_m: f64,
        #[serde(default)]
        z_bottom_m: f64,
        num_discs: usize,
        turns_per_disc: usize,
        conductor: ConductorDef,
        turn_gap_m: f64,
        disc_gap_m: f64,
    },
    Helical {
        inner_radius_m: f64,
        #[serde(default)]
        z_bottom_m: f64,
        num_turns: usize,
        conductor: ConductorDef,
        turn_gap_m: f64,
    },
    Layer {
        inner_radius_m: f64,
        #[serde(default)]
        z_bottom_m: f64,
        num_layers: usize,
        turns_per_layer: usize,
        conductor: ConductorDef,
        turn_gap_m: f64,
        layer_gap_m: f64,
    },
    MultiStart {
        inner_radius_m: f64,
        #[serde(default)]
        z_bottom_m: f64,
        num_starts: usize,
        turns_per_start: usize,
        conductor: ConductorDef,
        turn_gap_m: f64,
    },
    InterleavedDisc {
        inner_radius_m: f64,
        #[serde(default)]
        z_bottom_m: f64,
        num_disc_pairs: usize,
        turns_per_disc: usize,
        conductor: ConductorDef,
        turn_gap_m: f64,
        disc_gap_m: f64,
    },
}

/// Tap after a 1-based turn of its segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TapDef {
    pub label: String,
    pub turn: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKindDef {
    Series,
    Parallel,
}

/// A connection inside one winding.
///
/// Members are taken from the first non-empty list of `branches`,
/// `segments`, `indices`; with all three empty every segment of the winding
/// takes part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub kind: ConnectionKindDef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchRefDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchRefDef {
    pub segment: String,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminalKindDef {
    Source,
    Load,
    /// A load with zero impedance.
    Ground,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum LocationDef {
    SegmentStart { segment: String },
    SegmentEnd { segment: String },
    Tap { segment: String, tap: String },
}

impl LocationDef {
    pub fn segment(&self) -> &str {
        match self {
            LocationDef::SegmentStart { segment }
            | LocationDef::SegmentEnd { segment }
            | LocationDef::Tap { segment, .. } => segment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminalDef {
    pub label: String,
    pub kind: TerminalKindDef,
    pub location: LocationDef,
    #[serde(default)]
    pub resistance_ohm: f64,
    #[serde(default)]
    pub inductance_h: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub min_freq_hz: f64,
    pub max_freq_hz: f64,
    pub num_steps: usize,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_parallelism() -> usize {
    1
}

impl Default for SweepDef {
    fn default() -> Self {
        Self {
            min_freq_hz: 1.0e3,
            max_freq_hz: 1.0e7,
            num_steps: 100,
            parallelism: default_parallelism(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKindDef {
    #[default]
    Mtl,
    Lumped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    #[serde(default)]
    pub kind: ModelKindDef,
    /// Condition limit of the lumped model.
    #[serde(default = "default_max_condition")]
    pub max_condition: f64,
}

fn default_max_condition() -> f64 {
    1.0e15
}

impl Default for ModelDef {
    fn default() -> Self {
        Self {
            kind: ModelKindDef::default(),
            max_condition: default_max_condition(),
        }
    }
}
