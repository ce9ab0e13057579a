//! Axisymmetric conductor layout for the supported winding kinds.
//!
//! Every kind places one conductor per turn in the (r, z) half plane and
//! returns the conductors in electrical turn order. Positions are conductor
//! centres in metres.

use std::f64::consts::PI;

/// Rectangular conductor cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductorSize {
    /// Radial extent (m).
    pub width_m: f64,
    /// Axial extent (m).
    pub height_m: f64,
}

/// One conductor (one turn) of a winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conductor {
    /// Centre radius (m).
    pub r_m: f64,
    /// Centre height (m).
    pub z_m: f64,
    pub width_m: f64,
    pub height_m: f64,
}

impl Conductor {
    /// Length of the circular turn through the conductor centre.
    pub fn turn_length(&self) -> f64 {
        2.0 * PI * self.r_m
    }

    pub fn area(&self) -> f64 {
        self.width_m * self.height_m
    }

    pub fn r_inner(&self) -> f64 {
        self.r_m - 0.5 * self.width_m
    }

    pub fn r_outer(&self) -> f64 {
        self.r_m + 0.5 * self.width_m
    }

    pub fn z_bottom(&self) -> f64 {
        self.z_m - 0.5 * self.height_m
    }

    pub fn z_top(&self) -> f64 {
        self.z_m + 0.5 * self.height_m
    }
}

/// Continuous disc winding: discs stacked axially, turns spiral radially and
/// reverse direction on every disc.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscGeometry {
    pub inner_radius_m: f64,
    pub z_bottom_m: f64,
    pub num_discs: usize,
    pub turns_per_disc: usize,
    pub conductor: ConductorSize,
    /// Radial gap between neighbouring turns of one disc.
    pub turn_gap_m: f64,
    /// Axial spacer between discs.
    pub disc_gap_m: f64,
}

/// Single-layer helix, one turn per axial position.
#[derive(Debug, Clone, PartialEq)]
pub struct HelicalGeometry {
    pub inner_radius_m: f64,
    pub z_bottom_m: f64,
    pub num_turns: usize,
    pub conductor: ConductorSize,
    pub turn_gap_m: f64,
}

/// Layer winding: concentric layers, alternately wound up and down.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGeometry {
    pub inner_radius_m: f64,
    pub z_bottom_m: f64,
    pub num_layers: usize,
    pub turns_per_layer: usize,
    pub conductor: ConductorSize,
    pub turn_gap_m: f64,
    pub layer_gap_m: f64,
}

/// Single layer with several starts wound side by side and joined in series.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStartGeometry {
    pub inner_radius_m: f64,
    pub z_bottom_m: f64,
    pub num_starts: usize,
    pub turns_per_start: usize,
    pub conductor: ConductorSize,
    pub turn_gap_m: f64,
}

/// Interleaved disc pairs: the electrical turns of a pair alternate between
/// the two discs to raise series capacitance.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedDiscGeometry {
    pub inner_radius_m: f64,
    pub z_bottom_m: f64,
    pub num_disc_pairs: usize,
    pub turns_per_disc: usize,
    pub conductor: ConductorSize,
    pub turn_gap_m: f64,
    pub disc_gap_m: f64,
}

/// Closed set of supported winding layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum WindingGeometry {
    Disc(DiscGeometry),
    Helical(HelicalGeometry),
    Layer(LayerGeometry),
    MultiStart(MultiStartGeometry),
    InterleavedDisc(InterleavedDiscGeometry),
}

impl WindingGeometry {
    pub fn kind_name(&self) -> &'static str {
        match self {
            WindingGeometry::Disc(_) => "disc",
            WindingGeometry::Helical(_) => "helical",
            WindingGeometry::Layer(_) => "layer",
            WindingGeometry::MultiStart(_) => "multi-start",
            WindingGeometry::InterleavedDisc(_) => "interleaved-disc",
        }
    }

    pub fn num_turns(&self) -> usize {
        match self {
            WindingGeometry::Disc(g) => g.num_discs * g.turns_per_disc,
            WindingGeometry::Helical(g) => g.num_turns,
            WindingGeometry::Layer(g) => g.num_layers * g.turns_per_layer,
            WindingGeometry::MultiStart(g) => g.num_starts * g.turns_per_start,
            WindingGeometry::InterleavedDisc(g) => 2 * g.num_disc_pairs * g.turns_per_disc,
        }
    }

    pub fn conductor_size(&self) -> ConductorSize {
        match self {
            WindingGeometry::Disc(g) => g.conductor,
            WindingGeometry::Helical(g) => g.conductor,
            WindingGeometry::Layer(g) => g.conductor,
            WindingGeometry::MultiStart(g) => g.conductor,
            WindingGeometry::InterleavedDisc(g) => g.conductor,
        }
    }

    /// Check dimensions and counts; returns a description of the first problem.
    pub fn check(&self) -> Result<(), String> {
        let size = self.conductor_size();
        if !(size.width_m > 0.0 && size.height_m > 0.0) {
            return Err("conductor width and height must be positive".to_string());
        }
        let (inner, gaps): (f64, Vec<f64>) = match self {
            WindingGeometry::Disc(g) => (g.inner_radius_m, vec![g.turn_gap_m, g.disc_gap_m]),
            WindingGeometry::Helical(g) => (g.inner_radius_m, vec![g.turn_gap_m]),
            WindingGeometry::Layer(g) => (g.inner_radius_m, vec![g.turn_gap_m, g.layer_gap_m]),
            WindingGeometry::MultiStart(g) => (g.inner_radius_m, vec![g.turn_gap_m]),
            WindingGeometry::InterleavedDisc(g) => {
                (g.inner_radius_m, vec![g.turn_gap_m, g.disc_gap_m])
            }
        };
        if !(inner > 0.0) {
            return Err(format!("inner radius must be positive, got {inner}"));
        }
        // touching conductors have no insulation to put a capacitance across
        if let Some(g) = gaps.iter().find(|g| !(**g > 0.0)) {
            return Err(format!("gaps must be positive, got {g}"));
        }
        if self.num_turns() == 0 {
            return Err(format!("{} winding has no turns", self.kind_name()));
        }
        Ok(())
    }

    /// Conductor centres in electrical turn order.
    pub fn conductor_locations(&self) -> Vec<Conductor> {
        let size = self.conductor_size();
        let place = |r_m: f64, z_m: f64| Conductor {
            r_m,
            z_m,
            width_m: size.width_m,
            height_m: size.height_m,
        };
        let mut out = Vec::with_capacity(self.num_turns());

        match self {
            WindingGeometry::Disc(g) => {
                let radial_pitch = size.width_m + g.turn_gap_m;
                let axial_pitch = size.height_m + g.disc_gap_m;
                for d in 0..g.num_discs {
                    let z = g.z_bottom_m + d as f64 * axial_pitch + 0.5 * size.height_m;
                    for k in 0..g.turns_per_disc {
                        // even discs run outside-in, odd discs inside-out
                        let slot = if d % 2 == 0 {
                            g.turns_per_disc - 1 - k
                        } else {
                            k
                        };
                        let r = g.inner_radius_m + slot as f64 * radial_pitch + 0.5 * size.width_m;
                        out.push(place(r, z));
                    }
                }
            }
            WindingGeometry::Helical(g) => {
                let r = g.inner_radius_m + 0.5 * size.width_m;
                let axial_pitch = size.height_m + g.turn_gap_m;
                for k in 0..g.num_turns {
                    let z = g.z_bottom_m + k as f64 * axial_pitch + 0.5 * size.height_m;
                    out.push(place(r, z));
                }
            }
            WindingGeometry::Layer(g) => {
                let radial_pitch = size.width_m + g.layer_gap_m;
                let axial_pitch = size.height_m + g.turn_gap_m;
                for l in 0..g.num_layers {
                    let r = g.inner_radius_m + l as f64 * radial_pitch + 0.5 * size.width_m;
                    for k in 0..g.turns_per_layer {
                        let slot = if l % 2 == 0 {
                            k
                        } else {
                            g.turns_per_layer - 1 - k
                        };
                        let z = g.z_bottom_m + slot as f64 * axial_pitch + 0.5 * size.height_m;
                        out.push(place(r, z));
                    }
                }
            }
            WindingGeometry::MultiStart(g) => {
                let r = g.inner_radius_m + 0.5 * size.width_m;
                let axial_pitch = size.height_m + g.turn_gap_m;
                for s in 0..g.num_starts {
                    for k in 0..g.turns_per_start {
                        let slot = k * g.num_starts + s;
                        let z = g.z_bottom_m + slot as f64 * axial_pitch + 0.5 * size.height_m;
                        out.push(place(r, z));
                    }
                }
            }
            WindingGeometry::InterleavedDisc(g) => {
                let t = g.turns_per_disc;
                let radial_pitch = size.width_m + g.turn_gap_m;
                let axial_pitch = size.height_m + g.disc_gap_m;
                for p in 0..g.num_disc_pairs {
                    for e in 0..2 * t {
                        let half = e / t;
                        let local = e % t;
                        let disc_in_pair = if local % 2 == 0 { half } else { 1 - half };
                        let disc = 2 * p + disc_in_pair;
                        let z = g.z_bottom_m + disc as f64 * axial_pitch + 0.5 * size.height_m;
                        let r = g.inner_radius_m + local as f64 * radial_pitch + 0.5 * size.width_m;
                        out.push(place(r, z));
                    }
                }
            }
        }

        out
    }
}
