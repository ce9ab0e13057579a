//! Winding segments and their cached conductor layout.

use tw_core::{SegmentId, WindingId};

use crate::error::{WindingError, WindingResult};
use crate::geometry::{Conductor, WindingGeometry};
use crate::tap::{validate_taps, TapDefinition};

/// A physically contiguous piece of a winding.
///
/// Conductor locations are derived from the geometry on first use and cached
/// until the geometry changes or `invalidate` is called.
#[derive(Debug, Clone)]
pub struct Segment {
    pub(crate) id: SegmentId,
    pub(crate) winding: WindingId,
    pub(crate) label: String,
    geometry: WindingGeometry,
    taps: Vec<TapDefinition>,
    locations: Option<Vec<Conductor>>,
}

impl Segment {
    pub(crate) fn new(
        id: SegmentId,
        winding: WindingId,
        label: String,
        geometry: WindingGeometry,
        taps: Vec<TapDefinition>,
    ) -> WindingResult<Self> {
        geometry
            .check()
            .map_err(|what| WindingError::InvalidGeometry {
                segment: label.clone(),
                what,
            })?;
        validate_taps(&label, geometry.num_turns(), &taps)?;
        Ok(Self {
            id,
            winding,
            label,
            geometry,
            taps,
            locations: None,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn winding(&self) -> WindingId {
        self.winding
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geometry(&self) -> &WindingGeometry {
        &self.geometry
    }

    pub fn taps(&self) -> &[TapDefinition] {
        &self.taps
    }

    pub fn num_turns(&self) -> usize {
        self.geometry.num_turns()
    }

    /// Replace the geometry; existing taps must still fit.
    pub fn set_geometry(&mut self, geometry: WindingGeometry) -> WindingResult<()> {
        geometry
            .check()
            .map_err(|what| WindingError::InvalidGeometry {
                segment: self.label.clone(),
                what,
            })?;
        validate_taps(&self.label, geometry.num_turns(), &self.taps)?;
        self.geometry = geometry;
        self.invalidate();
        Ok(())
    }

    /// Conductor centres in turn order, computed on first call.
    pub fn conductors(&mut self) -> &[Conductor] {
        let geometry = &self.geometry;
        self.locations
            .get_or_insert_with(|| geometry.conductor_locations())
    }

    pub fn is_cached(&self) -> bool {
        self.locations.is_some()
    }

    /// Drop the cached conductor layout.
    pub fn invalidate(&mut self) {
        self.locations = None;
    }

    /// Physical length of each turn (m).
    pub fn turn_lengths(&mut self) -> Vec<f64> {
        self.conductors().iter().map(Conductor::turn_length).collect()
    }
}
