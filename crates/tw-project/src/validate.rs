//! Project validation logic.
//!
//! Checks what can be decided from the file alone: labels, references,
//! value ranges and the terminal set. Topology errors that only show up
//! while merging nodes are left to the winding builder.

use std::collections::{HashMap, HashSet};

use crate::build::geometry;
use crate::schema::{
    ConnectionDef, LocationDef, Project, SegmentDef, TerminalDef, TerminalKindDef, WindingDef,
    LATEST_VERSION,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate label: {label} in {context}")]
    DuplicateLabel { label: String, context: String },

    #[error("Missing reference: {label} in {context}")]
    MissingReference { label: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Project needs exactly one source terminal, found {count}")]
    SourceCount { count: usize },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: impl Into<String>, v: f64) -> Result<(), ValidationError> {
    if !(v.is_finite() && v > 0.0) {
        return Err(invalid(field, v, "must be positive and finite"));
    }
    Ok(())
}

fn non_negative(field: impl Into<String>, v: f64) -> Result<(), ValidationError> {
    if !(v.is_finite() && v >= 0.0) {
        return Err(invalid(field, v, "must be non-negative and finite"));
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let m = &project.material;
    positive("material resistivity_ohm_m", m.resistivity_ohm_m)?;
    positive("material relative_permittivity", m.relative_permittivity)?;
    non_negative("material loss_tangent", m.loss_tangent)?;
    positive("material core_radius_m", m.core_radius_m)?;
    if let crate::schema::InductanceDef::Neumann { points } = m.inductance
        && points < 2
    {
        return Err(invalid(
            "material inductance points",
            points,
            "need at least two integration points",
        ));
    }

    let mut winding_labels = HashSet::new();
    let mut segments: HashMap<&str, &SegmentDef> = HashMap::new();
    for winding in &project.windings {
        if !winding_labels.insert(winding.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: winding.label.clone(),
                context: "windings".to_string(),
            });
        }
        for segment in &winding.segments {
            if segments.insert(segment.label.as_str(), segment).is_some() {
                return Err(ValidationError::DuplicateLabel {
                    label: segment.label.clone(),
                    context: "segments".to_string(),
                });
            }
            validate_segment(segment)?;
        }
        for connection in &winding.connections {
            validate_connection(winding, connection)?;
        }
    }

    let mut terminal_labels = HashSet::new();
    for terminal in &project.terminals {
        if !terminal_labels.insert(terminal.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: terminal.label.clone(),
                context: "terminals".to_string(),
            });
        }
        validate_terminal(terminal, &segments)?;
    }
    let count = project
        .terminals
        .iter()
        .filter(|t| t.kind == TerminalKindDef::Source)
        .count();
    if count != 1 {
        return Err(ValidationError::SourceCount { count });
    }

    let s = &project.sweep;
    positive("sweep min_freq_hz", s.min_freq_hz)?;
    positive("sweep max_freq_hz", s.max_freq_hz)?;
    if s.max_freq_hz < s.min_freq_hz {
        return Err(invalid(
            "sweep max_freq_hz",
            s.max_freq_hz,
            "must not be below min_freq_hz",
        ));
    }
    if s.num_steps == 0 {
        return Err(invalid("sweep num_steps", 0, "must be at least 1"));
    }
    if s.parallelism == 0 {
        return Err(invalid("sweep parallelism", 0, "must be at least 1"));
    }
    if !(project.model.max_condition > 1.0) {
        return Err(invalid(
            "model max_condition",
            project.model.max_condition,
            "must be greater than 1",
        ));
    }

    Ok(())
}

fn validate_segment(segment: &SegmentDef) -> Result<(), ValidationError> {
    let g = geometry(&segment.geometry);
    g.check().map_err(|reason| {
        invalid(
            format!("segment '{}' geometry", segment.label),
            g.kind_name(),
            &reason,
        )
    })?;

    let turns = g.num_turns();
    let mut previous = 0;
    let mut labels = HashSet::new();
    for tap in &segment.taps {
        if !labels.insert(tap.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: tap.label.clone(),
                context: format!("segment '{}' taps", segment.label),
            });
        }
        if tap.turn <= previous || tap.turn >= turns {
            return Err(invalid(
                format!("segment '{}' tap '{}' turn", segment.label, tap.label),
                tap.turn,
                "taps must be strictly increasing and inside the segment",
            ));
        }
        previous = tap.turn;
    }
    Ok(())
}

fn validate_connection(winding: &WindingDef, c: &ConnectionDef) -> Result<(), ValidationError> {
    let context = format!("winding '{}' connection", winding.label);
    let find = |label: &str| {
        winding
            .segments
            .iter()
            .find(|s| s.label == label)
            .ok_or_else(|| ValidationError::MissingReference {
                label: label.to_string(),
                context: context.clone(),
            })
    };

    for b in &c.branches {
        let segment = find(&b.segment)?;
        if b.index > segment.taps.len() {
            return Err(invalid(
                format!("{context} branch of '{}'", b.segment),
                b.index,
                "segment has fewer branches",
            ));
        }
    }
    for label in &c.segments {
        find(label)?;
    }
    for &i in &c.indices {
        if i >= winding.segments.len() {
            return Err(invalid(
                format!("{context} index"),
                i,
                "winding has fewer segments",
            ));
        }
    }
    Ok(())
}

fn validate_terminal(
    terminal: &TerminalDef,
    segments: &HashMap<&str, &SegmentDef>,
) -> Result<(), ValidationError> {
    let context = format!("terminal '{}'", terminal.label);
    let label = terminal.location.segment();
    let segment = segments
        .get(label)
        .ok_or_else(|| ValidationError::MissingReference {
            label: label.to_string(),
            context: context.clone(),
        })?;
    if let LocationDef::Tap { tap, .. } = &terminal.location
        && !segment.taps.iter().any(|t| &t.label == tap)
    {
        return Err(ValidationError::MissingReference {
            label: tap.clone(),
            context,
        });
    }
    if terminal.kind == TerminalKindDef::Ground
        && (terminal.resistance_ohm != 0.0 || terminal.inductance_h != 0.0)
    {
        return Err(invalid(
            format!("terminal '{}' impedance", terminal.label),
            terminal.resistance_ohm,
            "ground terminals have zero impedance",
        ));
    }
    non_negative(
        format!("terminal '{}' resistance_ohm", terminal.label),
        terminal.resistance_ohm,
    )?;
    non_negative(
        format!("terminal '{}' inductance_h", terminal.label),
        terminal.inductance_h,
    )?;
    Ok(())
}
