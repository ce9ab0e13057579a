//! External terminals: where the network is driven and loaded.

use tw_core::units::{henry, ohm, Inductance, Resistance};
use tw_core::NodeId;

/// Series R-L impedance of a source or load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalImpedance {
    pub resistance: Resistance,
    pub inductance: Inductance,
}

impl TerminalImpedance {
    pub fn new(resistance: Resistance, inductance: Inductance) -> Self {
        Self {
            resistance,
            inductance,
        }
    }

    /// A solid connection (zero ohms, zero henries).
    pub fn short() -> Self {
        Self::new(ohm(0.0), henry(0.0))
    }

    /// `(R, L)` in ohms and henries.
    pub fn si(&self) -> (f64, f64) {
        (self.resistance.value, self.inductance.value)
    }
}

impl Default for TerminalImpedance {
    fn default() -> Self {
        Self::short()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalKind {
    /// Unit voltage excitation behind a series impedance.
    Source(TerminalImpedance),
    /// Impedance to ground; a zero impedance is a solid ground.
    Load(TerminalImpedance),
}

impl TerminalKind {
    pub fn impedance(&self) -> TerminalImpedance {
        match *self {
            TerminalKind::Source(z) | TerminalKind::Load(z) => z,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, TerminalKind::Source(_))
    }
}

/// Where a terminal attaches, by segment label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalLocation {
    SegmentStart { segment: String },
    SegmentEnd { segment: String },
    Tap { segment: String, tap: String },
}

impl TerminalLocation {
    pub fn segment(&self) -> &str {
        match self {
            TerminalLocation::SegmentStart { segment }
            | TerminalLocation::SegmentEnd { segment }
            | TerminalLocation::Tap { segment, .. } => segment,
        }
    }
}

/// A terminal as declared by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminal {
    pub label: String,
    pub location: TerminalLocation,
    pub kind: TerminalKind,
}

impl Terminal {
    pub fn source(label: impl Into<String>, location: TerminalLocation, z: TerminalImpedance) -> Self {
        Self {
            label: label.into(),
            location,
            kind: TerminalKind::Source(z),
        }
    }

    pub fn load(label: impl Into<String>, location: TerminalLocation, z: TerminalImpedance) -> Self {
        Self {
            label: label.into(),
            location,
            kind: TerminalKind::Load(z),
        }
    }

    pub fn ground(label: impl Into<String>, location: TerminalLocation) -> Self {
        Self::load(label, location, TerminalImpedance::short())
    }
}

/// A terminal after finalize: bound to the live node it was merged into.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTerminal {
    pub label: String,
    pub node: NodeId,
    pub kind: TerminalKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impedance_si_values() {
        let z = TerminalImpedance::new(ohm(50.0), henry(1e-6));
        assert_eq!(z.si(), (50.0, 1e-6));
        assert_eq!(TerminalImpedance::default().si(), (0.0, 0.0));
    }

    #[test]
    fn ground_is_zero_impedance_load() {
        let t = Terminal::ground(
            "N",
            TerminalLocation::SegmentEnd {
                segment: "S1".into(),
            },
        );
        assert!(!t.kind.is_source());
        assert_eq!(t.kind.impedance().si(), (0.0, 0.0));
        assert_eq!(t.location.segment(), "S1");
    }
}
