//! tw-winding: transformer winding description and topology construction.
//!
//! A [`Transformer`] is assembled from windings, segments (with geometry and
//! taps), internal series/parallel connections and external terminals.
//! [`Transformer::finalize`] consumes the builder and produces a read-only
//! [`Topology`]: the electrical graph plus the conductor layout in global
//! turn order.
//!
//! # Example
//!
//! ```
//! use tw_winding::geometry::{ConductorSize, HelicalGeometry, WindingGeometry};
//! use tw_winding::{InternalConnection, Selector, Transformer};
//!
//! let helix = |turns| {
//!     WindingGeometry::Helical(HelicalGeometry {
//!         inner_radius_m: 0.2,
//!         z_bottom_m: 0.0,
//!         num_turns: turns,
//!         conductor: ConductorSize { width_m: 0.003, height_m: 0.01 },
//!         turn_gap_m: 0.001,
//!     })
//! };
//!
//! let mut t = Transformer::new();
//! let hv = t.add_winding("HV").unwrap();
//! t.add_segment(hv, "S1", helix(4), vec![]).unwrap();
//! t.add_segment(hv, "S2", helix(4), vec![]).unwrap();
//! t.add_connection(hv, InternalConnection::series(Selector::all())).unwrap();
//!
//! let topo = t.finalize().unwrap();
//! assert_eq!(topo.num_turns(), 8);
//! assert_eq!(topo.num_nodes(), 3);
//! ```

pub mod connection;
pub mod error;
pub mod geometry;
pub mod segment;
pub mod tap;
pub mod terminal;
pub mod topology;
pub mod transformer;

pub use connection::{Connectable, ConnectionKind, InternalConnection, Selector};
pub use error::{WindingError, WindingResult};
pub use geometry::{Conductor, WindingGeometry};
pub use segment::Segment;
pub use tap::TapDefinition;
pub use terminal::{ResolvedTerminal, Terminal, TerminalImpedance, TerminalKind, TerminalLocation};
pub use topology::{BranchView, Topology};
pub use transformer::{Transformer, Winding};
