//! Electrical nodes.

use tw_core::NodeId;

/// An electrical terminal.
///
/// Nodes carry no electrical state. The solver index is handed out once the
/// topology is finalized and stays `None` until then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub solver_index: Option<usize>,
    pub tag: Option<String>,
}

impl Node {
    pub(crate) fn new(id: NodeId, tag: Option<String>) -> Self {
        Self {
            id,
            solver_index: None,
            tag,
        }
    }

    /// Display name: the tag when present, otherwise `n<id>`.
    pub fn display_name(&self) -> String {
        match &self.tag {
            Some(tag) => tag.clone(),
            None => format!("n{}", self.id),
        }
    }
}
