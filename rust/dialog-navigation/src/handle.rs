use std::hash::{Hash, Hasher};

use dialog_document::{NodeKey, NodeKind, QualifiedName, Revision};
use serde::{Deserialize, Serialize};

/// The identity of a node: its key, the revision it was read at, its kind
/// and, for named kinds, its qualified name.
///
/// Handles compare and hash by key alone. A key at a fixed revision always
/// denotes the same node, so revision and kind agree whenever keys do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeHandle {
    key: NodeKey,
    revision: Revision,
    kind: NodeKind,
    name: Option<QualifiedName>,
}

impl NodeHandle {
    /// Creates a handle. Names are only kept for kinds that carry one.
    pub fn new(
        key: NodeKey,
        revision: Revision,
        kind: NodeKind,
        name: Option<QualifiedName>,
    ) -> Self {
        let name = if kind.is_named() { name } else { None };
        Self {
            key,
            revision,
            kind,
            name,
        }
    }

    /// The node key
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// The revision the node was read at
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The node kind
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The qualified name, for element, attribute, namespace and processing
    /// instruction nodes
    pub fn name(&self) -> Option<&QualifiedName> {
        self.name.as_ref()
    }

    /// Whether this handle carries the "no node" sentinel instead of a key
    pub fn is_null(&self) -> bool {
        self.key < 0
    }

    /// Whether the node takes part in the parent / child / sibling shape
    pub fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NodeHandle {}

impl Hash for NodeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
