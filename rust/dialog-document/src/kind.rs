use serde::{Deserialize, Serialize};

/// Identifies a node within one revision. Negative values never denote a
/// node.
pub type NodeKey = i64;

/// A numbered, immutable snapshot of a whole document tree.
pub type Revision = u64;

/// The key used in place of a real node key to mean "no node".
pub const NULL_NODE_KEY: NodeKey = -15;

/// The key of the document (root) node in every revision.
pub const ROOT_NODE_KEY: NodeKey = 0;

/// The kinds of node a document tree is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// The document node at the top of every tree
    Root,
    /// An element
    Element,
    /// An attribute owned by an element
    Attribute,
    /// A namespace declaration owned by an element
    Namespace,
    /// Character content
    Text,
    /// A comment
    Comment,
    /// A processing instruction
    ProcessingInstruction,
}

impl NodeKind {
    /// The numeric kind code used by tree query evaluators.
    pub fn id(&self) -> u8 {
        match self {
            NodeKind::Element => 1,
            NodeKind::Attribute => 2,
            NodeKind::Text => 3,
            NodeKind::ProcessingInstruction => 7,
            NodeKind::Comment => 8,
            NodeKind::Root => 9,
            NodeKind::Namespace => 13,
        }
    }

    /// Whether nodes of this kind take part in the parent / child / sibling
    /// shape of the tree. Attributes and namespaces hang off their element
    /// instead.
    pub fn is_structural(&self) -> bool {
        !matches!(self, NodeKind::Attribute | NodeKind::Namespace)
    }

    /// Whether nodes of this kind carry a qualified name.
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            NodeKind::Element
                | NodeKind::Attribute
                | NodeKind::Namespace
                | NodeKind::ProcessingInstruction
        )
    }
}
