use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The result of atomizing a node.
///
/// Comments and processing instructions atomize to a plain string; every
/// other kind atomizes to an untyped value that the evaluator may still cast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicValue {
    /// A plain string value
    String(String),
    /// An untyped value carrying the string value of a node
    UntypedAtomic(String),
}

impl AtomicValue {
    /// The lexical form of the value
    pub fn as_str(&self) -> &str {
        match self {
            AtomicValue::String(value) | AtomicValue::UntypedAtomic(value) => value,
        }
    }

    /// Whether the value is untyped
    pub fn is_untyped(&self) -> bool {
        matches!(self, AtomicValue::UntypedAtomic(_))
    }
}

impl Display for AtomicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The type annotation the evaluator sees on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeAnnotation {
    /// The node is unvalidated (`xs:untyped`)
    Untyped,
    /// The node is an unvalidated attribute (`xs:untypedAtomic`)
    UntypedAtomic,
}
