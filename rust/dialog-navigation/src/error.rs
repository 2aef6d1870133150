use dialog_document::{DialogDocumentError, NodeKey};
use thiserror::Error;

/// How an error should be treated by the evaluator that consumes this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The store cannot answer this question at all; never defaulted.
    CapabilityAbsence,
    /// The caller broke a precondition, or a shared table can no longer
    /// grow; the evaluation step should abort and must not be retried.
    Precondition,
    /// The store failed while being read.
    Storage,
}

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The requested facility cannot be derived from the document store
    #[error("{facility} not supported by the document store")]
    Unsupported {
        /// The facility that was asked for
        facility: &'static str,
    },

    /// Two nodes from different trees were compared for document order
    #[error("Cannot compare the document order of nodes from different trees")]
    ForeignTree,

    /// A numeric axis selector did not name any axis
    #[error("Unknown axis number {0}")]
    UnknownAxis(u8),

    /// An atomic value was supplied where a node identity was required
    #[error("XPTY0004: expected a node, found an atomic value (key {key})")]
    NotANode {
        /// The offending key
        key: NodeKey,
    },

    /// A key did not resolve to a node in the pinned revision
    #[error("No node with key {key} in this revision")]
    NoSuchNode {
        /// The missing key
        key: NodeKey,
    },

    /// The document scope a node belongs to has already been dropped
    #[error("The document this node belongs to has been released")]
    DocumentReleased,

    /// The name pool has no code left to give a new name or binding
    #[error("Name pool exhausted: no {field} code left for a new name")]
    NamePoolExhausted {
        /// The part of the encoding that ran out
        field: &'static str,
    },

    /// There was a problem when reading the document store
    #[error("Document store error: {0}")]
    Storage(#[from] DialogDocumentError),
}

impl NavigationError {
    /// Classifies this error for the consuming evaluator.
    pub fn class(&self) -> ErrorClass {
        match self {
            NavigationError::Unsupported { .. } => ErrorClass::CapabilityAbsence,
            NavigationError::ForeignTree
            | NavigationError::UnknownAxis(_)
            | NavigationError::NotANode { .. }
            | NavigationError::NoSuchNode { .. }
            | NavigationError::DocumentReleased
            | NavigationError::NamePoolExhausted { .. } => ErrorClass::Precondition,
            NavigationError::Storage(_) => ErrorClass::Storage,
        }
    }

    /// Whether the error signals caller misuse or a missing capability, as
    /// opposed to a storage failure that may be degraded.
    pub fn is_fatal(&self) -> bool {
        self.class() != ErrorClass::Storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_classifies_errors() {
        assert_eq!(
            NavigationError::Unsupported {
                facility: "Line numbers"
            }
            .class(),
            ErrorClass::CapabilityAbsence
        );
        assert_eq!(NavigationError::ForeignTree.class(), ErrorClass::Precondition);
        assert_eq!(
            NavigationError::from(DialogDocumentError::CursorClosed).class(),
            ErrorClass::Storage
        );
        assert!(NavigationError::UnknownAxis(42).is_fatal());
        assert!(NavigationError::NamePoolExhausted { field: "prefix" }.is_fatal());
        assert!(!NavigationError::Storage(DialogDocumentError::NoRevisions).is_fatal());
    }

    #[test]
    fn it_reports_the_structural_type_error_code() {
        let message = NavigationError::NotANode { key: -3 }.to_string();
        assert!(message.starts_with("XPTY0004"));
    }
}
