use thiserror::Error;

use crate::Revision;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogDocumentError {
    /// The requested revision has never been committed
    #[error("Unknown revision: {0}")]
    UnknownRevision(Revision),

    /// The store does not hold any revision yet
    #[error("Document store has no revisions")]
    NoRevisions,

    /// The cursor was used after it had been closed
    #[error("Cursor used after it was closed")]
    CursorClosed,

    /// An error reported by the underlying storage backend
    #[error("Storage backend error: {0}")]
    Backend(String),
}
