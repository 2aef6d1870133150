#![warn(missing_docs)]

//! This crate describes the boundary between navigation code and a
//! versioned, tree-structured document store. Every read happens through a
//! [`NodeCursor`] that is pinned to one [`Revision`] and positioned at one
//! node at a time.
//!
//! A trivial append-only implementation, [`MemoryDocumentStore`], keeps each
//! revision as an immutable snapshot in memory. Revisions are produced with a
//! [`DocumentBuilder`]:
//!
//! ```rust
//! use dialog_document::{DocumentBuilder, DocumentStore, MemoryDocumentStore, NodeCursor, NodeKind};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryDocumentStore::default();
//! let revision = store.commit(DocumentBuilder::new().element("a", |a| {
//!     a.element("b", |b| {
//!         b.text("hello");
//!     });
//!     a.element("c", |_| {});
//! }));
//!
//! let mut cursor = store.begin_read(revision)?;
//! assert!(cursor.move_to_first_child()?);
//! assert_eq!(cursor.kind(), NodeKind::Element);
//! cursor.close()?;
//! # Ok(())
//! # }
//! ```

mod builder;
pub use builder::*;

mod error;
pub use error::*;

mod kind;
pub use kind::*;

mod memory;
pub use memory::*;

mod name;
pub use name::*;

mod store;
pub use store::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
