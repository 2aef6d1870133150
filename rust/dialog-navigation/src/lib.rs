#![warn(missing_docs)]

//! This crate exposes the nodes of a revision-pinned [`DocumentStore`] as a
//! lazily navigated node model for tree query evaluators.
//!
//! Start by opening a [`DocumentScope`] over a store and revision, then
//! navigate from its root. Every navigation step yields a fresh
//! [`NodeAdapter`]; no cursor stays open between steps.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dialog_document::{DocumentBuilder, MemoryDocumentStore};
//! use dialog_navigation::{Axis, DocumentScope, NavigationConfig, NodeTest, SharedNamePool};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryDocumentStore::default());
//! let revision = store.commit(DocumentBuilder::new().element("a", |a| {
//!     a.element("b", |b| {
//!         b.text("hello");
//!     });
//!     a.element("c", |_| {});
//! }));
//!
//! let document = DocumentScope::open(
//!     store,
//!     revision,
//!     Arc::new(SharedNamePool::new()),
//!     NavigationConfig::default(),
//! )?;
//!
//! let root = document.root()?;
//! for child in root.iterate_axis(Axis::Descendant, NodeTest::any())? {
//!     let child = child?;
//!     println!("{}: {:?}", child.display_name(), child.string_value()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`DocumentStore`]: dialog_document::DocumentStore

mod adapter;
pub use adapter::*;

/// Lazy, restartable producers of node sequences, one per navigation
/// direction.
pub mod axis;
pub use axis::Axis;

mod capability;
pub use capability::*;

/// Non-blocking consumption of axes advanced from independent threads.
pub mod concurrent;
pub use concurrent::{
    ConcurrentAxis, ConcurrentSetAxis, NodeKeyed, SetOperation, pull_or_sentinel,
    try_pull_or_sentinel, validate_is_node,
};

mod config;
pub use config::*;

mod dispatch;
pub use dispatch::*;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod handle;
pub use handle::*;

mod name_pool;
pub use name_pool::*;

mod node_test;
pub use node_test::*;

mod scope;
pub use scope::*;

mod value;
pub use value::*;
