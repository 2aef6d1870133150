use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use dialog_document::{DialogDocumentError, DocumentStore, NodeKey, ROOT_NODE_KEY, Revision};
use parking_lot::RwLock;

use crate::{
    AxisDispatcher, NamePool, NavigationConfig, NavigationError, NodeAdapter, NodeHandle,
    TransactionScope, validate_is_node,
};

static NEXT_DOCUMENT_NUMBER: AtomicU64 = AtomicU64::new(0);

/// The document every [`NodeAdapter`] belongs to: a store session pinned to
/// one revision, the shared name pool and the document's base URI.
///
/// Adapters only hold a weak reference to their document, so the document
/// must be kept alive for as long as its nodes are navigated.
pub struct DocumentScope<S>
where
    S: DocumentStore,
{
    store: Arc<S>,
    revision: Revision,
    name_pool: Arc<dyn NamePool>,
    dispatcher: AxisDispatcher<S>,
    base_uri: RwLock<Option<String>>,
    document_number: u64,
    config: NavigationConfig,
    this: Weak<Self>,
}

impl<S> DocumentScope<S>
where
    S: DocumentStore,
{
    /// Opens the document stored at `revision`.
    pub fn open(
        store: Arc<S>,
        revision: Revision,
        name_pool: Arc<dyn NamePool>,
        config: NavigationConfig,
    ) -> Result<Arc<Self>, NavigationError> {
        TransactionScope::open(&*store, revision, ROOT_NODE_KEY)?.close()?;

        let document_number = config
            .document_number
            .unwrap_or_else(|| NEXT_DOCUMENT_NUMBER.fetch_add(1, Ordering::SeqCst));
        tracing::debug!(revision, document_number, "Opened document");

        Ok(Arc::new_cyclic(|this| Self {
            dispatcher: AxisDispatcher::new(store.clone(), revision, name_pool.clone()),
            store,
            revision,
            name_pool,
            base_uri: RwLock::new(config.base_uri.clone()),
            document_number,
            config,
            this: this.clone(),
        }))
    }

    /// Opens the document at the most recent revision of `store`.
    pub fn latest(
        store: Arc<S>,
        name_pool: Arc<dyn NamePool>,
        config: NavigationConfig,
    ) -> Result<Arc<Self>, NavigationError> {
        let revision = store
            .latest_revision()
            .ok_or(DialogDocumentError::NoRevisions)?;
        Self::open(store, revision, name_pool, config)
    }

    /// The document node
    pub fn root(&self) -> Result<NodeAdapter<S>, NavigationError> {
        self.node(ROOT_NODE_KEY)
    }

    /// The node identified by `key` in this revision.
    pub fn node(&self, key: NodeKey) -> Result<NodeAdapter<S>, NavigationError> {
        validate_is_node(key)?;
        let handle = self.open_scope(key)?.into_handle()?;
        Ok(self.adapt(handle))
    }

    /// Wraps a handle read from this document in a node view.
    pub fn adapt(&self, handle: NodeHandle) -> NodeAdapter<S> {
        NodeAdapter::new(handle, self.this.clone())
    }

    /// Opens a cursor on this document positioned at `key`.
    pub fn open_scope(&self, key: NodeKey) -> Result<TransactionScope<S::Cursor>, NavigationError> {
        TransactionScope::open(&*self.store, self.revision, key)
    }

    /// The revision this document is pinned to
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The store this document reads from
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The name pool shared by every node of this document
    pub fn name_pool(&self) -> &dyn NamePool {
        self.name_pool.as_ref()
    }

    /// The dispatcher used for every axis of this document
    pub fn dispatcher(&self) -> &AxisDispatcher<S> {
        &self.dispatcher
    }

    /// The settings this document was opened with
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// A number that distinguishes this document from every other document
    /// open in the process.
    pub fn document_number(&self) -> u64 {
        self.document_number
    }

    /// The base URI of the document, if one was set.
    pub fn base_uri(&self) -> Option<String> {
        self.base_uri.read().clone()
    }

    /// Replaces the base URI of the document.
    pub fn set_base_uri(&self, base_uri: impl Into<String>) {
        *self.base_uri.write() = Some(base_uri.into());
    }
}

impl<S> std::fmt::Debug for DocumentScope<S>
where
    S: DocumentStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentScope")
            .field("revision", &self.revision)
            .field("document_number", &self.document_number)
            .field("base_uri", &*self.base_uri.read())
            .finish()
    }
}
