use dialog_document::{
    DialogDocumentError, DocumentStore, NodeCursor, NodeKey, NodeKind, QualifiedName, Revision,
};

use crate::{NavigationError, NodeHandle};

/// A short-lived, read-only cursor into the store at a fixed revision.
///
/// The scope exclusively owns its cursor and releases it exactly once: when
/// [`TransactionScope::close`] is called, or when the scope is dropped on any
/// other exit path (early return, `?`, an abandoned axis iterator).
pub struct TransactionScope<C>
where
    C: NodeCursor,
{
    cursor: C,
    released: bool,
}

impl<C> TransactionScope<C>
where
    C: NodeCursor,
{
    /// Begins a cursor on `store` at `revision` and moves it to `key`.
    pub fn open<S>(store: &S, revision: Revision, key: NodeKey) -> Result<Self, NavigationError>
    where
        S: DocumentStore<Cursor = C>,
    {
        let mut scope = Self {
            cursor: store.begin_read(revision)?,
            released: false,
        };
        if !scope.move_to(key)? {
            return Err(NavigationError::NoSuchNode { key });
        }
        Ok(scope)
    }

    /// Releases the cursor, reporting a failure to release.
    pub fn close(mut self) -> Result<(), NavigationError> {
        Ok(self.release()?)
    }

    /// Releases the cursor and returns the handle of the node it was
    /// positioned at.
    pub fn into_handle(self) -> Result<NodeHandle, NavigationError> {
        let handle = self.handle();
        self.close()?;
        Ok(handle)
    }

    fn release(&mut self) -> Result<(), DialogDocumentError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.cursor.close()
    }

    /// A handle for the node the scope is positioned at.
    pub fn handle(&self) -> NodeHandle {
        NodeHandle::new(
            self.cursor.node_key(),
            self.cursor.revision(),
            self.cursor.kind(),
            self.cursor.name().cloned(),
        )
    }

    /// The revision this scope is pinned to
    pub fn revision(&self) -> Revision {
        self.cursor.revision()
    }

    /// The key of the current node
    pub fn node_key(&self) -> NodeKey {
        self.cursor.node_key()
    }

    /// The kind of the current node
    pub fn kind(&self) -> NodeKind {
        self.cursor.kind()
    }

    /// The name of the current node
    pub fn name(&self) -> Option<&QualifiedName> {
        self.cursor.name()
    }

    /// The raw stored value of the current node
    pub fn value(&self) -> Option<&str> {
        self.cursor.value()
    }

    /// The key of the parent (or owning element) of the current node
    pub fn parent_key(&self) -> Option<NodeKey> {
        self.cursor.parent_key()
    }

    /// The key of the right sibling of the current node
    pub fn right_sibling_key(&self) -> Option<NodeKey> {
        self.cursor.right_sibling_key()
    }

    /// Whether the current node has a parent
    pub fn has_parent(&self) -> bool {
        self.cursor.has_parent()
    }

    /// Whether the current node has a structural child
    pub fn has_first_child(&self) -> bool {
        self.cursor.has_first_child()
    }

    /// Whether the current node has a left sibling
    pub fn has_left_sibling(&self) -> bool {
        self.cursor.has_left_sibling()
    }

    /// Whether the current node has a right sibling
    pub fn has_right_sibling(&self) -> bool {
        self.cursor.has_right_sibling()
    }

    /// The number of structural children of the current node
    pub fn child_count(&self) -> u64 {
        self.cursor.child_count()
    }

    /// The number of attributes of the current node
    pub fn attribute_count(&self) -> usize {
        self.cursor.attribute_count()
    }

    /// The number of namespace declarations of the current node
    pub fn namespace_count(&self) -> usize {
        self.cursor.namespace_count()
    }

    /// Moves to `key`
    pub fn move_to(&mut self, key: NodeKey) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to(key)?)
    }

    /// Moves to the parent
    pub fn move_to_parent(&mut self) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to_parent()?)
    }

    /// Moves to the first child
    pub fn move_to_first_child(&mut self) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to_first_child()?)
    }

    /// Moves to the left sibling
    pub fn move_to_left_sibling(&mut self) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to_left_sibling()?)
    }

    /// Moves to the right sibling
    pub fn move_to_right_sibling(&mut self) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to_right_sibling()?)
    }

    /// Moves to the attribute at `index` of the current node
    pub fn move_to_attribute(&mut self, index: usize) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to_attribute(index)?)
    }

    /// Moves to the namespace declaration at `index` of the current node
    pub fn move_to_namespace(&mut self, index: usize) -> Result<bool, NavigationError> {
        Ok(self.cursor.move_to_namespace(index)?)
    }
}

impl<C> Drop for TransactionScope<C>
where
    C: NodeCursor,
{
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            tracing::warn!(%error, "Failed to release document cursor");
        }
    }
}

#[cfg(test)]
mod tests {
    use dialog_document::{DocumentBuilder, MemoryDocumentStore};

    use super::*;

    fn store() -> (MemoryDocumentStore, Revision) {
        let store = MemoryDocumentStore::default();
        let revision = store.commit(DocumentBuilder::new().element("a", |a| {
            a.element("b", |_| {});
        }));
        (store, revision)
    }

    #[test]
    fn it_releases_on_close() -> anyhow::Result<()> {
        let (store, revision) = store();
        let scope = TransactionScope::open(&store, revision, 1)?;
        assert_eq!(scope.kind(), NodeKind::Element);
        assert_eq!(store.open_cursors(), 1);

        scope.close()?;
        assert_eq!(store.open_cursors(), 0);
        Ok(())
    }

    #[test]
    fn it_releases_on_drop() -> anyhow::Result<()> {
        let (store, revision) = store();
        {
            let mut scope = TransactionScope::open(&store, revision, 1)?;
            assert!(scope.move_to_first_child()?);
        }
        assert_eq!(store.open_cursors(), 0);
        Ok(())
    }

    #[test]
    fn it_releases_when_the_key_is_missing() {
        let (store, revision) = store();
        let result = TransactionScope::open(&store, revision, 99);
        assert!(matches!(result, Err(NavigationError::NoSuchNode { key: 99 })));
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn it_builds_handles_for_the_current_node() -> anyhow::Result<()> {
        let (store, revision) = store();
        let mut scope = TransactionScope::open(&store, revision, 1)?;
        assert!(scope.move_to_first_child()?);

        let handle = scope.handle();
        assert_eq!(handle.key(), 2);
        assert_eq!(handle.revision(), revision);
        assert_eq!(handle.name(), Some(&QualifiedName::local("b")));
        Ok(())
    }
}
