use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use crate::{
    DialogDocumentError, DocumentStore, MemoryCursor, MemoryDocumentStore, NodeCursor, NodeKey,
    NodeKind, QualifiedName, Revision,
};

/// How a [`FaultyDocumentStore`] misbehaves once its budget is spent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    /// Reads and moves fail with [`DialogDocumentError::Backend`]
    #[default]
    Backend,
    /// Moves report that their target does not exist and leave the cursor
    /// where it was; reads still succeed
    Missing,
}

/// A [`MemoryDocumentStore`] that starts failing after a fixed number of
/// storage operations, for exercising error paths in tests.
///
/// Every `begin_read` and every cursor move spends one unit of the budget;
/// once the budget is spent those operations misbehave as described by the
/// store's [`Fault`]. Closing a cursor always succeeds so that release can
/// still be observed through [`MemoryDocumentStore::open_cursors`].
#[derive(Clone, Debug)]
pub struct FaultyDocumentStore {
    inner: MemoryDocumentStore,
    budget: Arc<AtomicI64>,
    fault: Fault,
}

impl FaultyDocumentStore {
    /// Wraps `inner`, allowing `budget` operations before failing.
    pub fn new(inner: MemoryDocumentStore, budget: i64) -> Self {
        Self {
            inner,
            budget: Arc::new(AtomicI64::new(budget)),
            fault: Fault::Backend,
        }
    }

    /// Changes how the store misbehaves once the budget is spent.
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    /// Resets the number of operations allowed before failing.
    pub fn set_budget(&self, budget: i64) {
        self.budget.store(budget, Ordering::SeqCst);
    }

    /// The wrapped store.
    pub fn inner(&self) -> &MemoryDocumentStore {
        &self.inner
    }

    /// Spends one unit, returning whether the operation may go ahead.
    fn spend(budget: &AtomicI64, fault: Fault) -> Result<bool, DialogDocumentError> {
        if budget.fetch_sub(1, Ordering::SeqCst) > 0 {
            return Ok(true);
        }
        match fault {
            Fault::Backend => Err(DialogDocumentError::Backend("Injected storage fault".into())),
            Fault::Missing => Ok(false),
        }
    }
}

impl DocumentStore for FaultyDocumentStore {
    type Cursor = FaultyCursor;

    fn begin_read(&self, revision: Revision) -> Result<Self::Cursor, DialogDocumentError> {
        Self::spend(&self.budget, self.fault)?;
        Ok(FaultyCursor {
            inner: self.inner.begin_read(revision)?,
            budget: self.budget.clone(),
            fault: self.fault,
        })
    }

    fn latest_revision(&self) -> Option<Revision> {
        self.inner.latest_revision()
    }
}

/// The cursor handed out by [`FaultyDocumentStore`].
pub struct FaultyCursor {
    inner: MemoryCursor,
    budget: Arc<AtomicI64>,
    fault: Fault,
}

impl FaultyCursor {
    fn spend(&self) -> Result<bool, DialogDocumentError> {
        FaultyDocumentStore::spend(&self.budget, self.fault)
    }
}

impl NodeCursor for FaultyCursor {
    fn revision(&self) -> Revision {
        self.inner.revision()
    }

    fn node_key(&self) -> NodeKey {
        self.inner.node_key()
    }

    fn kind(&self) -> NodeKind {
        self.inner.kind()
    }

    fn name(&self) -> Option<&QualifiedName> {
        self.inner.name()
    }

    fn value(&self) -> Option<&str> {
        self.inner.value()
    }

    fn parent_key(&self) -> Option<NodeKey> {
        self.inner.parent_key()
    }

    fn first_child_key(&self) -> Option<NodeKey> {
        self.inner.first_child_key()
    }

    fn left_sibling_key(&self) -> Option<NodeKey> {
        self.inner.left_sibling_key()
    }

    fn right_sibling_key(&self) -> Option<NodeKey> {
        self.inner.right_sibling_key()
    }

    fn child_count(&self) -> u64 {
        self.inner.child_count()
    }

    fn attribute_count(&self) -> usize {
        self.inner.attribute_count()
    }

    fn namespace_count(&self) -> usize {
        self.inner.namespace_count()
    }

    fn move_to(&mut self, key: NodeKey) -> Result<bool, DialogDocumentError> {
        if !self.spend()? {
            return Ok(false);
        }
        self.inner.move_to(key)
    }

    fn move_to_attribute(&mut self, index: usize) -> Result<bool, DialogDocumentError> {
        if !self.spend()? {
            return Ok(false);
        }
        self.inner.move_to_attribute(index)
    }

    fn move_to_namespace(&mut self, index: usize) -> Result<bool, DialogDocumentError> {
        if !self.spend()? {
            return Ok(false);
        }
        self.inner.move_to_namespace(index)
    }

    fn close(&mut self) -> Result<(), DialogDocumentError> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentBuilder;

    #[test]
    fn it_fails_once_the_budget_is_spent() -> anyhow::Result<()> {
        let inner = MemoryDocumentStore::default();
        let revision = inner.commit(DocumentBuilder::new().element("a", |_| {}));
        let store = FaultyDocumentStore::new(inner.clone(), 2);

        let mut cursor = store.begin_read(revision)?;
        assert!(cursor.move_to_first_child()?);
        assert!(matches!(
            cursor.move_to_parent(),
            Err(DialogDocumentError::Backend(_))
        ));
        assert!(store.begin_read(revision).is_err());

        cursor.close()?;
        assert_eq!(inner.open_cursors(), 0);
        Ok(())
    }

    #[test]
    fn it_loses_nodes_once_the_budget_is_spent() -> anyhow::Result<()> {
        let inner = MemoryDocumentStore::default();
        let revision = inner.commit(DocumentBuilder::new().element("a", |_| {}));
        let store = FaultyDocumentStore::new(inner.clone(), 2).with_fault(Fault::Missing);

        let mut cursor = store.begin_read(revision)?;
        assert!(cursor.move_to_first_child()?);
        assert!(!cursor.move_to_parent()?);
        assert_eq!(cursor.node_key(), 1);

        let mut late = store.begin_read(revision)?;
        assert!(!late.move_to(1)?);
        late.close()?;
        cursor.close()?;
        assert_eq!(inner.open_cursors(), 0);
        Ok(())
    }
}
