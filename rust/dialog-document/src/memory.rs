use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use parking_lot::RwLock;

use crate::{
    DialogDocumentError, DocumentBuilder, DocumentStore, NodeCursor, NodeKey, NodeKind,
    QualifiedName, ROOT_NODE_KEY, Revision,
};

/// The stored form of a single node within a revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Key of this node
    pub key: NodeKey,
    /// Kind of this node
    pub kind: NodeKind,
    /// Name, for kinds that carry one
    pub name: Option<QualifiedName>,
    /// Raw value (text content, attribute value, comment, instruction data)
    pub value: Option<String>,
    /// Parent, or owning element for attributes and namespaces
    pub parent: Option<NodeKey>,
    /// First structural child
    pub first_child: Option<NodeKey>,
    /// Structural sibling on the left
    pub left_sibling: Option<NodeKey>,
    /// Structural sibling on the right
    pub right_sibling: Option<NodeKey>,
    /// Number of structural children
    pub child_count: u64,
    /// Owned attributes, in declaration order
    pub attributes: Vec<NodeKey>,
    /// Owned namespace declarations, in declaration order
    pub namespaces: Vec<NodeKey>,
}

impl NodeRecord {
    pub(crate) fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            name: None,
            value: None,
            parent: None,
            first_child: None,
            left_sibling: None,
            right_sibling: None,
            child_count: 0,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

/// An immutable revision: every node record, indexed by key.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    nodes: Vec<NodeRecord>,
}

impl Snapshot {
    pub(crate) fn new(nodes: Vec<NodeRecord>) -> Self {
        Self { nodes }
    }

    /// Looks up the record for `key`.
    pub fn get(&self, key: NodeKey) -> Option<&NodeRecord> {
        usize::try_from(key)
            .ok()
            .and_then(|index| self.nodes.get(index))
    }

    /// The number of nodes in this revision.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether this revision holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A trivial implementation of [`DocumentStore`] where every revision is kept
/// in memory as an immutable [`Snapshot`] and never persisted.
///
/// Revisions are append-only: [`MemoryDocumentStore::commit`] adds a new
/// revision and never touches an existing one.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    revisions: Arc<RwLock<Vec<Arc<Snapshot>>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryDocumentStore {
    /// Appends the document described by `builder` as a new revision and
    /// returns its number.
    pub fn commit(&self, builder: DocumentBuilder) -> Revision {
        let snapshot = Arc::new(builder.build());
        let mut revisions = self.revisions.write();
        revisions.push(snapshot);
        (revisions.len() - 1) as Revision
    }

    /// The snapshot of `revision`, if it was committed.
    pub fn snapshot(&self, revision: Revision) -> Option<Arc<Snapshot>> {
        let index = usize::try_from(revision).ok()?;
        self.revisions.read().get(index).cloned()
    }

    /// The number of cursors that were begun and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocumentStore")
            .field("revisions", &self.revisions.read().len())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}

impl DocumentStore for MemoryDocumentStore {
    type Cursor = MemoryCursor;

    fn begin_read(&self, revision: Revision) -> Result<Self::Cursor, DialogDocumentError> {
        let snapshot = self
            .snapshot(revision)
            .ok_or(DialogDocumentError::UnknownRevision(revision))?;
        if snapshot.get(ROOT_NODE_KEY).is_none() {
            return Err(DialogDocumentError::Backend(format!(
                "Revision {revision} has no document node"
            )));
        }
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryCursor {
            snapshot,
            revision,
            current: ROOT_NODE_KEY,
            open_cursors: Some(self.open_cursors.clone()),
        })
    }

    fn latest_revision(&self) -> Option<Revision> {
        self.revisions
            .read()
            .len()
            .checked_sub(1)
            .map(|index| index as Revision)
    }
}

/// A [`NodeCursor`] over one [`Snapshot`] of a [`MemoryDocumentStore`].
pub struct MemoryCursor {
    snapshot: Arc<Snapshot>,
    revision: Revision,
    current: NodeKey,
    open_cursors: Option<Arc<AtomicUsize>>,
}

impl MemoryCursor {
    fn record(&self) -> &NodeRecord {
        // `current` only ever holds keys that were found in the snapshot, and
        // `begin_read` checks the document node exists.
        &self.snapshot.nodes[self.current as usize]
    }

    fn ensure_open(&self) -> Result<(), DialogDocumentError> {
        match self.open_cursors {
            Some(_) => Ok(()),
            None => Err(DialogDocumentError::CursorClosed),
        }
    }
}

impl NodeCursor for MemoryCursor {
    fn revision(&self) -> Revision {
        self.revision
    }

    fn node_key(&self) -> NodeKey {
        self.current
    }

    fn kind(&self) -> NodeKind {
        self.record().kind
    }

    fn name(&self) -> Option<&QualifiedName> {
        self.record().name.as_ref()
    }

    fn value(&self) -> Option<&str> {
        self.record().value.as_deref()
    }

    fn parent_key(&self) -> Option<NodeKey> {
        self.record().parent
    }

    fn first_child_key(&self) -> Option<NodeKey> {
        self.record().first_child
    }

    fn left_sibling_key(&self) -> Option<NodeKey> {
        self.record().left_sibling
    }

    fn right_sibling_key(&self) -> Option<NodeKey> {
        self.record().right_sibling
    }

    fn child_count(&self) -> u64 {
        self.record().child_count
    }

    fn attribute_count(&self) -> usize {
        self.record().attributes.len()
    }

    fn namespace_count(&self) -> usize {
        self.record().namespaces.len()
    }

    fn move_to(&mut self, key: NodeKey) -> Result<bool, DialogDocumentError> {
        self.ensure_open()?;
        Ok(match self.snapshot.get(key) {
            Some(_) => {
                self.current = key;
                true
            }
            None => false,
        })
    }

    fn move_to_attribute(&mut self, index: usize) -> Result<bool, DialogDocumentError> {
        self.ensure_open()?;
        match self.record().attributes.get(index).copied() {
            Some(key) => self.move_to(key),
            None => Ok(false),
        }
    }

    fn move_to_namespace(&mut self, index: usize) -> Result<bool, DialogDocumentError> {
        self.ensure_open()?;
        match self.record().namespaces.get(index).copied() {
            Some(key) => self.move_to(key),
            None => Ok(false),
        }
    }

    fn close(&mut self) -> Result<(), DialogDocumentError> {
        match self.open_cursors.take() {
            Some(open_cursors) => {
                open_cursors.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(DialogDocumentError::CursorClosed),
        }
    }
}
