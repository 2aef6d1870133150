use crate::{DialogDocumentError, NodeKey, NodeKind, QualifiedName, Revision};

/// A versioned document store that hands out read-only cursors pinned to a
/// revision.
///
/// A committed revision never changes, so any number of cursors may read the
/// same revision concurrently without coordination. Implementations that
/// cannot serve concurrent cursors from one session must open a session per
/// cursor.
pub trait DocumentStore: Send + Sync + 'static {
    /// The cursor type handed out by [`DocumentStore::begin_read`]
    type Cursor: NodeCursor + 'static;

    /// Opens a read-only cursor at `revision`, positioned at the document
    /// node. The cursor must be released with [`NodeCursor::close`].
    fn begin_read(&self, revision: Revision) -> Result<Self::Cursor, DialogDocumentError>;

    /// The most recently committed revision, if any.
    fn latest_revision(&self) -> Option<Revision>;
}

/// A read-only cursor into one revision of a document, positioned at exactly
/// one node at a time.
///
/// Accessors describe the node the cursor is currently positioned at. Moves
/// return `Ok(false)` and leave the cursor where it was when the target does
/// not exist; `Err` is reserved for storage failures.
pub trait NodeCursor: Send {
    /// The revision this cursor is pinned to
    fn revision(&self) -> Revision;

    /// The key of the current node
    fn node_key(&self) -> NodeKey;

    /// The kind of the current node
    fn kind(&self) -> NodeKind;

    /// The name of the current node, if its kind carries one
    fn name(&self) -> Option<&QualifiedName>;

    /// The raw stored value of the current node, if any
    fn value(&self) -> Option<&str>;

    /// The key of the parent of the current node. Attributes and namespaces
    /// report their owning element.
    fn parent_key(&self) -> Option<NodeKey>;

    /// The key of the first structural child of the current node
    fn first_child_key(&self) -> Option<NodeKey>;

    /// The key of the structural sibling to the left of the current node
    fn left_sibling_key(&self) -> Option<NodeKey>;

    /// The key of the structural sibling to the right of the current node
    fn right_sibling_key(&self) -> Option<NodeKey>;

    /// The number of structural children of the current node
    fn child_count(&self) -> u64;

    /// The number of attributes owned by the current node
    fn attribute_count(&self) -> usize;

    /// The number of namespace declarations owned by the current node
    fn namespace_count(&self) -> usize;

    /// Moves to the node identified by `key`
    fn move_to(&mut self, key: NodeKey) -> Result<bool, DialogDocumentError>;

    /// Moves to the attribute at `index` of the current node
    fn move_to_attribute(&mut self, index: usize) -> Result<bool, DialogDocumentError>;

    /// Moves to the namespace declaration at `index` of the current node
    fn move_to_namespace(&mut self, index: usize) -> Result<bool, DialogDocumentError>;

    /// Releases the cursor. Any later move fails with
    /// [`DialogDocumentError::CursorClosed`].
    fn close(&mut self) -> Result<(), DialogDocumentError>;

    /// Whether the current node has a parent
    fn has_parent(&self) -> bool {
        self.parent_key().is_some()
    }

    /// Whether the current node has at least one structural child
    fn has_first_child(&self) -> bool {
        self.first_child_key().is_some()
    }

    /// Whether the current node has a structural left sibling
    fn has_left_sibling(&self) -> bool {
        self.left_sibling_key().is_some()
    }

    /// Whether the current node has a structural right sibling
    fn has_right_sibling(&self) -> bool {
        self.right_sibling_key().is_some()
    }

    /// Moves to the parent of the current node
    fn move_to_parent(&mut self) -> Result<bool, DialogDocumentError> {
        match self.parent_key() {
            Some(key) => self.move_to(key),
            None => Ok(false),
        }
    }

    /// Moves to the first structural child of the current node
    fn move_to_first_child(&mut self) -> Result<bool, DialogDocumentError> {
        match self.first_child_key() {
            Some(key) => self.move_to(key),
            None => Ok(false),
        }
    }

    /// Moves to the left sibling of the current node
    fn move_to_left_sibling(&mut self) -> Result<bool, DialogDocumentError> {
        match self.left_sibling_key() {
            Some(key) => self.move_to(key),
            None => Ok(false),
        }
    }

    /// Moves to the right sibling of the current node
    fn move_to_right_sibling(&mut self) -> Result<bool, DialogDocumentError> {
        match self.right_sibling_key() {
            Some(key) => self.move_to(key),
            None => Ok(false),
        }
    }
}
