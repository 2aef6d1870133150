use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};

use dialog_document::{
    DocumentStore, NodeCursor, NodeKey, NodeKind, QualifiedName, Revision, XML_NAMESPACE,
};

use crate::{
    AtomicValue, AxisIterator, DocumentScope, FINGERPRINT_MASK, Fingerprint, NAMESPACE_LIST_END,
    NameCode, NamespaceCode, NavigationError, NodeHandle, NodeTest, TransactionScope,
    TypeAnnotation,
    axis::{Axis, DescendantWalk, Walk},
};

/// The node view handed to tree query evaluators.
///
/// An adapter is an immutable [`NodeHandle`] plus a weak reference to the
/// [`DocumentScope`] it was read from. It holds no cursor between calls:
/// every operation opens a [`TransactionScope`], reads what it needs and
/// releases it before returning. Navigation always produces fresh adapters.
pub struct NodeAdapter<S>
where
    S: DocumentStore,
{
    handle: NodeHandle,
    document: Weak<DocumentScope<S>>,
}

impl<S> Clone for NodeAdapter<S>
where
    S: DocumentStore,
{
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            document: self.document.clone(),
        }
    }
}

impl<S> NodeAdapter<S>
where
    S: DocumentStore,
{
    pub(crate) fn new(handle: NodeHandle, document: Weak<DocumentScope<S>>) -> Self {
        Self { handle, document }
    }

    pub(crate) fn document(&self) -> Result<Arc<DocumentScope<S>>, NavigationError> {
        self.document
            .upgrade()
            .ok_or(NavigationError::DocumentReleased)
    }

    fn scope(&self) -> Result<TransactionScope<S::Cursor>, NavigationError> {
        self.document()?.open_scope(self.handle.key())
    }

    fn adapt(&self, handle: NodeHandle) -> Self {
        Self::new(handle, self.document.clone())
    }

    /// The identity of this node
    pub fn handle(&self) -> &NodeHandle {
        &self.handle
    }

    /// The handle this view wraps, for callers that need the raw identity.
    pub fn underlying_node(&self) -> &NodeHandle {
        &self.handle
    }

    /// The node key
    pub fn key(&self) -> NodeKey {
        self.handle.key()
    }

    /// The revision the node was read at
    pub fn revision(&self) -> Revision {
        self.handle.revision()
    }

    /// The node kind
    pub fn kind(&self) -> NodeKind {
        self.handle.kind()
    }

    /// The evaluator's numeric code for the node kind
    pub fn node_kind(&self) -> u8 {
        self.handle.kind().id()
    }

    /// Whether both nodes were read from the same store at the same
    /// revision. Documents opened separately over one store and revision
    /// are the same tree. A node whose document has been released only
    /// shares a tree with nodes of that same document.
    fn same_tree(&self, other: &Self) -> bool {
        if self.handle.revision() != other.handle.revision() {
            return false;
        }
        if Weak::ptr_eq(&self.document, &other.document) {
            return true;
        }
        match (self.document.upgrade(), other.document.upgrade()) {
            (Some(this), Some(that)) => Arc::ptr_eq(this.store(), that.store()),
            _ => false,
        }
    }

    /// Whether `other` denotes the same node: the same key in the same tree,
    /// where a tree is one store at one revision.
    pub fn is_same_node(&self, other: &Self) -> bool {
        self.handle.key() == other.handle.key() && self.same_tree(other)
    }

    /// Orders two nodes of the same tree by document order. Comparing nodes
    /// of different stores or revisions is a precondition violation.
    pub fn compare_order(&self, other: &Self) -> Result<Ordering, NavigationError> {
        if !self.same_tree(other) {
            return Err(NavigationError::ForeignTree);
        }
        if self.handle.key() == other.handle.key() {
            return Ok(Ordering::Equal);
        }

        let mut scope = self.scope()?;
        let this = document_position(&mut scope)?;
        if !scope.move_to(other.handle.key())? {
            return Err(NavigationError::NoSuchNode {
                key: other.handle.key(),
            });
        }
        let that = document_position(&mut scope)?;
        Ok(this.cmp(&that))
    }

    /// The string value: the concatenated descendant text of documents and
    /// elements, and the stored value of every other kind.
    pub fn string_value(&self) -> Result<String, NavigationError> {
        let mut scope = self.scope()?;
        match self.handle.kind() {
            NodeKind::Root | NodeKind::Element => {
                let mut value = String::new();
                let mut walk = DescendantWalk::new(self.handle.key(), false);
                while walk.advance(&mut scope)? {
                    if scope.kind() == NodeKind::Text {
                        value.push_str(scope.value().unwrap_or_default());
                    }
                }
                Ok(value)
            }
            NodeKind::Text
            | NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => Ok(scope.value().unwrap_or_default().to_owned()),
        }
    }

    /// The atomized value of the node.
    pub fn atomize(&self) -> Result<AtomicValue, NavigationError> {
        let value = self.string_value()?;
        Ok(match self.handle.kind() {
            NodeKind::Comment | NodeKind::ProcessingInstruction => AtomicValue::String(value),
            NodeKind::Root
            | NodeKind::Element
            | NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Text => AtomicValue::UntypedAtomic(value),
        })
    }

    /// The typed value of the node as a sequence, which for unvalidated
    /// nodes is always the single atomized value.
    pub fn typed_value(&self) -> Result<Vec<AtomicValue>, NavigationError> {
        Ok(vec![self.atomize()?])
    }

    /// The type annotation of the node.
    pub fn type_annotation(&self) -> TypeAnnotation {
        match self.handle.kind() {
            NodeKind::Attribute => TypeAnnotation::UntypedAtomic,
            NodeKind::Root
            | NodeKind::Element
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => TypeAnnotation::Untyped,
        }
    }

    fn name(&self) -> Option<&QualifiedName> {
        self.handle.name()
    }

    /// The local part of the name. Namespace nodes report their prefix and
    /// processing instructions their target; unnamed kinds report `""`.
    pub fn local_part(&self) -> String {
        match self.handle.kind() {
            NodeKind::Element
            | NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::ProcessingInstruction => self
                .name()
                .map(|name| name.local_name.clone())
                .unwrap_or_default(),
            NodeKind::Root | NodeKind::Text | NodeKind::Comment => String::new(),
        }
    }

    /// The prefix of an element or attribute name, otherwise `""`.
    pub fn prefix(&self) -> String {
        match self.handle.kind() {
            NodeKind::Element | NodeKind::Attribute => self
                .name()
                .map(|name| name.prefix.clone())
                .unwrap_or_default(),
            NodeKind::Root
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => String::new(),
        }
    }

    /// The namespace URI of an element or attribute name, otherwise `""`.
    pub fn uri(&self) -> String {
        match self.handle.kind() {
            NodeKind::Element | NodeKind::Attribute => self
                .name()
                .map(|name| name.namespace_uri.clone())
                .unwrap_or_default(),
            NodeKind::Root
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => String::new(),
        }
    }

    /// The lexical name: `prefix:local` or `local`, `""` for unnamed kinds.
    pub fn display_name(&self) -> String {
        let prefix = self.prefix();
        let local = self.local_part();
        if prefix.is_empty() {
            local
        } else {
            format!("{prefix}:{local}")
        }
    }

    /// The name code allocated in the document's name pool, for element,
    /// attribute and processing instruction nodes.
    pub fn name_code(&self) -> Result<Option<NameCode>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Element | NodeKind::Attribute | NodeKind::ProcessingInstruction => {
                let document = self.document()?;
                let code = document.name_pool().allocate(
                    &self.prefix(),
                    &self.uri(),
                    &self.local_part(),
                )?;
                Ok(Some(code))
            }
            NodeKind::Root | NodeKind::Namespace | NodeKind::Text | NodeKind::Comment => Ok(None),
        }
    }

    /// The prefix-independent part of [`NodeAdapter::name_code`].
    pub fn fingerprint(&self) -> Result<Option<Fingerprint>, NavigationError> {
        Ok(self.name_code()?.map(|code| code & FINGERPRINT_MASK))
    }

    /// The parent node, or `None` for the document node. Attributes and
    /// namespaces report their owning element.
    pub fn parent(&self) -> Result<Option<Self>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Root => Ok(None),
            NodeKind::Element
            | NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => self.step(|scope| scope.move_to_parent()),
        }
    }

    /// The first structural child.
    pub fn first_child(&self) -> Result<Option<Self>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Root | NodeKind::Element => self.step(|scope| scope.move_to_first_child()),
            NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => Ok(None),
        }
    }

    /// The structural sibling to the right.
    pub fn next_sibling(&self) -> Result<Option<Self>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Root | NodeKind::Attribute | NodeKind::Namespace => Ok(None),
            NodeKind::Element
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => self.step(|scope| scope.move_to_right_sibling()),
        }
    }

    /// The structural sibling to the left.
    pub fn previous_sibling(&self) -> Result<Option<Self>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Root | NodeKind::Attribute | NodeKind::Namespace => Ok(None),
            NodeKind::Element
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => self.step(|scope| scope.move_to_left_sibling()),
        }
    }

    fn step<Move>(&self, step: Move) -> Result<Option<Self>, NavigationError>
    where
        Move: FnOnce(&mut TransactionScope<S::Cursor>) -> Result<bool, NavigationError>,
    {
        let mut scope = self.scope()?;
        if !step(&mut scope)? {
            return Ok(None);
        }
        Ok(Some(self.adapt(scope.into_handle()?)))
    }

    /// Whether the node has at least one structural child.
    pub fn has_child_nodes(&self) -> Result<bool, NavigationError> {
        match self.handle.kind() {
            NodeKind::Root | NodeKind::Element => Ok(self.scope()?.has_first_child()),
            NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => Ok(false),
        }
    }

    /// The zero-based position of the node among its siblings. Attributes
    /// and namespaces report their position on the owning element.
    pub fn sibling_position(&self) -> Result<usize, NavigationError> {
        match self.handle.kind() {
            NodeKind::Root => Ok(0),
            NodeKind::Attribute | NodeKind::Namespace => {
                let mut scope = self.scope()?;
                owned_position(&mut scope)
            }
            NodeKind::Element
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => {
                let mut scope = self.scope()?;
                let mut position = 0;
                while scope.move_to_left_sibling()? {
                    position += 1;
                }
                Ok(position)
            }
        }
    }

    /// The document node of the tree this node belongs to.
    pub fn root(&self) -> Result<Self, NavigationError> {
        self.document()?.root()
    }

    /// The value of the attribute `{namespace_uri}local_name` of an element,
    /// if it has one.
    pub fn attribute_value(
        &self,
        namespace_uri: &str,
        local_name: &str,
    ) -> Result<Option<String>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Element => {
                let mut scope = self.scope()?;
                find_attribute(&mut scope, namespace_uri, local_name)
            }
            NodeKind::Root
            | NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => Ok(None),
        }
    }

    /// The value of the attribute whose expanded name has `fingerprint` in
    /// the document's name pool.
    pub fn attribute_value_by_fingerprint(
        &self,
        fingerprint: Fingerprint,
    ) -> Result<Option<String>, NavigationError> {
        let Some(name) = self.document()?.name_pool().expanded_name(fingerprint) else {
            return Ok(None);
        };
        self.attribute_value(&name.namespace_uri, &name.local_name)
    }

    /// The base URI of the node: the nearest `xml:base` attribute on the node
    /// or one of its ancestors, else the base URI of the document.
    pub fn base_uri(&self) -> Result<Option<String>, NavigationError> {
        let document = self.document()?;
        let mut scope = document.open_scope(self.handle.key())?;
        loop {
            if scope.kind() == NodeKind::Element
                && let Some(base) = find_attribute(&mut scope, XML_NAMESPACE, "base")?
            {
                return Ok(Some(base));
            }
            if !scope.move_to_parent()? {
                break;
            }
        }
        Ok(document.base_uri())
    }

    /// The system identifier of the document this node belongs to.
    pub fn system_id(&self) -> Result<Option<String>, NavigationError> {
        Ok(self.document()?.base_uri())
    }

    /// Replaces the system identifier (and base URI) of the document this
    /// node belongs to.
    pub fn set_system_id(&self, system_id: impl Into<String>) -> Result<(), NavigationError> {
        self.document()?.set_base_uri(system_id);
        Ok(())
    }

    /// The namespace codes of the declarations made on an element, or `None`
    /// for any other kind.
    ///
    /// When `buffer` is long enough it is filled and returned instead of a
    /// new vector. If it is longer than the number of declarations, the entry
    /// after the last code is set to [`NAMESPACE_LIST_END`].
    pub fn declared_namespaces(
        &self,
        buffer: Option<Vec<NamespaceCode>>,
    ) -> Result<Option<Vec<NamespaceCode>>, NavigationError> {
        match self.handle.kind() {
            NodeKind::Element => {}
            NodeKind::Root
            | NodeKind::Attribute
            | NodeKind::Namespace
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => return Ok(None),
        }

        let document = self.document()?;
        let mut scope = document.open_scope(self.handle.key())?;
        let count = scope.namespace_count();
        if count == 0 {
            return Ok(Some(Vec::new()));
        }

        let mut codes = match buffer {
            Some(buffer) if buffer.len() >= count => buffer,
            _ => vec![0; count],
        };
        for index in 0..count {
            if !scope.move_to_namespace(index)? {
                return Err(NavigationError::NoSuchNode {
                    key: self.handle.key(),
                });
            }
            if let Some(name) = scope.name() {
                codes[index] = document
                    .name_pool()
                    .allocate_namespace_code(&name.local_name, &name.namespace_uri)?;
            }
            scope.move_to(self.handle.key())?;
        }
        if count < codes.len() {
            codes[count] = NAMESPACE_LIST_END;
        }
        Ok(Some(codes))
    }

    /// A string that identifies this node among all nodes of its document.
    pub fn generate_id(&self) -> String {
        self.handle.key().to_string()
    }

    /// The number of the document this node belongs to.
    pub fn document_number(&self) -> Result<u64, NavigationError> {
        Ok(self.document()?.document_number())
    }

    /// Line numbers are not recorded by the document store.
    pub fn line_number(&self) -> Result<usize, NavigationError> {
        Err(NavigationError::Unsupported {
            facility: "Line numbers",
        })
    }

    /// Column numbers are not recorded by the document store.
    pub fn column_number(&self) -> Result<usize, NavigationError> {
        Err(NavigationError::Unsupported {
            facility: "Column numbers",
        })
    }

    /// Always false: the store keeps no DTD or schema information.
    pub fn is_id(&self) -> bool {
        false
    }

    /// IDREF-ness requires schema information the store does not keep.
    pub fn is_idref(&self) -> Result<bool, NavigationError> {
        Err(NavigationError::Unsupported {
            facility: "IDREF detection",
        })
    }

    /// Nilled status requires schema validation the store does not perform.
    pub fn is_nilled(&self) -> Result<bool, NavigationError> {
        Err(NavigationError::Unsupported {
            facility: "Nilled status",
        })
    }

    /// The nodes on `axis` from this node that pass `test`.
    pub fn iterate_axis(&self, axis: Axis, test: NodeTest) -> Result<AxisNodes<S>, NavigationError> {
        let document = self.document()?;
        Ok(AxisNodes {
            handles: document.dispatcher().dispatch(&self.handle, axis, test)?,
            document: self.document.clone(),
        })
    }

    /// The nodes on the axis with numeric code `axis`.
    pub fn iterate_axis_code(
        &self,
        axis: u8,
        test: NodeTest,
    ) -> Result<AxisNodes<S>, NavigationError> {
        self.iterate_axis(Axis::try_from(axis)?, test)
    }
}

impl<S> PartialEq for NodeAdapter<S>
where
    S: DocumentStore,
{
    fn eq(&self, other: &Self) -> bool {
        self.is_same_node(other)
    }
}

impl<S> Eq for NodeAdapter<S> where S: DocumentStore {}

impl<S> Hash for NodeAdapter<S>
where
    S: DocumentStore,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl<S> std::fmt::Debug for NodeAdapter<S>
where
    S: DocumentStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeAdapter")
            .field("handle", &self.handle)
            .finish()
    }
}

/// The nodes of an [`AxisIterator`] as fresh [`NodeAdapter`]s.
pub struct AxisNodes<S>
where
    S: DocumentStore,
{
    handles: AxisIterator<S>,
    document: Weak<DocumentScope<S>>,
}

impl<S> AxisNodes<S>
where
    S: DocumentStore,
{
    /// A fresh sequence over the same axis from the same origin.
    pub fn another(&self) -> Result<Self, NavigationError> {
        Ok(Self {
            handles: self.handles.another()?,
            document: self.document.clone(),
        })
    }

    /// The underlying sequence of handles.
    pub fn into_handles(self) -> AxisIterator<S> {
        self.handles
    }
}

impl<S> Iterator for AxisNodes<S>
where
    S: DocumentStore,
{
    type Item = Result<NodeAdapter<S>, NavigationError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.handles
            .next()
            .map(|handle| handle.map(|handle| NodeAdapter::new(handle, self.document.clone())))
    }
}

/// The steps from the document node down to the current node. Each step is
/// a class (namespace, then attribute, then child) and a position, so paths
/// compare in document order.
fn document_position<C>(
    scope: &mut TransactionScope<C>,
) -> Result<Vec<(u8, usize)>, NavigationError>
where
    C: NodeCursor,
{
    let mut path = Vec::new();
    loop {
        let climbed = match scope.kind() {
            NodeKind::Root => break,
            NodeKind::Namespace => {
                path.push((0, owned_position(scope)?));
                true
            }
            NodeKind::Attribute => {
                path.push((1, owned_position(scope)?));
                true
            }
            NodeKind::Element
            | NodeKind::Text
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => {
                let mut position = 0;
                while scope.move_to_left_sibling()? {
                    position += 1;
                }
                path.push((2, position));
                scope.move_to_parent()?
            }
        };
        if !climbed {
            break;
        }
    }
    path.reverse();
    Ok(path)
}

/// The position of the current attribute or namespace on its owning element.
/// Leaves the scope at the owning element.
fn owned_position<C>(scope: &mut TransactionScope<C>) -> Result<usize, NavigationError>
where
    C: NodeCursor,
{
    let key = scope.node_key();
    let attribute = scope.kind() == NodeKind::Attribute;
    if !scope.move_to_parent()? {
        return Err(NavigationError::NoSuchNode { key });
    }
    let owner = scope.node_key();
    let count = if attribute {
        scope.attribute_count()
    } else {
        scope.namespace_count()
    };

    for position in 0..count {
        let moved = if attribute {
            scope.move_to_attribute(position)?
        } else {
            scope.move_to_namespace(position)?
        };
        let found = moved && scope.node_key() == key;
        scope.move_to(owner)?;
        if found {
            return Ok(position);
        }
    }
    Err(NavigationError::NoSuchNode { key })
}

/// The value of the attribute `{namespace_uri}local_name` of the current
/// element. Leaves the scope at the element.
fn find_attribute<C>(
    scope: &mut TransactionScope<C>,
    namespace_uri: &str,
    local_name: &str,
) -> Result<Option<String>, NavigationError>
where
    C: NodeCursor,
{
    let owner = scope.node_key();
    for index in 0..scope.attribute_count() {
        if !scope.move_to_attribute(index)? {
            break;
        }
        let value = scope
            .name()
            .filter(|name| name.namespace_uri == namespace_uri && name.local_name == local_name)
            .map(|_| scope.value().unwrap_or_default().to_owned());
        scope.move_to(owner)?;
        if value.is_some() {
            return Ok(value);
        }
    }
    Ok(None)
}
