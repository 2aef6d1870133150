use std::cmp::Ordering;

use dialog_document::{DocumentStore, NodeKind};

use crate::{
    AtomicValue, AxisNodes, ErrorClass, Fingerprint, NameCode, NamespaceCode, NavigationError,
    NodeAdapter, NodeTest,
};

/// The node contract a tree query evaluator consumes.
///
/// Operations that have a natural "nothing there" outcome degrade storage
/// failures to that outcome and log them. Operations that must produce a
/// definite value propagate every failure. Precondition violations and
/// missing capabilities are always reported as errors, including those met
/// part way through an axis.
pub trait NodeCapabilities: Sized {
    /// The sequence produced by [`NodeCapabilities::iterate_axis`]
    type Axis: Iterator<Item = Result<Self, NavigationError>>;

    /// The kind of the node
    fn node_kind(&self) -> NodeKind;

    /// Whether both values denote the same node
    fn is_same_node(&self, other: &Self) -> bool;

    /// Document order of two nodes of the same tree
    fn compare_order(&self, other: &Self) -> Result<Ordering, NavigationError>;

    /// The nodes on the axis with numeric code `axis` that pass `test`
    fn iterate_axis(&self, axis: u8, test: NodeTest) -> Result<Self::Axis, NavigationError>;

    /// The parent, if any
    fn parent(&self) -> Result<Option<Self>, NavigationError>;

    /// Whether the node has children
    fn has_child_nodes(&self) -> Result<bool, NavigationError>;

    /// The position of the node among its siblings
    fn sibling_position(&self) -> Result<usize, NavigationError>;

    /// The string value
    fn string_value(&self) -> Result<String, NavigationError>;

    /// The atomized value
    fn atomize(&self) -> Result<AtomicValue, NavigationError>;

    /// The name code in the shared name pool
    fn name_code(&self) -> Result<Option<NameCode>, NavigationError>;

    /// The fingerprint in the shared name pool
    fn fingerprint(&self) -> Result<Option<Fingerprint>, NavigationError>;

    /// The namespace declarations of an element
    fn declared_namespaces(
        &self,
        buffer: Option<Vec<NamespaceCode>>,
    ) -> Result<Option<Vec<NamespaceCode>>, NavigationError>;

    /// The base URI
    fn base_uri(&self) -> Result<Option<String>, NavigationError>;

    /// A stable identifier of the node within its document
    fn generate_id(&self) -> String;

    /// The number of the owning document
    fn document_number(&self) -> Result<u64, NavigationError>;

    /// The line the node was parsed from
    fn line_number(&self) -> Result<usize, NavigationError>;

    /// The column the node was parsed from
    fn column_number(&self) -> Result<usize, NavigationError>;

    /// Whether the node is an ID
    fn is_id(&self) -> bool;

    /// Whether the node is an IDREF
    fn is_idref(&self) -> Result<bool, NavigationError>;

    /// Whether the node is nilled
    fn is_nilled(&self) -> Result<bool, NavigationError>;
}

/// Degrades a storage failure to `absent`, logging it. Every other error is
/// returned as is.
fn degrade<T>(
    result: Result<T, NavigationError>,
    operation: &'static str,
    absent: T,
) -> Result<T, NavigationError> {
    match result {
        Err(error) if error.class() == ErrorClass::Storage => {
            tracing::warn!(%error, operation, "Degrading storage failure to an empty result");
            Ok(absent)
        }
        result => result,
    }
}

/// An axis over [`NodeAdapter`]s that ends quietly at the first storage
/// failure. Any other failure is yielded once, and then the axis ends.
pub struct DegradingAxis<S>
where
    S: DocumentStore,
{
    nodes: Option<AxisNodes<S>>,
}

impl<S> DegradingAxis<S>
where
    S: DocumentStore,
{
    fn empty() -> Self {
        Self { nodes: None }
    }
}

impl<S> Iterator for DegradingAxis<S>
where
    S: DocumentStore,
{
    type Item = Result<NodeAdapter<S>, NavigationError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.nodes.as_mut()?.next() {
            Some(Ok(node)) => Some(Ok(node)),
            Some(Err(error)) if error.class() == ErrorClass::Storage => {
                tracing::warn!(%error, "Ending axis early after a storage failure");
                self.nodes = None;
                None
            }
            Some(Err(error)) => {
                self.nodes = None;
                Some(Err(error))
            }
            None => {
                self.nodes = None;
                None
            }
        }
    }
}

impl<S> NodeCapabilities for NodeAdapter<S>
where
    S: DocumentStore,
{
    type Axis = DegradingAxis<S>;

    fn node_kind(&self) -> NodeKind {
        self.kind()
    }

    fn is_same_node(&self, other: &Self) -> bool {
        NodeAdapter::is_same_node(self, other)
    }

    fn compare_order(&self, other: &Self) -> Result<Ordering, NavigationError> {
        NodeAdapter::compare_order(self, other)
    }

    fn iterate_axis(&self, axis: u8, test: NodeTest) -> Result<Self::Axis, NavigationError> {
        let nodes = degrade(
            self.iterate_axis_code(axis, test).map(Some),
            "iterate_axis",
            None,
        )?;
        Ok(match nodes {
            Some(nodes) => DegradingAxis { nodes: Some(nodes) },
            None => DegradingAxis::empty(),
        })
    }

    fn parent(&self) -> Result<Option<Self>, NavigationError> {
        degrade(NodeAdapter::parent(self), "parent", None)
    }

    fn has_child_nodes(&self) -> Result<bool, NavigationError> {
        degrade(NodeAdapter::has_child_nodes(self), "has_child_nodes", false)
    }

    fn sibling_position(&self) -> Result<usize, NavigationError> {
        degrade(NodeAdapter::sibling_position(self), "sibling_position", 0)
    }

    fn string_value(&self) -> Result<String, NavigationError> {
        NodeAdapter::string_value(self)
    }

    fn atomize(&self) -> Result<AtomicValue, NavigationError> {
        NodeAdapter::atomize(self)
    }

    fn name_code(&self) -> Result<Option<NameCode>, NavigationError> {
        NodeAdapter::name_code(self)
    }

    fn fingerprint(&self) -> Result<Option<Fingerprint>, NavigationError> {
        NodeAdapter::fingerprint(self)
    }

    fn declared_namespaces(
        &self,
        buffer: Option<Vec<NamespaceCode>>,
    ) -> Result<Option<Vec<NamespaceCode>>, NavigationError> {
        NodeAdapter::declared_namespaces(self, buffer)
    }

    fn base_uri(&self) -> Result<Option<String>, NavigationError> {
        NodeAdapter::base_uri(self)
    }

    fn generate_id(&self) -> String {
        NodeAdapter::generate_id(self)
    }

    fn document_number(&self) -> Result<u64, NavigationError> {
        NodeAdapter::document_number(self)
    }

    fn line_number(&self) -> Result<usize, NavigationError> {
        NodeAdapter::line_number(self)
    }

    fn column_number(&self) -> Result<usize, NavigationError> {
        NodeAdapter::column_number(self)
    }

    fn is_id(&self) -> bool {
        NodeAdapter::is_id(self)
    }

    fn is_idref(&self) -> Result<bool, NavigationError> {
        NodeAdapter::is_idref(self)
    }

    fn is_nilled(&self) -> Result<bool, NavigationError> {
        NodeAdapter::is_nilled(self)
    }
}
