use std::{fmt::Debug, sync::Arc};

use dialog_document::NodeKind;

use crate::{Fingerprint, NamePool, NodeHandle};

/// A caller-supplied acceptance predicate over node handles.
pub type NodePredicate = Arc<dyn Fn(&NodeHandle) -> bool + Send + Sync>;

/// A predicate over kind and name used to filter an axis before any node
/// view is materialized.
#[derive(Clone)]
pub enum NodeTest {
    /// Accepts every node
    Any,
    /// Accepts nodes of one kind
    Kind(NodeKind),
    /// Accepts nodes of one kind with the given expanded name
    Name {
        /// Required kind
        kind: NodeKind,
        /// Required namespace URI, empty for no namespace
        namespace_uri: String,
        /// Required local name
        local_name: String,
    },
    /// Accepts nodes of one kind whose expanded name has this fingerprint in
    /// the document's name pool
    Fingerprint {
        /// Required kind
        kind: NodeKind,
        /// Required fingerprint
        fingerprint: Fingerprint,
    },
    /// Accepts nodes for which the predicate holds
    Predicate(NodePredicate),
}

impl NodeTest {
    /// A test that accepts every node
    pub fn any() -> Self {
        NodeTest::Any
    }

    /// A test that accepts nodes of `kind`
    pub fn kind(kind: NodeKind) -> Self {
        NodeTest::Kind(kind)
    }

    /// A test that accepts nodes of `kind` named `{namespace_uri}local_name`
    pub fn name(
        kind: NodeKind,
        namespace_uri: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        NodeTest::Name {
            kind,
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
        }
    }

    /// A test that accepts nodes of `kind` whose name has `fingerprint`
    pub fn fingerprint(kind: NodeKind, fingerprint: Fingerprint) -> Self {
        NodeTest::Fingerprint { kind, fingerprint }
    }

    /// A test backed by an arbitrary predicate
    pub fn predicate<Predicate>(predicate: Predicate) -> Self
    where
        Predicate: Fn(&NodeHandle) -> bool + Send + Sync + 'static,
    {
        NodeTest::Predicate(Arc::new(predicate))
    }

    /// Whether `handle` passes this test. Fingerprints are looked up in
    /// `pool` without allocating.
    pub fn matches(&self, handle: &NodeHandle, pool: &dyn NamePool) -> bool {
        match self {
            NodeTest::Any => true,
            NodeTest::Kind(kind) => handle.kind() == *kind,
            NodeTest::Name {
                kind,
                namespace_uri,
                local_name,
            } => {
                handle.kind() == *kind
                    && expanded_name(handle)
                        .is_some_and(|(uri, local)| uri == namespace_uri && local == local_name)
            }
            NodeTest::Fingerprint { kind, fingerprint } => {
                handle.kind() == *kind
                    && expanded_name(handle)
                        .and_then(|(uri, local)| pool.fingerprint(uri, local))
                        .is_some_and(|found| found == *fingerprint)
            }
            NodeTest::Predicate(predicate) => predicate(handle),
        }
    }
}

/// The (namespace URI, local name) pair a name test compares against. The
/// name of a namespace node is its prefix, in no namespace.
pub(crate) fn expanded_name(handle: &NodeHandle) -> Option<(&str, &str)> {
    let name = handle.name()?;
    Some(match handle.kind() {
        NodeKind::Namespace => ("", name.local_name.as_str()),
        _ => (name.namespace_uri.as_str(), name.local_name.as_str()),
    })
}

impl Debug for NodeTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeTest::Any => write!(f, "node()"),
            NodeTest::Kind(kind) => write!(f, "{kind:?}()"),
            NodeTest::Name {
                kind,
                namespace_uri,
                local_name,
            } => write!(f, "{kind:?}(Q{{{namespace_uri}}}{local_name})"),
            NodeTest::Fingerprint { kind, fingerprint } => {
                write!(f, "{kind:?}(#{fingerprint})")
            }
            NodeTest::Predicate(_) => write!(f, "predicate"),
        }
    }
}

impl Default for NodeTest {
    fn default() -> Self {
        NodeTest::Any
    }
}

#[cfg(test)]
mod tests {
    use dialog_document::QualifiedName;

    use super::*;
    use crate::SharedNamePool;

    fn element(name: QualifiedName) -> NodeHandle {
        NodeHandle::new(1, 0, NodeKind::Element, Some(name))
    }

    #[test]
    fn it_tests_kinds_and_names() {
        let pool = SharedNamePool::new();
        let item = element(QualifiedName::new("p", "item", "urn:x"));

        assert!(NodeTest::any().matches(&item, &pool));
        assert!(NodeTest::kind(NodeKind::Element).matches(&item, &pool));
        assert!(!NodeTest::kind(NodeKind::Text).matches(&item, &pool));
        assert!(NodeTest::name(NodeKind::Element, "urn:x", "item").matches(&item, &pool));
        assert!(!NodeTest::name(NodeKind::Element, "", "item").matches(&item, &pool));
        assert!(!NodeTest::name(NodeKind::Attribute, "urn:x", "item").matches(&item, &pool));
    }

    #[test]
    fn it_tests_fingerprints_without_allocating() -> anyhow::Result<()> {
        let pool = SharedNamePool::new();
        let item = element(QualifiedName::new("p", "item", "urn:x"));
        let fingerprint = pool.allocate("q", "urn:x", "item")? & crate::FINGERPRINT_MASK;

        assert!(NodeTest::fingerprint(NodeKind::Element, fingerprint).matches(&item, &pool));
        let other = element(QualifiedName::local("unknown"));
        assert!(!NodeTest::fingerprint(NodeKind::Element, fingerprint).matches(&other, &pool));
        assert_eq!(pool.fingerprint("", "unknown"), None);
        Ok(())
    }

    #[test]
    fn it_names_namespace_nodes_by_prefix() {
        let pool = SharedNamePool::new();
        let namespace = NodeHandle::new(
            2,
            0,
            NodeKind::Namespace,
            Some(QualifiedName::new("", "p", "urn:p")),
        );
        assert!(NodeTest::name(NodeKind::Namespace, "", "p").matches(&namespace, &pool));
    }

    #[test]
    fn it_runs_predicates() {
        let pool = SharedNamePool::new();
        let test = NodeTest::predicate(|handle| handle.key() % 2 == 0);
        assert!(!test.matches(&element("a".into()), &pool));
        assert!(test.matches(&NodeHandle::new(4, 0, NodeKind::Text, None), &pool));
        assert_eq!(format!("{test:?}"), "predicate");
    }
}
