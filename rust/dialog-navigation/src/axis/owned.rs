use std::collections::HashSet;

use dialog_document::{NodeCursor, NodeKey};

use crate::{
    NavigationError, TransactionScope,
    axis::{Walk, is_element},
};

/// Yields the attributes owned by the origin element, in declaration order.
#[derive(Debug, Clone)]
pub struct AttributeWalk {
    owner: NodeKey,
    index: usize,
}

impl AttributeWalk {
    /// Creates the walk over the attributes of `owner`.
    pub fn new(owner: NodeKey) -> Self {
        Self { owner, index: 0 }
    }
}

impl Walk for AttributeWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if scope.node_key() != self.owner && !scope.move_to(self.owner)? {
            return Ok(false);
        }
        if !scope.move_to_attribute(self.index)? {
            return Ok(false);
        }
        self.index += 1;
        Ok(true)
    }
}

/// Yields the namespace declarations in scope at the origin element: those
/// declared on the element, then on each ancestor element in turn.
///
/// The nearest declaration of a prefix hides every farther one, and a
/// declaration binding a prefix to the empty URI hides the prefix without
/// being surfaced itself.
#[derive(Debug, Clone)]
pub struct NamespaceWalk {
    element: Option<NodeKey>,
    index: usize,
    seen: HashSet<String>,
}

impl NamespaceWalk {
    /// Creates the walk over the namespaces in scope at `origin`.
    pub fn new(origin: NodeKey) -> Self {
        Self {
            element: Some(origin),
            index: 0,
            seen: HashSet::new(),
        }
    }
}

impl Walk for NamespaceWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        while let Some(element) = self.element {
            if scope.node_key() != element && !scope.move_to(element)? {
                break;
            }
            if !is_element(scope) {
                break;
            }

            if scope.move_to_namespace(self.index)? {
                self.index += 1;
                let Some(name) = scope.name() else {
                    continue;
                };
                let fresh = self.seen.insert(name.local_name.clone());
                if fresh && !name.namespace_uri.is_empty() {
                    return Ok(true);
                }
                continue;
            }

            self.index = 0;
            self.element = scope.parent_key();
        }

        self.element = None;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use dialog_document::{DocumentBuilder, MemoryDocumentStore};

    use crate::axis::{Axis, fixture::*};

    #[test]
    fn it_walks_attributes_of_elements_only() -> anyhow::Result<()> {
        let store = MemoryDocumentStore::default();
        // root 0, a 1, @x 2, @y 3, text 4
        let revision = store.commit(DocumentBuilder::new().element("a", |a| {
            a.attribute("x", "1").attribute("y", "2").text("t");
        }));

        assert_eq!(walk(&store, revision, 1, Axis::Attribute)?, vec![2, 3]);
        assert_eq!(walk(&store, revision, 4, Axis::Attribute)?, Vec::<i64>::new());
        Ok(())
    }

    #[test]
    fn it_walks_in_scope_namespaces_nearest_first() -> anyhow::Result<()> {
        let store = MemoryDocumentStore::default();
        // root 0, a 1, ns p 2, ns q 3, b 4, ns p 5, ns q 6, c 7
        let revision = store.commit(DocumentBuilder::new().element("a", |a| {
            a.namespace("p", "urn:outer").namespace("q", "urn:q");
            a.element("b", |b| {
                b.namespace("p", "urn:inner").namespace("q", "");
                b.element("c", |_| {});
            });
        }));

        assert_eq!(walk(&store, revision, 7, Axis::Namespace)?, vec![5]);
        assert_eq!(walk(&store, revision, 4, Axis::Namespace)?, vec![5]);
        assert_eq!(walk(&store, revision, 1, Axis::Namespace)?, vec![2, 3]);
        Ok(())
    }

    #[test]
    fn it_walks_no_namespaces_for_non_elements() -> anyhow::Result<()> {
        let (store, revision) = sample();
        assert_eq!(walk(&store, revision, 4, Axis::Namespace)?, Vec::<i64>::new());
        assert_eq!(walk(&store, revision, 0, Axis::Namespace)?, Vec::<i64>::new());
        Ok(())
    }
}
