use std::sync::Arc;

use dialog_document::{DocumentStore, NodeCursor, NodeKind, Revision};

use crate::{
    NamePool, NavigationError, NodeHandle, NodeTest, TransactionScope,
    axis::{Axis, Walk, Walker},
};

/// Maps an axis and a node test onto the walk that implements it, applying
/// the short cuts that make a cursor unnecessary.
pub struct AxisDispatcher<S>
where
    S: DocumentStore,
{
    store: Arc<S>,
    revision: Revision,
    name_pool: Arc<dyn NamePool>,
}

impl<S> Clone for AxisDispatcher<S>
where
    S: DocumentStore,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            revision: self.revision,
            name_pool: self.name_pool.clone(),
        }
    }
}

impl<S> AxisDispatcher<S>
where
    S: DocumentStore,
{
    /// Creates a dispatcher reading `store` at `revision`.
    pub fn new(store: Arc<S>, revision: Revision, name_pool: Arc<dyn NamePool>) -> Self {
        Self {
            store,
            revision,
            name_pool,
        }
    }

    /// The revision every dispatched axis reads
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Dispatches the axis with numeric code `axis`.
    pub fn dispatch_code(
        &self,
        origin: &NodeHandle,
        axis: u8,
        test: NodeTest,
    ) -> Result<AxisIterator<S>, NavigationError> {
        self.dispatch(origin, Axis::try_from(axis)?, test)
    }

    /// Produces the lazy sequence of nodes on `axis` from `origin` that pass
    /// `test`.
    pub fn dispatch(
        &self,
        origin: &NodeHandle,
        axis: Axis,
        test: NodeTest,
    ) -> Result<AxisIterator<S>, NavigationError> {
        tracing::debug!(?axis, origin = origin.key(), ?test, "Dispatching axis");

        let kind = origin.kind();
        let state = match axis {
            Axis::SelfNode => AxisState::Pending(origin.clone()),
            Axis::Ancestor if kind == NodeKind::Root => AxisState::Exhausted,
            Axis::AncestorOrSelf if kind == NodeKind::Root => AxisState::Pending(origin.clone()),
            Axis::Ancestor | Axis::AncestorOrSelf => self.walking(origin, axis)?,
            Axis::Attribute | Axis::Namespace if kind != NodeKind::Element => {
                AxisState::Exhausted
            }
            Axis::Attribute | Axis::Namespace => self.walking(origin, axis)?,
            Axis::Child | Axis::Descendant => {
                let scope = TransactionScope::open(&*self.store, self.revision, origin.key())?;
                if scope.has_first_child() {
                    AxisState::Walking {
                        scope,
                        walker: Walker::new(axis, origin),
                    }
                } else {
                    AxisState::Exhausted
                }
            }
            Axis::DescendantOrSelf => self.walking(origin, axis)?,
            Axis::FollowingSibling | Axis::PrecedingSibling
                if matches!(
                    kind,
                    NodeKind::Root | NodeKind::Attribute | NodeKind::Namespace
                ) =>
            {
                AxisState::Exhausted
            }
            Axis::FollowingSibling | Axis::PrecedingSibling => self.walking(origin, axis)?,
            Axis::Parent if kind == NodeKind::Root => AxisState::Exhausted,
            Axis::Parent => self.walking(origin, axis)?,
            Axis::Following => self.walking(origin, axis)?,
            Axis::Preceding => self.walking(origin, axis)?,
            Axis::PrecedingOrAncestor => self.walking(origin, axis)?,
        };

        Ok(AxisIterator {
            dispatcher: self.clone(),
            origin: origin.clone(),
            axis,
            test,
            state,
        })
    }

    fn walking(
        &self,
        origin: &NodeHandle,
        axis: Axis,
    ) -> Result<AxisState<S::Cursor>, NavigationError> {
        Ok(AxisState::Walking {
            scope: TransactionScope::open(&*self.store, self.revision, origin.key())?,
            walker: Walker::new(axis, origin),
        })
    }
}

enum AxisState<C>
where
    C: NodeCursor,
{
    Exhausted,
    Pending(NodeHandle),
    Walking {
        scope: TransactionScope<C>,
        walker: Walker,
    },
}

/// A lazy, finite sequence of the nodes on one axis from one origin.
///
/// The iterator owns the cursor it reads through; the cursor is released as
/// soon as the axis is exhausted or fails, or when the iterator is dropped
/// part way through. After yielding an error the iterator is fused.
pub struct AxisIterator<S>
where
    S: DocumentStore,
{
    dispatcher: AxisDispatcher<S>,
    origin: NodeHandle,
    axis: Axis,
    test: NodeTest,
    state: AxisState<S::Cursor>,
}

impl<S> AxisIterator<S>
where
    S: DocumentStore,
{
    /// The axis this iterator walks
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The node the axis is relative to
    pub fn origin(&self) -> &NodeHandle {
        &self.origin
    }

    /// A fresh iterator over the same axis from the same origin, independent
    /// of how far this one has been consumed.
    pub fn another(&self) -> Result<Self, NavigationError> {
        self.dispatcher
            .dispatch(&self.origin, self.axis, self.test.clone())
    }
}

impl<S> Iterator for AxisIterator<S>
where
    S: DocumentStore,
{
    type Item = Result<NodeHandle, NavigationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, AxisState::Exhausted) {
                AxisState::Exhausted => return None,
                AxisState::Pending(handle) => {
                    if self
                        .test
                        .matches(&handle, self.dispatcher.name_pool.as_ref())
                    {
                        return Some(Ok(handle));
                    }
                }
                AxisState::Walking {
                    mut scope,
                    mut walker,
                } => match walker.advance(&mut scope) {
                    Ok(true) => {
                        let handle = scope.handle();
                        self.state = AxisState::Walking { scope, walker };
                        if self
                            .test
                            .matches(&handle, self.dispatcher.name_pool.as_ref())
                        {
                            return Some(Ok(handle));
                        }
                    }
                    Ok(false) => {
                        if let Err(error) = scope.close() {
                            tracing::warn!(%error, "Failed to release exhausted axis cursor");
                        }
                        return None;
                    }
                    Err(error) => return Some(Err(error)),
                },
            }
        }
    }
}

impl<S> std::fmt::Debug for AxisIterator<S>
where
    S: DocumentStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisIterator")
            .field("axis", &self.axis)
            .field("origin", &self.origin)
            .field("test", &self.test)
            .finish()
    }
}
