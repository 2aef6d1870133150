use dialog_document::{NodeCursor, NodeKey};

use crate::{NavigationError, TransactionScope, axis::Walk};

/// Yields the structural children of the origin, left to right.
#[derive(Debug, Clone, Default)]
pub struct ChildWalk {
    started: bool,
}

impl Walk for ChildWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if !self.started {
            self.started = true;
            return scope.move_to_first_child();
        }
        scope.move_to_right_sibling()
    }
}

/// Yields the subtree below the origin in pre-order.
///
/// The walk keeps the right siblings it still has to visit on a stack rather
/// than climbing back through parents, so each step costs at most one move.
#[derive(Debug, Clone)]
pub struct DescendantWalk {
    origin: NodeKey,
    include_self: bool,
    started: bool,
    done: bool,
    pending: Vec<NodeKey>,
}

impl DescendantWalk {
    /// Creates the walk below `origin`, optionally starting with the origin.
    pub fn new(origin: NodeKey, include_self: bool) -> Self {
        Self {
            origin,
            include_self,
            started: false,
            done: false,
            pending: Vec::new(),
        }
    }

    fn step<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        let at_origin = scope.node_key() == self.origin;

        if scope.has_first_child() {
            if !at_origin && let Some(right) = scope.right_sibling_key() {
                self.pending.push(right);
            }
            return scope.move_to_first_child();
        }

        if !at_origin && scope.has_right_sibling() {
            return scope.move_to_right_sibling();
        }

        match self.pending.pop() {
            Some(key) => scope.move_to(key),
            None => Ok(false),
        }
    }
}

impl Walk for DescendantWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if self.done {
            return Ok(false);
        }
        if !self.started {
            self.started = true;
            if self.include_self {
                return Ok(true);
            }
        }
        let moved = self.step(scope)?;
        self.done = !moved;
        Ok(moved)
    }
}
