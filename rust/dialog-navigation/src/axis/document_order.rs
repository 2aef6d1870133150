use std::collections::HashSet;

use dialog_document::{NodeCursor, NodeKey, NodeKind};

use crate::{NavigationError, TransactionScope, axis::Walk};

/// Yields every structural node after the origin in document order that is
/// neither a descendant nor an ancestor of it.
///
/// For an attribute or namespace origin the walk starts with the
/// descendants of the owning element.
#[derive(Debug, Clone)]
pub struct FollowingWalk {
    origin_structural: bool,
    started: bool,
    done: bool,
}

impl FollowingWalk {
    /// Creates the walk. `origin_structural` is false for attribute and
    /// namespace origins.
    pub fn new(origin_structural: bool) -> Self {
        Self {
            origin_structural,
            started: false,
            done: false,
        }
    }

    fn start<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if self.origin_structural {
            return skip_subtree(scope);
        }
        if !scope.move_to_parent()? {
            return Ok(false);
        }
        if scope.has_first_child() {
            return scope.move_to_first_child();
        }
        skip_subtree(scope)
    }
}

impl Walk for FollowingWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if self.done {
            return Ok(false);
        }
        let moved = if !self.started {
            self.started = true;
            self.start(scope)?
        } else if scope.has_first_child() {
            scope.move_to_first_child()?
        } else {
            skip_subtree(scope)?
        };
        self.done = !moved;
        Ok(moved)
    }
}

/// Moves to the first node after the subtree of the current node.
fn skip_subtree<C>(scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
where
    C: NodeCursor,
{
    loop {
        if scope.has_right_sibling() {
            return scope.move_to_right_sibling();
        }
        if !scope.move_to_parent()? {
            return Ok(false);
        }
    }
}

/// Moves to the last node, in document order, of the subtree of the current
/// node.
fn descend_to_last<C>(scope: &mut TransactionScope<C>) -> Result<(), NavigationError>
where
    C: NodeCursor,
{
    while scope.has_first_child() {
        if !scope.move_to_first_child()? {
            break;
        }
        while scope.has_right_sibling() {
            if !scope.move_to_right_sibling()? {
                break;
            }
        }
    }
    Ok(())
}

/// Yields every structural node before the origin in reverse document order,
/// nearest first. Ancestors of the origin are skipped unless the walk was
/// created to include them.
#[derive(Debug, Clone)]
pub struct PrecedingWalk {
    origin_kind: NodeKind,
    include_ancestors: bool,
    started: bool,
    done: bool,
    ancestors: HashSet<NodeKey>,
}

impl PrecedingWalk {
    /// Creates the walk from an origin of `origin_kind`.
    pub fn new(origin_kind: NodeKind, include_ancestors: bool) -> Self {
        Self {
            origin_kind,
            include_ancestors,
            started: false,
            done: false,
            ancestors: HashSet::new(),
        }
    }

    /// Records the ancestors of the origin and, for attribute and namespace
    /// origins, moves to the owning element. Returns whether the current
    /// node should be yielded.
    fn start<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        let owned = !self.origin_kind.is_structural();
        if owned {
            if !scope.move_to_parent()? {
                return Ok(false);
            }
            self.ancestors.insert(scope.node_key());
        }

        let start = scope.node_key();
        while scope.move_to_parent()? {
            self.ancestors.insert(scope.node_key());
        }
        if !scope.move_to(start)? {
            return Err(NavigationError::NoSuchNode { key: start });
        }

        Ok(owned && self.include_ancestors)
    }

    fn step<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        loop {
            if scope.has_left_sibling() {
                if !scope.move_to_left_sibling()? {
                    return Ok(false);
                }
                descend_to_last(scope)?;
                return Ok(true);
            }
            if !scope.move_to_parent()? {
                return Ok(false);
            }
            if self.include_ancestors || !self.ancestors.contains(&scope.node_key()) {
                return Ok(true);
            }
        }
    }
}

impl Walk for PrecedingWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if self.done {
            return Ok(false);
        }
        if !self.started {
            self.started = true;
            if self.start(scope)? {
                return Ok(true);
            }
        }
        let moved = self.step(scope)?;
        self.done = !moved;
        Ok(moved)
    }
}
