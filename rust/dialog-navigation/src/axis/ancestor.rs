use dialog_document::NodeCursor;

use crate::{NavigationError, TransactionScope, axis::Walk};

/// Yields the parent of the origin, if it has one. Attributes and namespaces
/// report their owning element.
#[derive(Debug, Clone, Default)]
pub struct ParentWalk {
    done: bool,
}

impl Walk for ParentWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if self.done {
            return Ok(false);
        }
        self.done = true;
        scope.move_to_parent()
    }
}

/// Yields the parents of the origin transitively, nearest first, ending with
/// the document node.
#[derive(Debug, Clone)]
pub struct AncestorWalk {
    include_self: bool,
    started: bool,
}

impl AncestorWalk {
    /// Creates the walk, optionally starting with the origin itself.
    pub fn new(include_self: bool) -> Self {
        Self {
            include_self,
            started: false,
        }
    }
}

impl Walk for AncestorWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if !self.started {
            self.started = true;
            if self.include_self {
                return Ok(true);
            }
        }
        scope.move_to_parent()
    }
}
