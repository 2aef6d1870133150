use dialog_document::NodeCursor;

use crate::{NavigationError, TransactionScope, axis::Walk};

/// Which way a [`SiblingWalk`] moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the first child of the parent
    Left,
    /// Towards the last child of the parent
    Right,
}

/// Yields the structural siblings of the origin in one direction, nearest
/// first.
#[derive(Debug, Clone)]
pub struct SiblingWalk {
    direction: Direction,
}

impl SiblingWalk {
    /// Creates a walk towards `direction`.
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl Walk for SiblingWalk {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        match self.direction {
            Direction::Left => scope.move_to_left_sibling(),
            Direction::Right => scope.move_to_right_sibling(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::{Axis, fixture::*};

    #[test]
    fn it_walks_siblings_both_ways() -> anyhow::Result<()> {
        let (store, revision) = sample();
        assert_eq!(walk(&store, revision, 3, Axis::FollowingSibling)?, vec![5]);
        assert_eq!(
            walk(&store, revision, 5, Axis::FollowingSibling)?,
            Vec::<i64>::new()
        );
        assert_eq!(walk(&store, revision, 5, Axis::PrecedingSibling)?, vec![3]);
        assert_eq!(
            walk(&store, revision, 3, Axis::PrecedingSibling)?,
            Vec::<i64>::new()
        );
        Ok(())
    }
}
