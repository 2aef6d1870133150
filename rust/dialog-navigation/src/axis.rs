use dialog_document::{NodeCursor, NodeKind};

use crate::{NavigationError, NodeHandle, TransactionScope};

mod ancestor;
pub use ancestor::*;

mod child;
pub use child::*;

mod document_order;
pub use document_order::*;

mod owned;
pub use owned::*;

mod sibling;
pub use sibling::*;

/// A named navigation direction defining a node sequence relative to an
/// origin node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Parents transitively, nearest first
    Ancestor,
    /// The origin, then its ancestors
    AncestorOrSelf,
    /// Attributes of an element
    Attribute,
    /// Structural children, left to right
    Child,
    /// Pre-order traversal of the subtree below the origin
    Descendant,
    /// The origin, then its descendants
    DescendantOrSelf,
    /// Everything after the origin in document order, minus its descendants
    Following,
    /// Right siblings, left to right
    FollowingSibling,
    /// In-scope namespace declarations of an element
    Namespace,
    /// The structural parent (or owning element)
    Parent,
    /// Everything before the origin in document order, minus its ancestors,
    /// nearest first
    Preceding,
    /// Left siblings, nearest first
    PrecedingSibling,
    /// Exactly the origin
    SelfNode,
    /// Preceding plus ancestors, nearest first
    PrecedingOrAncestor,
}

impl Axis {
    /// Every axis, in the order of their numeric codes.
    pub const ALL: [Axis; 14] = [
        Axis::Ancestor,
        Axis::AncestorOrSelf,
        Axis::Attribute,
        Axis::Child,
        Axis::Descendant,
        Axis::DescendantOrSelf,
        Axis::Following,
        Axis::FollowingSibling,
        Axis::Namespace,
        Axis::Parent,
        Axis::Preceding,
        Axis::PrecedingSibling,
        Axis::SelfNode,
        Axis::PrecedingOrAncestor,
    ];

    /// The numeric code tree query evaluators use for this axis.
    pub fn code(&self) -> u8 {
        match self {
            Axis::Ancestor => 0,
            Axis::AncestorOrSelf => 1,
            Axis::Attribute => 2,
            Axis::Child => 3,
            Axis::Descendant => 4,
            Axis::DescendantOrSelf => 5,
            Axis::Following => 6,
            Axis::FollowingSibling => 7,
            Axis::Namespace => 8,
            Axis::Parent => 9,
            Axis::Preceding => 10,
            Axis::PrecedingSibling => 11,
            Axis::SelfNode => 12,
            Axis::PrecedingOrAncestor => 13,
        }
    }

    /// Whether members are delivered in reverse document order.
    pub fn is_reverse(&self) -> bool {
        matches!(
            self,
            Axis::Ancestor
                | Axis::AncestorOrSelf
                | Axis::Preceding
                | Axis::PrecedingSibling
                | Axis::PrecedingOrAncestor
        )
    }
}

impl TryFrom<u8> for Axis {
    type Error = NavigationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Axis::ALL
            .get(value as usize)
            .copied()
            .ok_or(NavigationError::UnknownAxis(value))
    }
}

/// One step of an axis traversal, computed from the positional facts of a
/// [`TransactionScope`].
pub trait Walk {
    /// Moves `scope` to the next member of the axis. Returns `Ok(false)` once
    /// the axis is exhausted; the position of `scope` is then unspecified.
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor;
}

/// The walk for every [`Axis`], starting from a scope positioned at the
/// origin.
#[derive(Debug, Clone)]
pub enum Walker {
    /// [`Axis::SelfNode`]
    SelfNode(SelfWalk),
    /// [`Axis::Parent`]
    Parent(ParentWalk),
    /// [`Axis::Ancestor`] and [`Axis::AncestorOrSelf`]
    Ancestor(AncestorWalk),
    /// [`Axis::Child`]
    Child(ChildWalk),
    /// [`Axis::Descendant`] and [`Axis::DescendantOrSelf`]
    Descendant(DescendantWalk),
    /// [`Axis::FollowingSibling`] and [`Axis::PrecedingSibling`]
    Sibling(SiblingWalk),
    /// [`Axis::Attribute`]
    Attribute(AttributeWalk),
    /// [`Axis::Namespace`]
    Namespace(NamespaceWalk),
    /// [`Axis::Following`]
    Following(FollowingWalk),
    /// [`Axis::Preceding`] and [`Axis::PrecedingOrAncestor`]
    Preceding(PrecedingWalk),
}

impl Walker {
    /// The walk of `axis` from `origin`.
    pub fn new(axis: Axis, origin: &NodeHandle) -> Self {
        match axis {
            Axis::SelfNode => Walker::SelfNode(SelfWalk::default()),
            Axis::Parent => Walker::Parent(ParentWalk::default()),
            Axis::Ancestor => Walker::Ancestor(AncestorWalk::new(false)),
            Axis::AncestorOrSelf => Walker::Ancestor(AncestorWalk::new(true)),
            Axis::Child => Walker::Child(ChildWalk::default()),
            Axis::Descendant => Walker::Descendant(DescendantWalk::new(origin.key(), false)),
            Axis::DescendantOrSelf => {
                Walker::Descendant(DescendantWalk::new(origin.key(), true))
            }
            Axis::FollowingSibling => Walker::Sibling(SiblingWalk::new(Direction::Right)),
            Axis::PrecedingSibling => Walker::Sibling(SiblingWalk::new(Direction::Left)),
            Axis::Attribute => Walker::Attribute(AttributeWalk::new(origin.key())),
            Axis::Namespace => Walker::Namespace(NamespaceWalk::new(origin.key())),
            Axis::Following => Walker::Following(FollowingWalk::new(origin.is_structural())),
            Axis::Preceding => Walker::Preceding(PrecedingWalk::new(origin.kind(), false)),
            Axis::PrecedingOrAncestor => {
                Walker::Preceding(PrecedingWalk::new(origin.kind(), true))
            }
        }
    }
}

impl Walk for Walker {
    fn advance<C>(&mut self, scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        match self {
            Walker::SelfNode(walk) => walk.advance(scope),
            Walker::Parent(walk) => walk.advance(scope),
            Walker::Ancestor(walk) => walk.advance(scope),
            Walker::Child(walk) => walk.advance(scope),
            Walker::Descendant(walk) => walk.advance(scope),
            Walker::Sibling(walk) => walk.advance(scope),
            Walker::Attribute(walk) => walk.advance(scope),
            Walker::Namespace(walk) => walk.advance(scope),
            Walker::Following(walk) => walk.advance(scope),
            Walker::Preceding(walk) => walk.advance(scope),
        }
    }
}

/// Yields the origin once.
#[derive(Debug, Clone, Default)]
pub struct SelfWalk {
    done: bool,
}

impl Walk for SelfWalk {
    fn advance<C>(&mut self, _scope: &mut TransactionScope<C>) -> Result<bool, NavigationError>
    where
        C: NodeCursor,
    {
        if self.done {
            return Ok(false);
        }
        self.done = true;
        Ok(true)
    }
}

pub(crate) fn is_element(scope: &TransactionScope<impl NodeCursor>) -> bool {
    scope.kind() == NodeKind::Element
}


#[cfg(test)]
mod tests {
    use super::{fixture::*, *};

    #[test]
    fn it_maps_axis_codes() {
        for axis in Axis::ALL {
            assert_eq!(Axis::try_from(axis.code()), Ok(axis));
        }
        assert_eq!(Axis::try_from(14), Err(NavigationError::UnknownAxis(14)));
    }

    #[test]
    fn it_yields_the_origin_for_self() -> anyhow::Result<()> {
        let (store, revision) = sample();
        assert_eq!(walk(&store, revision, 3, Axis::SelfNode)?, vec![3]);
        Ok(())
    }
}
