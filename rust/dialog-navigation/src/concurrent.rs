use dialog_document::{DocumentStore, NULL_NODE_KEY, NodeKey};

use crate::{NavigationError, NodeAdapter, NodeHandle};

mod axis;
pub use axis::*;

mod set;
pub use set::*;

/// Anything that identifies a node by key.
pub trait NodeKeyed {
    /// The key of the node
    fn node_key(&self) -> NodeKey;
}

impl NodeKeyed for NodeKey {
    fn node_key(&self) -> NodeKey {
        *self
    }
}

impl NodeKeyed for NodeHandle {
    fn node_key(&self) -> NodeKey {
        self.key()
    }
}

impl<S> NodeKeyed for NodeAdapter<S>
where
    S: DocumentStore,
{
    fn node_key(&self) -> NodeKey {
        self.key()
    }
}

/// Takes the next key from `axis`, or [`NULL_NODE_KEY`] once it is
/// exhausted. Exhaustion is never an error, and pulling from an exhausted
/// axis keeps returning the sentinel.
pub fn pull_or_sentinel<Axis>(axis: &mut Axis) -> NodeKey
where
    Axis: Iterator + ?Sized,
    Axis::Item: NodeKeyed,
{
    axis.next()
        .map(|node| node.node_key())
        .unwrap_or(NULL_NODE_KEY)
}

/// Like [`pull_or_sentinel`] for axes whose items may fail. A failure is
/// returned as is; exhaustion still yields [`NULL_NODE_KEY`].
pub fn try_pull_or_sentinel<Axis, Node, Error>(axis: &mut Axis) -> Result<NodeKey, Error>
where
    Axis: Iterator<Item = Result<Node, Error>> + ?Sized,
    Node: NodeKeyed,
{
    match axis.next() {
        Some(Ok(node)) => Ok(node.node_key()),
        Some(Err(error)) => Err(error),
        None => Ok(NULL_NODE_KEY),
    }
}

/// Checks that `key` identifies a node rather than an atomic value.
///
/// Set operations such as `except` are only defined over nodes, so a
/// negative key aborts them with a structural type error.
pub fn validate_is_node(key: NodeKey) -> Result<bool, NavigationError> {
    if key < 0 {
        let error = NavigationError::NotANode { key };
        tracing::error!(%error, "Atomic value supplied where a node was required");
        return Err(error);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_returns_the_sentinel_indefinitely() {
        let mut axis = vec![3_i64, 5].into_iter();
        assert_eq!(pull_or_sentinel(&mut axis), 3);
        assert_eq!(pull_or_sentinel(&mut axis), 5);
        for _ in 0..5 {
            assert_eq!(pull_or_sentinel(&mut axis), NULL_NODE_KEY);
        }
    }

    #[test]
    fn it_passes_failures_through() {
        let mut axis = vec![Ok(1_i64), Err(NavigationError::ForeignTree)].into_iter();
        assert_eq!(try_pull_or_sentinel(&mut axis), Ok(1));
        assert_eq!(
            try_pull_or_sentinel(&mut axis),
            Err(NavigationError::ForeignTree)
        );
        assert_eq!(try_pull_or_sentinel(&mut axis), Ok(NULL_NODE_KEY));
    }

    #[test]
    fn it_validates_node_keys() {
        assert_eq!(validate_is_node(0), Ok(true));
        assert_eq!(
            validate_is_node(-1),
            Err(NavigationError::NotANode { key: -1 })
        );
        assert!(validate_is_node(NULL_NODE_KEY).is_err());
    }
}
