use dialog_document::{NULL_NODE_KEY, NodeKey};

use crate::{ConcurrentAxis, NavigationError, try_pull_or_sentinel, validate_is_node};

/// A set operation over two node sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperation {
    /// Nodes in either sequence
    Union,
    /// Nodes in both sequences
    Intersect,
    /// Nodes in the left sequence only
    Except,
}

/// Merges two [`ConcurrentAxis`] inputs into their union, intersection or
/// difference.
///
/// Both inputs must deliver keys in ascending order; the result is in
/// ascending order without duplicates. Each input is advanced independently
/// on its own worker and compared against the "no node" sentinel, so neither
/// input is ever polled for emptiness separately from being consumed.
#[derive(Debug)]
pub struct ConcurrentSetAxis {
    operation: SetOperation,
    left: ConcurrentAxis,
    right: ConcurrentAxis,
    current_left: NodeKey,
    current_right: NodeKey,
    started: bool,
    done: bool,
}

impl ConcurrentSetAxis {
    /// Combines `left` and `right` with `operation`.
    pub fn new(operation: SetOperation, left: ConcurrentAxis, right: ConcurrentAxis) -> Self {
        Self {
            operation,
            left,
            right,
            current_left: NULL_NODE_KEY,
            current_right: NULL_NODE_KEY,
            started: false,
            done: false,
        }
    }

    /// The operation this axis performs
    pub fn operation(&self) -> SetOperation {
        self.operation
    }

    fn advance_left(&mut self) -> Result<(), NavigationError> {
        self.current_left = try_pull_or_sentinel(&mut self.left)?;
        Ok(())
    }

    fn advance_right(&mut self) -> Result<(), NavigationError> {
        self.current_right = try_pull_or_sentinel(&mut self.right)?;
        Ok(())
    }

    fn union(&mut self) -> Result<Option<NodeKey>, NavigationError> {
        let (left, right) = (self.current_left, self.current_right);
        if left == NULL_NODE_KEY && right == NULL_NODE_KEY {
            return Ok(None);
        }
        if right == NULL_NODE_KEY || (left != NULL_NODE_KEY && left < right) {
            self.advance_left()?;
            return Ok(Some(left));
        }
        if left == NULL_NODE_KEY || right < left {
            self.advance_right()?;
            return Ok(Some(right));
        }
        self.advance_left()?;
        self.advance_right()?;
        Ok(Some(left))
    }

    fn intersect(&mut self) -> Result<Option<NodeKey>, NavigationError> {
        while self.current_left != NULL_NODE_KEY && self.current_right != NULL_NODE_KEY {
            let (left, right) = (self.current_left, self.current_right);
            if left < right {
                self.advance_left()?;
            } else if right < left {
                self.advance_right()?;
            } else {
                self.advance_left()?;
                self.advance_right()?;
                return Ok(Some(left));
            }
        }
        Ok(None)
    }

    fn except(&mut self) -> Result<Option<NodeKey>, NavigationError> {
        while self.current_left != NULL_NODE_KEY {
            let (left, right) = (self.current_left, self.current_right);
            validate_is_node(left)?;
            if right == NULL_NODE_KEY || left < right {
                self.advance_left()?;
                return Ok(Some(left));
            }
            if right < left {
                self.advance_right()?;
            } else {
                self.advance_left()?;
                self.advance_right()?;
            }
        }
        Ok(None)
    }
}

impl Iterator for ConcurrentSetAxis {
    type Item = Result<NodeKey, NavigationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = (|| {
            if !self.started {
                self.started = true;
                self.advance_left()?;
                self.advance_right()?;
            }
            match self.operation {
                SetOperation::Union => self.union(),
                SetOperation::Intersect => self.intersect(),
                SetOperation::Except => self.except(),
            }
        })();

        match next {
            Ok(Some(key)) => Some(Ok(key)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
