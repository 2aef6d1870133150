use std::{
    sync::mpsc::{Receiver, sync_channel},
    thread,
};

use dialog_document::{DocumentStore, NodeKey};

use crate::{NavigationError, NodeAdapter, NodeKeyed, NodeTest, axis::Axis};

/// An axis advanced on its own worker thread.
///
/// The worker reads ahead into a bounded channel of node keys; consumers pull
/// from the channel, so "is there a next key" and "take it" are a single
/// operation. Dropping a `ConcurrentAxis` stops the worker, which drops the
/// underlying axis and with it any cursor the axis holds.
pub struct ConcurrentAxis {
    receiver: Option<Receiver<Result<NodeKey, NavigationError>>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ConcurrentAxis {
    /// Moves `axis` onto a worker thread that reads up to `capacity` keys
    /// ahead. The worker stops after the first failure.
    pub fn spawn<Nodes, Node>(axis: Nodes, capacity: usize) -> Self
    where
        Nodes: Iterator<Item = Result<Node, NavigationError>> + Send + 'static,
        Node: NodeKeyed,
    {
        let (sender, receiver) = sync_channel(capacity);
        let worker = thread::spawn(move || {
            for node in axis {
                let node = node.map(|node| node.node_key());
                let failed = node.is_err();
                if sender.send(node).is_err() {
                    tracing::debug!("Concurrent axis consumer went away");
                    break;
                }
                if failed {
                    break;
                }
            }
        });

        Self {
            receiver: Some(receiver),
            worker: Some(worker),
        }
    }

    fn stop(&mut self) {
        self.receiver = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("Concurrent axis worker panicked");
        }
    }
}

impl Iterator for ConcurrentAxis {
    type Item = Result<NodeKey, NavigationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.receiver.as_ref()?.recv().ok();
        if next.is_none() {
            self.stop();
        }
        next
    }
}

impl Drop for ConcurrentAxis {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ConcurrentAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentAxis")
            .field("running", &self.worker.is_some())
            .finish()
    }
}

impl<S> NodeAdapter<S>
where
    S: DocumentStore,
{
    /// Walks `axis` from this node on a worker thread, buffering as many keys
    /// as the document's configuration allows.
    pub fn iterate_axis_concurrently(
        &self,
        axis: Axis,
        test: NodeTest,
    ) -> Result<ConcurrentAxis, NavigationError> {
        let capacity = self.document()?.config().concurrent_buffer;
        Ok(ConcurrentAxis::spawn(
            self.iterate_axis(axis, test)?.into_handles(),
            capacity,
        ))
    }
}
