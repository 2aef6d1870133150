//! Axes advanced from several threads at once stay independent of each
//! other, and set operations merged from concurrent axes agree with their
//! sequential definitions.

use std::{collections::BTreeSet, sync::Arc};

use dialog_document::{DocumentBuilder, MemoryDocumentStore, NULL_NODE_KEY, NodeKey, NodeKind};
use dialog_navigation::{
    Axis, ConcurrentSetAxis, DocumentScope, NavigationConfig, NavigationError, NodeTest,
    SetOperation, SharedNamePool, try_pull_or_sentinel,
};
use pretty_assertions::assert_eq;

type Document = Arc<DocumentScope<MemoryDocumentStore>>;

/// A `library` element (key 1) holding `shelves` shelves of `books` books,
/// each book with one text node.
fn library(shelves: usize, books: usize, config: NavigationConfig) -> anyhow::Result<Document> {
    let store = MemoryDocumentStore::default();
    let revision = store.commit(DocumentBuilder::new().element("library", |library| {
        for shelf in 0..shelves {
            library.element("shelf", |element| {
                element.attribute("number", shelf.to_string());
                for book in 0..books {
                    element.element("book", |title| {
                        title.text(format!("{shelf}.{book}"));
                    });
                }
            });
        }
    }));
    Ok(DocumentScope::open(
        Arc::new(store),
        revision,
        Arc::new(SharedNamePool::new()),
        config,
    )?)
}

fn elements() -> NodeTest {
    NodeTest::kind(NodeKind::Element)
}

fn every_third() -> NodeTest {
    NodeTest::predicate(|handle| handle.key() % 3 == 0)
}

fn walk(
    document: &Document,
    origin: NodeKey,
    axis: Axis,
    test: NodeTest,
) -> Result<Vec<NodeKey>, NavigationError> {
    document
        .node(origin)?
        .iterate_axis(axis, test)?
        .map(|node| node.map(|node| node.key()))
        .collect()
}

fn shelves(document: &Document) -> Result<Vec<NodeKey>, NavigationError> {
    walk(document, 1, Axis::Child, NodeTest::any())
}

#[test]
fn it_interleaves_pulls_without_crosstalk() -> anyhow::Result<()> {
    let document = library(2, 10, NavigationConfig::default())?;
    let shelves = shelves(&document)?;
    let left_alone = walk(&document, shelves[0], Axis::Descendant, NodeTest::any())?;
    let right_alone = walk(&document, shelves[1], Axis::Descendant, NodeTest::any())?;

    let mut left = document
        .node(shelves[0])?
        .iterate_axis(Axis::Descendant, NodeTest::any())?;
    let mut right = document
        .node(shelves[1])?
        .iterate_axis(Axis::Descendant, NodeTest::any())?;

    let (mut left_seen, mut right_seen) = (Vec::new(), Vec::new());
    loop {
        // Two pulls on the left for every pull on the right.
        let pulled = [
            (try_pull_or_sentinel(&mut left)?, 0),
            (try_pull_or_sentinel(&mut left)?, 0),
            (try_pull_or_sentinel(&mut right)?, 1),
        ];
        if pulled.iter().all(|(key, _)| *key == NULL_NODE_KEY) {
            break;
        }
        for (key, side) in pulled {
            match (key, side) {
                (NULL_NODE_KEY, _) => {}
                (key, 0) => left_seen.push(key),
                (key, _) => right_seen.push(key),
            }
        }
    }

    assert_eq!(left_seen, left_alone);
    assert_eq!(right_seen, right_alone);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn it_walks_disjoint_subtrees_from_many_threads() -> anyhow::Result<()> {
    let document = library(4, 25, NavigationConfig::default())?;
    let shelves = shelves(&document)?;
    let alone = shelves
        .iter()
        .map(|shelf| walk(&document, *shelf, Axis::Descendant, NodeTest::any()))
        .collect::<Result<Vec<_>, _>>()?;

    let tasks = shelves
        .iter()
        .map(|shelf| {
            let document = document.clone();
            let shelf = *shelf;
            tokio::task::spawn_blocking(move || -> Result<Vec<NodeKey>, NavigationError> {
                let mut axis = document
                    .node(shelf)?
                    .iterate_axis_concurrently(Axis::Descendant, NodeTest::any())?;
                let mut keys = Vec::new();
                loop {
                    let key = try_pull_or_sentinel(&mut axis)?;
                    if key == NULL_NODE_KEY {
                        break;
                    }
                    keys.push(key);
                }
                Ok(keys)
            })
        })
        .collect::<Vec<_>>();

    let mut together = Vec::new();
    for task in tasks {
        together.push(task.await??);
    }

    assert_eq!(together, alone);
    assert_eq!(document.store().open_cursors(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn it_matches_sequential_set_operations() -> anyhow::Result<()> {
    let config = NavigationConfig {
        concurrent_buffer: 1,
        ..NavigationConfig::default()
    };
    let document = library(3, 12, config)?;
    let left = walk(&document, 0, Axis::Descendant, elements())?
        .into_iter()
        .collect::<BTreeSet<_>>();
    let right = walk(&document, 0, Axis::Descendant, every_third())?
        .into_iter()
        .collect::<BTreeSet<_>>();

    for operation in [
        SetOperation::Union,
        SetOperation::Intersect,
        SetOperation::Except,
    ] {
        let expected = match operation {
            SetOperation::Union => left.union(&right).copied().collect::<Vec<_>>(),
            SetOperation::Intersect => left.intersection(&right).copied().collect(),
            SetOperation::Except => left.difference(&right).copied().collect(),
        };

        let document = document.clone();
        let merged = tokio::task::spawn_blocking(move || -> Result<Vec<NodeKey>, NavigationError> {
            let root = document.root()?;
            ConcurrentSetAxis::new(
                operation,
                root.iterate_axis_concurrently(Axis::Descendant, elements())?,
                root.iterate_axis_concurrently(Axis::Descendant, every_third())?,
            )
            .collect()
        })
        .await??;

        assert_eq!(merged, expected, "{operation:?}");
    }
    assert_eq!(document.store().open_cursors(), 0);
    Ok(())
}
