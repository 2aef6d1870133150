//! Every cursor opened on behalf of an axis or a node view is released,
//! whether the work runs to completion, is abandoned part way through or
//! fails in the store.

use std::sync::Arc;

use dialog_document::{
    DocumentBuilder, DocumentStore, FaultyDocumentStore, MemoryDocumentStore, NodeKey,
};
use dialog_navigation::{
    Axis, DocumentScope, ErrorClass, NavigationConfig, NavigationError, NodeTest, SharedNamePool,
};
use pretty_assertions::assert_eq;

/// `<a id="1"><b>hello</b><c/></a>`: root 0, a 1, @id 2, b 3, text 4, c 5
fn sample() -> DocumentBuilder {
    DocumentBuilder::new().element("a", |a| {
        a.attribute("id", "1");
        a.element("b", |b| {
            b.text("hello");
        });
        a.element("c", |_| {});
    })
}

fn open<S>(store: Arc<S>, revision: u64) -> Result<Arc<DocumentScope<S>>, NavigationError>
where
    S: DocumentStore,
{
    DocumentScope::open(
        store,
        revision,
        Arc::new(SharedNamePool::new()),
        NavigationConfig::default(),
    )
}

fn faulty() -> anyhow::Result<(
    Arc<FaultyDocumentStore>,
    Arc<DocumentScope<FaultyDocumentStore>>,
)> {
    let inner = MemoryDocumentStore::default();
    let revision = inner.commit(sample());
    let store = Arc::new(FaultyDocumentStore::new(inner, i64::MAX));
    let document = open(store.clone(), revision)?;
    Ok((store, document))
}

#[test]
fn it_releases_cursors_after_exhaustion() -> anyhow::Result<()> {
    let store = Arc::new(MemoryDocumentStore::default());
    let revision = store.commit(sample());
    let document = open(store.clone(), revision)?;

    for origin in 0..=5 {
        let node = document.node(origin)?;
        for axis in Axis::ALL {
            let visited = node
                .iterate_axis(axis, NodeTest::any())?
                .collect::<Result<Vec<_>, _>>()?;
            assert_eq!(
                store.open_cursors(),
                0,
                "{axis:?} from {origin} still holds a cursor after {} nodes",
                visited.len()
            );
        }
    }
    Ok(())
}

#[test]
fn it_releases_cursors_of_abandoned_axes() -> anyhow::Result<()> {
    let store = Arc::new(MemoryDocumentStore::default());
    let revision = store.commit(sample());
    let document = open(store.clone(), revision)?;
    let a = document.node(1)?;

    let mut descendants = a.iterate_axis(Axis::Descendant, NodeTest::any())?;
    assert_eq!(descendants.next().transpose()?.map(|node| node.key()), Some(3));
    assert_eq!(store.open_cursors(), 1);
    drop(descendants);
    assert_eq!(store.open_cursors(), 0);

    let mut concurrent = a.iterate_axis_concurrently(Axis::Following, NodeTest::any())?;
    let mut following = document
        .node(3)?
        .iterate_axis_concurrently(Axis::Following, NodeTest::any())?;
    assert_eq!(following.next(), Some(Ok(5)));
    drop(following);
    assert_eq!(concurrent.next(), None);
    drop(concurrent);
    assert_eq!(store.open_cursors(), 0);
    Ok(())
}

#[test]
fn it_opens_no_cursor_for_trivial_axes() -> anyhow::Result<()> {
    let store = Arc::new(MemoryDocumentStore::default());
    let revision = store.commit(sample());
    let document = open(store.clone(), revision)?;

    let root = document.root()?;
    let text = document.node(4)?;
    let axes = [
        root.iterate_axis(Axis::Parent, NodeTest::any())?,
        root.iterate_axis(Axis::Ancestor, NodeTest::any())?,
        root.iterate_axis(Axis::SelfNode, NodeTest::any())?,
        text.iterate_axis(Axis::Child, NodeTest::any())?,
        text.iterate_axis(Axis::Attribute, NodeTest::any())?,
        text.iterate_axis(Axis::Namespace, NodeTest::any())?,
    ];
    assert_eq!(store.open_cursors(), 0);
    drop(axes);
    Ok(())
}

#[test]
fn it_releases_cursors_when_an_axis_fails() -> anyhow::Result<()> {
    let (store, document) = faulty()?;
    let a = document.node(1)?;

    // Two units to open the cursor at `a`, one to reach `b`.
    store.set_budget(3);
    let mut descendants = a.iterate_axis(Axis::Descendant, NodeTest::any())?;
    assert_eq!(descendants.next().transpose()?.map(|node| node.key()), Some(3));

    let failure = descendants.next();
    assert_eq!(
        failure.map(|result| result.map(|node| node.key()).map_err(|error| error.class())),
        Some(Err(ErrorClass::Storage))
    );
    assert_eq!(store.inner().open_cursors(), 0);
    assert!(descendants.next().is_none());
    Ok(())
}

#[test]
fn it_releases_cursors_when_a_node_view_fails() -> anyhow::Result<()> {
    let (store, document) = faulty()?;
    let text = document.node(4)?;
    let c = document.node(5)?;

    for budget in 0..8 {
        store.set_budget(budget);
        let outcomes: [Result<(), NavigationError>; 4] = [
            text.compare_order(&c).map(|_| ()),
            document.node(1).and_then(|a| a.string_value()).map(|_| ()),
            c.sibling_position().map(|_| ()),
            text.base_uri().map(|_| ()),
        ];
        for outcome in outcomes {
            if let Err(error) = outcome {
                assert_eq!(error.class(), ErrorClass::Storage, "budget {budget}");
            }
        }
        assert_eq!(store.inner().open_cursors(), 0, "budget {budget}");
    }
    Ok(())
}

#[test]
fn it_reports_missing_nodes_without_leaking() -> anyhow::Result<()> {
    let store = Arc::new(MemoryDocumentStore::default());
    let revision = store.commit(sample());
    let document = open(store.clone(), revision)?;

    let missing: NodeKey = 99;
    assert_eq!(
        document.node(missing).err(),
        Some(NavigationError::NoSuchNode { key: missing })
    );
    assert_eq!(
        document.node(-1).err(),
        Some(NavigationError::NotANode { key: -1 })
    );
    assert_eq!(store.open_cursors(), 0);
    Ok(())
}
