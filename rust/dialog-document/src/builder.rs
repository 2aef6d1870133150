use crate::{NodeKey, NodeKind, NodeRecord, QualifiedName, ROOT_NODE_KEY, Snapshot};

/// Describes the content of one revision of a document.
///
/// Keys are allocated in document order when the revision is committed: the
/// document node gets [`ROOT_NODE_KEY`], every element is followed by its
/// namespace declarations, then its attributes, then its content.
///
/// ```rust
/// use dialog_document::{DocumentBuilder, MemoryDocumentStore, QualifiedName};
///
/// let store = MemoryDocumentStore::default();
/// store.commit(
///     DocumentBuilder::new()
///         .comment("generated")
///         .element(QualifiedName::new("p", "root", "urn:p"), |root| {
///             root.namespace("p", "urn:p")
///                 .attribute(QualifiedName::xml("base"), "http://example.com/")
///                 .text("content");
///         }),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    children: Vec<PendingNode>,
}

impl DocumentBuilder {
    /// Creates a builder for an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element to the document node.
    pub fn element<Name, Build>(mut self, name: Name, build: Build) -> Self
    where
        Name: Into<QualifiedName>,
        Build: FnOnce(&mut ElementBuilder),
    {
        self.children.push(PendingNode::element(name.into(), build));
        self
    }

    /// Appends a text node to the document node.
    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.children.push(PendingNode::Text(value.into()));
        self
    }

    /// Appends a comment to the document node.
    pub fn comment(mut self, value: impl Into<String>) -> Self {
        self.children.push(PendingNode::Comment(value.into()));
        self
    }

    /// Appends a processing instruction to the document node.
    pub fn processing_instruction(
        mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        self.children.push(PendingNode::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        });
        self
    }

    pub(crate) fn build(self) -> Snapshot {
        let mut nodes = vec![NodeRecord::new(ROOT_NODE_KEY, NodeKind::Root)];
        let children = self
            .children
            .into_iter()
            .map(|child| child.flatten(ROOT_NODE_KEY, &mut nodes))
            .collect::<Vec<_>>();
        link(&mut nodes, ROOT_NODE_KEY, &children);
        Snapshot::new(nodes)
    }
}

/// Describes the namespaces, attributes and content of one element.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    name: QualifiedName,
    namespaces: Vec<(String, String)>,
    attributes: Vec<(QualifiedName, String)>,
    children: Vec<PendingNode>,
}

impl ElementBuilder {
    /// Declares `prefix` (empty for the default namespace) bound to `uri`.
    pub fn namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> &mut Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    /// Adds an attribute.
    pub fn attribute(
        &mut self,
        name: impl Into<QualifiedName>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn element<Name, Build>(&mut self, name: Name, build: Build) -> &mut Self
    where
        Name: Into<QualifiedName>,
        Build: FnOnce(&mut ElementBuilder),
    {
        self.children.push(PendingNode::element(name.into(), build));
        self
    }

    /// Appends a text node.
    pub fn text(&mut self, value: impl Into<String>) -> &mut Self {
        self.children.push(PendingNode::Text(value.into()));
        self
    }

    /// Appends a comment.
    pub fn comment(&mut self, value: impl Into<String>) -> &mut Self {
        self.children.push(PendingNode::Comment(value.into()));
        self
    }

    /// Appends a processing instruction.
    pub fn processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> &mut Self {
        self.children.push(PendingNode::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        });
        self
    }
}

#[derive(Debug, Clone)]
enum PendingNode {
    Element(ElementBuilder),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl PendingNode {
    fn element<Build>(name: QualifiedName, build: Build) -> Self
    where
        Build: FnOnce(&mut ElementBuilder),
    {
        let mut element = ElementBuilder {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        };
        build(&mut element);
        PendingNode::Element(element)
    }

    fn flatten(self, parent: NodeKey, nodes: &mut Vec<NodeRecord>) -> NodeKey {
        let key = next_key(nodes);
        let mut record = match &self {
            PendingNode::Element(_) => NodeRecord::new(key, NodeKind::Element),
            PendingNode::Text(_) => NodeRecord::new(key, NodeKind::Text),
            PendingNode::Comment(_) => NodeRecord::new(key, NodeKind::Comment),
            PendingNode::ProcessingInstruction { .. } => {
                NodeRecord::new(key, NodeKind::ProcessingInstruction)
            }
        };
        record.parent = Some(parent);

        match self {
            PendingNode::Element(element) => {
                record.name = Some(element.name);
                nodes.push(record);

                for (prefix, uri) in element.namespaces {
                    let mut namespace = NodeRecord::new(next_key(nodes), NodeKind::Namespace);
                    namespace.name = Some(QualifiedName::new("", prefix, uri.clone()));
                    namespace.value = Some(uri);
                    namespace.parent = Some(key);
                    nodes[key as usize].namespaces.push(namespace.key);
                    nodes.push(namespace);
                }

                for (name, value) in element.attributes {
                    let mut attribute = NodeRecord::new(next_key(nodes), NodeKind::Attribute);
                    attribute.name = Some(name);
                    attribute.value = Some(value);
                    attribute.parent = Some(key);
                    nodes[key as usize].attributes.push(attribute.key);
                    nodes.push(attribute);
                }

                let children = element
                    .children
                    .into_iter()
                    .map(|child| child.flatten(key, nodes))
                    .collect::<Vec<_>>();
                link(nodes, key, &children);
            }
            PendingNode::Text(value) | PendingNode::Comment(value) => {
                record.value = Some(value);
                nodes.push(record);
            }
            PendingNode::ProcessingInstruction { target, data } => {
                record.name = Some(QualifiedName::local(target));
                record.value = Some(data);
                nodes.push(record);
            }
        }

        key
    }
}

fn next_key(nodes: &[NodeRecord]) -> NodeKey {
    nodes.len() as NodeKey
}

fn link(nodes: &mut [NodeRecord], parent: NodeKey, children: &[NodeKey]) {
    let parent = &mut nodes[parent as usize];
    parent.first_child = children.first().copied();
    parent.child_count = children.len() as u64;

    for pair in children.windows(2) {
        nodes[pair[0] as usize].right_sibling = Some(pair[1]);
        nodes[pair[1] as usize].left_sibling = Some(pair[0]);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_allocates_keys_in_document_order() {
        let snapshot = DocumentBuilder::new()
            .element("a", |a| {
                a.attribute("x", "1")
                    .namespace("p", "urn:p")
                    .element("b", |b| {
                        b.text("hello");
                    })
                    .comment("note");
            })
            .build();

        let kinds = (0..snapshot.len() as NodeKey)
            .filter_map(|key| snapshot.get(key).map(|record| record.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Root,
                NodeKind::Element,
                NodeKind::Namespace,
                NodeKind::Attribute,
                NodeKind::Element,
                NodeKind::Text,
                NodeKind::Comment,
            ]
        );
    }

    #[test]
    fn it_links_siblings_and_owners() {
        let snapshot = DocumentBuilder::new()
            .element("a", |a| {
                a.attribute("x", "1").element("b", |_| {}).element("c", |_| {});
            })
            .build();

        let a = snapshot.get(1).cloned();
        assert_eq!(a.as_ref().map(|a| a.attributes.clone()), Some(vec![2]));
        assert_eq!(a.as_ref().and_then(|a| a.first_child), Some(3));
        assert_eq!(a.map(|a| a.child_count), Some(2));

        assert_eq!(snapshot.get(2).and_then(|x| x.parent), Some(1));
        assert_eq!(snapshot.get(2).and_then(|x| x.right_sibling), None);
        assert_eq!(snapshot.get(3).and_then(|b| b.right_sibling), Some(4));
        assert_eq!(snapshot.get(4).and_then(|c| c.left_sibling), Some(3));
    }

    #[test]
    fn it_names_processing_instructions_by_target() {
        let snapshot = DocumentBuilder::new()
            .processing_instruction("xml-stylesheet", "href=\"a.xsl\"")
            .build();
        let instruction = snapshot.get(1).cloned();
        assert_eq!(
            instruction.as_ref().and_then(|pi| pi.name.clone()),
            Some(QualifiedName::local("xml-stylesheet"))
        );
        assert_eq!(
            instruction.and_then(|pi| pi.value),
            Some("href=\"a.xsl\"".to_string())
        );
    }
}
