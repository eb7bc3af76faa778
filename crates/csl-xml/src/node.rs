//! Mutable document tree with stable node identities.
//!
//! Nodes live in an arena owned by the [`Document`] and are addressed
//! by [`NodeId`] handles. Ids index the arena and are never reused, so
//! a handle taken before a mutation still names the same node after it;
//! a detached subtree keeps its ids but is no longer reachable from the
//! root. Every node carries a non-owning parent back-reference, so
//! detaching never consults a separately maintained parent map that
//! could go stale.

/// Stable handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The kind of a tree node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An element with an optional namespace prefix and a local name.
    Element {
        prefix: Option<String>,
        name: String,
    },

    /// A text run (entities already resolved).
    Text(String),

    /// A comment; the body is opaque text.
    Comment(String),
}

/// A single attribute of an element.
///
/// Attribute order within an element is document order and is preserved
/// through mutation and serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace prefix, if any (e.g. "xml" in `xml:lang`).
    pub prefix: Option<String>,

    /// The local name of the attribute.
    pub name: String,

    /// The attribute value (after unescaping XML entities).
    pub value: String,
}

impl Attribute {
    /// Create an unprefixed attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            prefix: None,
            name: name.into(),
            value: value.into(),
        }
    }

    /// The attribute name as written in the source, prefix included.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    attributes: Vec<Attribute>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed document: an arena of nodes plus the id of the root element.
///
/// The arena is reclaimed when the document drops; there is no
/// per-subtree deallocation, which keeps every id stable for the
/// lifetime of the document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    /// Create a document whose root is an element with the given name.
    pub fn with_root(
        prefix: Option<String>,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        let root = NodeData {
            kind: NodeKind::Element {
                prefix,
                name: name.into(),
            },
            attributes,
            parent: None,
            children: Vec::new(),
        };
        Document {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The root element of the document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    /// Create a detached element node.
    pub fn create_element(
        &mut self,
        prefix: Option<String>,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        self.alloc(NodeData {
            kind: NodeKind::Element {
                prefix,
                name: name.into(),
            },
            attributes,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeData {
            kind: NodeKind::Text(content.into()),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, body: impl Into<String>) -> NodeId {
        self.alloc(NodeData {
            kind: NodeKind::Comment(body.into()),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        })
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    /// The local name of an element node, or `None` for text/comments.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether `id` is an element with the given local name.
    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    /// All attributes of a node, in document order.
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        &self.data(id).attributes
    }

    /// Look up an attribute value by local name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.data(id)
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// The parent of a node, if it is attached to one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// The ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// Child nodes that are elements, in order.
    pub fn element_children<'a>(&'a self, id: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        self.data(id)
            .children
            .iter()
            .copied()
            .filter(|&c| matches!(self.data(c).kind, NodeKind::Element { .. }))
    }

    /// Pre-order traversal of `id`'s subtree, including `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// All elements with the given local name, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(self.root)
            .filter(move |&id| self.is_element_named(id, name))
    }

    /// Append a node to `parent`'s children, detaching it first if needed.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.push(child);
    }

    /// Insert a node into `parent`'s children at `index`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.insert(index, child);
    }

    /// Unlink a node, and thereby its whole subtree, from its parent.
    ///
    /// Detaching the root (or an already detached node) is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.data_mut(id).parent.take() {
            self.data_mut(parent).children.retain(|&c| c != id);
        }
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.data_mut(id).children);
        for child in children {
            self.data_mut(child).parent = None;
        }
    }

    /// Deep-copy `id`'s subtree.
    ///
    /// The copy has fresh node identities, shares nothing with the
    /// original, and starts out detached, so the same body can be
    /// spliced into several places and mutated independently.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let data = NodeData {
            kind: self.data(id).kind.clone(),
            attributes: self.data(id).attributes.clone(),
            parent: None,
            children: Vec::new(),
        };
        let copy = self.alloc(data);
        let children = self.data(id).children.clone();
        for child in children {
            let child_copy = self.deep_copy(child);
            self.data_mut(child_copy).parent = Some(copy);
            self.data_mut(copy).children.push(child_copy);
        }
        copy
    }
}

/// Iterator over a subtree in pre-order. See [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = &self.doc.data(id).children;
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}
