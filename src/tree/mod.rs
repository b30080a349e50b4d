//! Tagged node tree consumed by the extraction pipeline.
//!
//! A [`NodeTree`] is an immutable arena of nodes. Each node carries a tag
//! (local name plus optional namespace), optional text, a parent link and an
//! ordered list of children. Trees are produced by the format builders:
//!
//! - [`xml`] – AAS XML environments via `roxmltree`
//! - [`json`] – AAS JSON environments via `serde_json`
//!
//! The depth of a node is not stored; it is assigned by [`walk`] relative to
//! the subtree root being walked.

pub mod json;
pub mod walk;
pub mod xml;

pub use walk::{Visit, Walk, walk};

/// Index of a node inside its [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    namespace: Option<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Owned arena of tagged nodes. Node `0` is the document root.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<NodeData>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node below `parent` (or as a root when `None`) and return its id.
    pub fn push(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        namespace: Option<String>,
        text: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            namespace,
            text: text.filter(|t| !t.trim().is_empty()),
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    /// The first node pushed, if any.
    pub fn root(&self) -> Option<Node<'_>> {
        (!self.nodes.is_empty()).then(|| self.node(NodeId(0)))
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Borrowed handle to one node of a [`NodeTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t NodeTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Local tag name (namespace prefix removed).
    pub fn name(&self) -> &'t str {
        &self.data().name
    }

    pub fn namespace(&self) -> Option<&'t str> {
        self.data().namespace.as_deref()
    }

    pub fn has_tag_name(&self, name: &str) -> bool {
        self.name() == name
    }

    /// Text content, `None` when absent or whitespace-only.
    pub fn text(&self) -> Option<&'t str> {
        self.data().text.as_deref()
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|p| self.tree.node(p))
    }

    pub fn children(self) -> impl DoubleEndedIterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&c| tree.node(c))
    }

    pub fn has_children(&self) -> bool {
        !self.data().children.is_empty()
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<Node<'t>> {
        self.children().find(|c| c.has_tag_name(name))
    }

    /// The sibling immediately before this node.
    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let siblings = &parent.data().children;
        let pos = siblings.iter().position(|&c| c == self.id)?;
        pos.checked_sub(1).map(|p| self.tree.node(siblings[p]))
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.0)
            .field("name", &self.name())
            .field("text", &self.text())
            .finish()
    }
}
