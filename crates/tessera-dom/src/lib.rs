//! Markup node tree for the Tessera renderer.
//!
//! This crate provides an arena-based tree structure shaped after the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), reduced to what a
//! renderer consumes: elements with attributes, text leaves, and ordered
//! children.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! renderer only reads the tree; it never mutates a tree it was handed.

pub mod json;
pub mod tag;

use std::collections::{BTreeMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};

pub use json::{TreeError, parse_json_tree};
pub use tag::Tag;

/// Map of attribute names to values for an element.
///
/// Ordered so that structural hashing sees attributes in a stable order.
pub type AttributesMap = BTreeMap<String, String>;

/// Descent limit for recursive walks. Deeper (or cyclic) structure is cut off.
pub const MAX_TREE_DEPTH: usize = 256;

/// A type-safe index into the tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The invisible container at [`NodeId::ROOT`].
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments." Never rendered.
    Comment(String),
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name", as the parser produced it.
    pub tag_name: String,
    /// The name resolved against the renderer's vocabulary.
    pub tag: Tag,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data, resolving the tag name.
    #[must_use]
    pub fn new(tag_name: &str, attrs: AttributesMap) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            tag: Tag::from_name(tag_name),
            attrs,
        }
    }

    /// Value of the named attribute, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Value of the named attribute when present and not blank.
    #[must_use]
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.trim().is_empty())
    }
}

/// Arena-based tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![document],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`. Out-of-range ids are
    /// ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_ascii_lowercase(), (*v).to_string()))
            .collect();
        let id = self.alloc(NodeType::Element(ElementData::new(tag_name, attrs)));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text leaf and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The resolved tag of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        self.as_element(id).map(|e| e.tag)
    }

    /// Iterate over the strict descendants of a node in document order.
    ///
    /// Each node is yielded at most once even if the tree was built with a
    /// cycle.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        let mut seen = HashSet::new();
        let _ = seen.insert(id);
        Descendants {
            tree: self,
            stack,
            seen,
        }
    }

    /// Concatenation of every text leaf below `id`, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.as_text(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.as_text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Structural hash of the subtree rooted at `id`.
    ///
    /// Two subtrees with the same tags, attributes and text hash equally
    /// regardless of where they sit in the tree. Each node is hashed once;
    /// a repeat visit hashes as a marker. Structure deeper than
    /// [`MAX_TREE_DEPTH`] is not visited.
    #[must_use]
    pub fn subtree_hash(&self, id: NodeId) -> u64 {
        let mut hasher = DefaultHasher::new();
        let mut seen = HashSet::new();
        self.hash_subtree(id, 0, &mut seen, &mut hasher);
        hasher.finish()
    }

    fn hash_subtree(&self, id: NodeId, depth: usize, seen: &mut HashSet<NodeId>, hasher: &mut DefaultHasher) {
        let Some(node) = self.get(id) else {
            return;
        };
        if depth > MAX_TREE_DEPTH {
            return;
        }
        if !seen.insert(id) {
            4_u8.hash(hasher);
            return;
        }
        match &node.node_type {
            NodeType::Document => 0_u8.hash(hasher),
            NodeType::Element(data) => {
                1_u8.hash(hasher);
                data.tag_name.hash(hasher);
                data.attrs.hash(hasher);
            }
            NodeType::Text(text) => {
                2_u8.hash(hasher);
                text.hash(hasher);
            }
            NodeType::Comment(_) => 3_u8.hash(hasher),
        }
        node.children.len().hash(hasher);
        for &child in &node.children {
            self.hash_subtree(child, depth + 1, seen, hasher);
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if !self.seen.insert(id) {
                continue;
            }
            self.stack
                .extend(self.tree.children(id).iter().rev().copied());
            return Some(id);
        }
        None
    }
}
