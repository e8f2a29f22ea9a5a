//! Document tree for the html2creole converter.
//!
//! This crate provides the intermediate structure between the HTML tree
//! builder and the Creole emitter.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships.
//! Children are owned by position in the arena; the parent link is a plain
//! index used only for walking upwards, never for lifetime management.

mod dump;
mod kind;

use std::collections::BTreeMap;

use thiserror::Error;

pub use dump::{dump_tree, print_tree};
pub use kind::{BLOCK_TAGS, NodeKind, is_block_tag};

/// Map of attribute names to values for a node.
///
/// Ordered so tree dumps are deterministic.
pub type AttributesMap = BTreeMap<String, String>;

/// A type-safe index into the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A single node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocNode {
    /// Which emission rule applies to this node.
    pub kind: NodeKind,
    /// Attributes copied from the start tag.
    pub attrs: AttributesMap,
    /// Text payload; only set on leaf kinds.
    pub content: Option<String>,
    /// Headline depth or list nesting depth.
    pub level: Option<usize>,
    /// Non-owning back reference; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

impl DocNode {
    /// A node with attributes and no payload.
    #[must_use]
    pub const fn element(kind: NodeKind, attrs: AttributesMap) -> Self {
        Self {
            kind,
            attrs,
            content: None,
            level: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A text-like leaf holding `content`.
    #[must_use]
    pub fn leaf(kind: NodeKind, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::element(kind, AttributesMap::new())
        }
    }

    /// Set the node's level.
    #[must_use]
    pub const fn with_level(mut self, level: usize) -> Self {
        self.level = Some(level);
        self
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// A broken structural invariant, reported by [`DocTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The node at index 0 is not a parentless document node.
    #[error("root node must be a parentless document node")]
    InvalidRoot,
    /// A node other than the root has no parent or is missing from its parent's children.
    #[error("node {0:?} is not attached to the tree")]
    Detached(NodeId),
    /// A node is listed as a child of a node that is not its parent.
    #[error("node {child:?} listed under {listed_under:?} but its parent is {parent:?}")]
    ParentMismatch {
        /// The child in question.
        child: NodeId,
        /// The node whose children list contains it.
        listed_under: NodeId,
        /// The child's recorded parent.
        parent: Option<NodeId>,
    },
    /// A node with a text payload has children.
    #[error("{kind} node {id:?} has content and children")]
    ContentWithChildren {
        /// The offending node.
        id: NodeId,
        /// Its kind.
        kind: NodeKind,
    },
    /// `level` is set on a kind that has none, or missing on one that needs it.
    #[error("{kind} node {id:?} has an unexpected level {level:?}")]
    LevelMismatch {
        /// The offending node.
        id: NodeId,
        /// Its kind.
        kind: NodeKind,
        /// The level found on the node.
        level: Option<usize>,
    },
}

/// Arena-based document tree with O(1) node access.
///
/// All nodes live in one vector and refer to each other by [`NodeId`].
/// The document node is always at index 0 ([`NodeId::ROOT`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTree {
    nodes: Vec<DocNode>,
}

impl DocTree {
    /// Create a new tree with just the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![DocNode::element(NodeKind::Document, AttributesMap::new())],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&DocNode> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the root).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, mut node: DocNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        id
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate `node` and append it as the last child of `parent`.
    pub fn create_child(&mut self, parent: NodeId, node: DocNode) -> NodeId {
        let id = self.alloc(node);
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

    /// Get the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    /// Get the text payload of a node.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.content.as_deref())
    }

    /// Get an attribute value of a node.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attr(name))
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over every node reachable from the root, in document order.
    #[must_use]
    pub fn iter_all(&self) -> DocumentOrderIterator<'_> {
        DocumentOrderIterator {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Check the structural invariants of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`TreeError`] found.
    pub fn validate(&self) -> Result<(), TreeError> {
        match self.get(NodeId::ROOT) {
            Some(root)
                if root.kind == NodeKind::Document
                    && root.parent.is_none()
                    && root.content.is_none() => {}
            _ => return Err(TreeError::InvalidRoot),
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);

            if id != NodeId::ROOT {
                let attached = node
                    .parent
                    .is_some_and(|parent| self.children(parent).contains(&id));
                if !attached {
                    return Err(TreeError::Detached(id));
                }
            }

            for &child in &node.children {
                let parent = self.parent(child);
                if parent != Some(id) {
                    return Err(TreeError::ParentMismatch {
                        child,
                        listed_under: id,
                        parent,
                    });
                }
            }

            if node.content.is_some() && !node.children.is_empty() {
                return Err(TreeError::ContentWithChildren {
                    id,
                    kind: node.kind.clone(),
                });
            }

            if node.kind.has_level() != node.level.is_some() {
                return Err(TreeError::LevelMismatch {
                    id,
                    kind: node.kind.clone(),
                    level: node.level,
                });
            }
        }
        Ok(())
    }
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DocTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over the tree, starting at the root.
pub struct DocumentOrderIterator<'a> {
    tree: &'a DocTree,
    stack: Vec<NodeId>,
}

impl Iterator for DocumentOrderIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
