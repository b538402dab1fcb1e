//! Arena-backed element tree
//!
//! Elements live in a flat arena indexed by `NodeId`. Each node keeps a
//! parent index and an ordered list of child indices, so ancestor walks are
//! O(1) per step and there are no ownership cycles.

use serde::{Deserialize, Serialize};

use super::attributes::{Attributes, IdentifyingAttributes};

/// Stable index of one element within its tree's arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    identifying: IdentifyingAttributes,
    attributes: Attributes,
}

/// One complete element tree, rooted at `NodeId` 0.
///
/// Trees are constructed once per snapshot and are immutable for the
/// duration of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTree {
    nodes: Vec<Node>,
}

impl ElementTree {
    /// Creates a single-node tree from the root's attributes.
    pub fn single(identifying: IdentifyingAttributes, attributes: Attributes) -> Self {
        ElementTreeBuilder::new(identifying, attributes).build()
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only for a tree that lost all nodes, which builders never
    /// produce.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of an element, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Ordered children of an element.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Identifying attributes of an element.
    pub fn identifying(&self, id: NodeId) -> &IdentifyingAttributes {
        &self.nodes[id.index()].identifying
    }

    /// Descriptive attributes of an element.
    pub fn attributes(&self, id: NodeId) -> &Attributes {
        &self.nodes[id.index()].attributes
    }

    /// True for synthetic pseudo containers.
    pub fn is_pseudo(&self, id: NodeId) -> bool {
        self.identifying(id).is_pseudo()
    }

    /// True if no children remain after excluding pseudo containers.
    ///
    /// Pseudo containers never count as leaves themselves.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        !self.is_pseudo(id) && self.children(id).iter().all(|&c| self.is_pseudo(c))
    }

    /// Ancestor chain from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// All element ids, in arena order (parents before their children).
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Identifying attributes of the ancestor chain, nearest first.
    pub fn ancestor_identifying(&self, id: NodeId) -> Vec<&IdentifyingAttributes> {
        self.ancestors(id).map(|a| self.identifying(a)).collect()
    }
}

/// Iterator over the parent chain of an element.
pub struct Ancestors<'a> {
    tree: &'a ElementTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Incremental tree construction, root first.
pub struct ElementTreeBuilder {
    nodes: Vec<Node>,
}

impl ElementTreeBuilder {
    /// Starts a tree with the given root attributes.
    pub fn new(identifying: IdentifyingAttributes, attributes: Attributes) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                identifying,
                attributes,
            }],
        }
    }

    /// The root id of the tree under construction.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a child under `parent` and returns its id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        identifying: IdentifyingAttributes,
        attributes: Attributes,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            identifying,
            attributes,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Finishes construction.
    pub fn build(self) -> ElementTree {
        ElementTree { nodes: self.nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(element_type: &str, path: &str) -> IdentifyingAttributes {
        IdentifyingAttributes::of(element_type, path)
    }

    #[test]
    fn test_parent_child_edges() {
        let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
        let root = builder.root();
        let panel = builder.add_child(root, ident("panel", "w[1]/p[1]"), Attributes::new());
        let button = builder.add_child(panel, ident("button", "w[1]/p[1]/b[1]"), Attributes::new());
        let tree = builder.build();

        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.parent(panel), Some(root));
        assert_eq!(tree.parent(button), Some(panel));
        assert_eq!(tree.children(root), &[panel]);
        assert_eq!(tree.children(panel), &[button]);
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
        let root = builder.root();
        let panel = builder.add_child(root, ident("panel", "w[1]/p[1]"), Attributes::new());
        let button = builder.add_child(panel, ident("button", "w[1]/p[1]/b[1]"), Attributes::new());
        let tree = builder.build();

        let chain: Vec<NodeId> = tree.ancestors(button).collect();
        assert_eq!(chain, vec![panel, root]);
    }

    #[test]
    fn test_leaf_excludes_pseudo_children() {
        let mut builder = ElementTreeBuilder::new(ident("window", "w[1]"), Attributes::new());
        let root = builder.root();
        let button = builder.add_child(root, ident("button", "w[1]/b[1]"), Attributes::new());
        let pseudo =
            builder.add_child(button, ident("::before", "w[1]/b[1]/::before"), Attributes::new());
        let tree = builder.build();

        // The button's only child is a pseudo container, so it stays a leaf.
        assert!(tree.is_leaf(button));
        assert!(!tree.is_leaf(root));
        assert!(!tree.is_leaf(pseudo));
        assert!(tree.is_pseudo(pseudo));
    }
}
