//! Arena-backed tree of selectable, collapsible nodes.
//!
//! Node state that a markup renderer would carry as attributes (`expanded`,
//! `id`, the non-actionable marker) lives here as typed fields.

use std::fmt;
use std::str::FromStr;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Role of the element a click landed on.
///
/// Mirrors the element vocabulary of the tree markup: a node wraps a face
/// (toggle + label) and a children container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    Node,
    Children,
    Face,
    Label,
    Toggle,
}

impl ElementRole {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementRole::Node => "tree-node",
            ElementRole::Children => "tree-children",
            ElementRole::Face => "tree-face",
            ElementRole::Label => "tree-label",
            ElementRole::Toggle => "tree-toggle",
        }
    }
}

impl FromStr for ElementRole {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "tree-node" => Ok(ElementRole::Node),
            "tree-children" => Ok(ElementRole::Children),
            "tree-face" => Ok(ElementRole::Face),
            "tree-label" => Ok(ElementRole::Label),
            "tree-toggle" => Ok(ElementRole::Toggle),
            _ => Err(()),
        }
    }
}

/// A click on some element belonging to `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    /// `None` when the clicked element is not part of the tree vocabulary.
    pub role: Option<ElementRole>,
    pub node: Index,
}

impl Click {
    pub fn new(role: ElementRole, node: Index) -> Self {
        Self {
            role: Some(role),
            node,
        }
    }

    /// Build a click from a raw tag name; unknown tags produce an inert click.
    pub fn from_tag(tag: &str, node: Index) -> Self {
        Self {
            role: tag.parse().ok(),
            node,
        }
    }
}

/// Data for a node being inserted into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: Option<String>,
    pub label: String,
    pub expanded: bool,
    pub actionable: bool,
}

impl NodeSpec {
    /// Actionable leaf with an id.
    pub fn leaf(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.into(),
            expanded: false,
            actionable: true,
        }
    }

    /// Non-actionable group node, expanded by default.
    pub fn group(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.into(),
            expanded: true,
            actionable: false,
        }
    }
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct TreeNode {
    pub id: Option<String>,
    pub label: String,
    pub expanded: bool,
    /// Non-actionable nodes ignore label clicks.
    pub actionable: bool,
    pub active: bool,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Forest of nodes bound to a container id.
///
/// Top-level nodes are kept in insertion order; children likewise.
#[derive(Debug)]
pub struct TreeArena {
    container_id: String,
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
}

impl TreeArena {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Append a node under `parent`, or at top level when `parent` is `None`.
    #[instrument(level = "trace", skip(self))]
    pub fn append(&mut self, spec: NodeSpec, parent: Option<Index>) -> Index {
        let node = TreeNode {
            id: spec.id,
            label: spec.label,
            expanded: spec.expanded,
            actionable: spec.actionable,
            active: false,
            parent,
            children: Vec::new(),
        };
        let idx = self.arena.insert(node);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&mut self, idx: Index) {
        let Some(node) = self.arena.remove(idx) else {
            return;
        };
        match node.parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.retain(|&c| c != idx),
            None => self.roots.retain(|&r| r != idx),
        }
        for child in node.children {
            self.remove(child);
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Lookup by id; stale ids simply miss.
    pub fn find_by_id(&self, id: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.id.as_deref() == Some(id))
            .map(|(idx, _)| idx)
    }

    /// First actionable node in document order.
    pub fn first_actionable(&self) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.actionable)
            .map(|(idx, _)| idx)
    }

    pub fn active(&self) -> Option<Index> {
        self.iter().find(|(_, node)| node.active).map(|(idx, _)| idx)
    }

    /// Pre-order (document order) traversal over all top-level trees.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
