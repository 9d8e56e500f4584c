//! Collapsible, selectable tree with persisted UI state
//!
//! The widget owns a [`TreeArena`] and the [`TreeConfig`] stored for its
//! container. Every state change is written back to the key-value store
//! before the triggering call returns.

use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, trace, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{Click, ElementRole, TreeArena, TreeConfig};
use crate::infrastructure::traits::KeyValueStore;

/// Observable outcome of a dispatched click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Toggled {
        node: Index,
        id: Option<String>,
        expanded: bool,
    },
    Activated {
        node: Index,
        id: Option<String>,
        previous: Option<Index>,
    },
}

pub struct TreeWidget {
    tree: TreeArena,
    config: TreeConfig,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
}

impl TreeWidget {
    /// Bind to `tree` and load the config persisted for its container.
    pub fn new(tree: TreeArena, store: Arc<dyn KeyValueStore>) -> Self {
        let storage_key = Self::storage_key(tree.container_id());
        let config = store
            .get(&storage_key)
            .map(|stored| TreeConfig::merged_from_json(&stored))
            .unwrap_or_default();
        debug!(
            "tree {}: active={:?}, {} expanded entries",
            tree.container_id(),
            config.active_node_id,
            config.expanded.len()
        );
        Self {
            tree,
            config,
            store,
            storage_key,
        }
    }

    /// Store key holding the config of the tree bound to `container_id`.
    pub fn storage_key(container_id: &str) -> String {
        format!("{container_id}-tree")
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    /// Mutable access for populating the tree; call [`Self::initialize`] afterwards.
    pub fn tree_mut(&mut self) -> &mut TreeArena {
        &mut self.tree
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Restore persisted expanded flags, then re-activate the stored active node.
    ///
    /// Falls back to the first actionable node when the stored one is gone
    /// or was never recorded.
    pub fn initialize(&mut self) -> ApplicationResult<Option<TreeEvent>> {
        for (id, &expanded) in &self.config.expanded {
            if let Some(idx) = self.tree.find_by_id(id) {
                if let Some(node) = self.tree.get_node_mut(idx) {
                    node.expanded = expanded;
                }
            }
        }

        let target = self
            .config
            .active_node_id
            .as_deref()
            .and_then(|id| self.tree.find_by_id(id))
            .or_else(|| self.tree.first_actionable());

        match target {
            Some(idx) => self.dispatch(Click::new(ElementRole::Label, idx)),
            None => Ok(None),
        }
    }

    /// Route a click by the role of the element it landed on.
    pub fn dispatch(&mut self, click: Click) -> ApplicationResult<Option<TreeEvent>> {
        trace!("dispatch {:?}", click);
        match click.role {
            Some(ElementRole::Toggle) => self.toggle(click.node),
            Some(ElementRole::Label) => self.label_click(click.node),
            _ => Ok(None),
        }
    }

    /// Click the label of the node with `id`; unknown ids are ignored.
    pub fn click_label(&mut self, id: &str) -> ApplicationResult<Option<TreeEvent>> {
        match self.tree.find_by_id(id) {
            Some(idx) => self.dispatch(Click::new(ElementRole::Label, idx)),
            None => Ok(None),
        }
    }

    /// Click the toggle of the node with `id`; unknown ids are ignored.
    pub fn click_toggle(&mut self, id: &str) -> ApplicationResult<Option<TreeEvent>> {
        match self.tree.find_by_id(id) {
            Some(idx) => self.dispatch(Click::new(ElementRole::Toggle, idx)),
            None => Ok(None),
        }
    }

    fn toggle(&mut self, idx: Index) -> ApplicationResult<Option<TreeEvent>> {
        let Some(node) = self.tree.get_node_mut(idx) else {
            return Ok(None);
        };
        node.expanded = !node.expanded;
        let expanded = node.expanded;
        let id = node.id.clone();

        if let Some(id) = &id {
            self.config.record_expanded(id, expanded);
            self.save()?;
        }
        debug!("toggled {:?} -> expanded={}", id, expanded);
        Ok(Some(TreeEvent::Toggled {
            node: idx,
            id,
            expanded,
        }))
    }

    fn label_click(&mut self, idx: Index) -> ApplicationResult<Option<TreeEvent>> {
        match self.tree.get_node(idx) {
            Some(node) if node.actionable => {}
            _ => return Ok(None),
        }

        let previous = self.tree.active();
        if let Some(prev) = previous.and_then(|p| self.tree.get_node_mut(p)) {
            prev.active = false;
        }

        let Some(node) = self.tree.get_node_mut(idx) else {
            return Ok(None);
        };
        node.active = true;
        let id = node.id.clone();

        if let Some(id) = &id {
            self.config.active_node_id = Some(id.clone());
            self.save()?;
        }
        debug!("activated {:?} (previous {:?})", id, previous);
        Ok(Some(TreeEvent::Activated {
            node: idx,
            id,
            previous,
        }))
    }

    fn save(&self) -> ApplicationResult<()> {
        self.store
            .set(&self.storage_key, &self.config.to_json())
            .inspect_err(|e| warn!("saving {} failed: {}", self.storage_key, e))
            .with_store_context(&self.storage_key)
    }
}
