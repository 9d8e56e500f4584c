//! Persisted per-tree UI state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Active node and expanded flags of one tree instance.
///
/// The `expanded` map only grows: toggling a node overwrites its entry,
/// nothing ever removes one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeConfig {
    pub active_node_id: Option<String>,
    pub expanded: BTreeMap<String, bool>,
}

impl TreeConfig {
    /// Merge stored JSON over the defaults.
    ///
    /// Top-level keys present in `stored` replace the defaults; keys with the
    /// wrong shape are ignored. Returns the default config when `stored` is
    /// not a JSON object.
    pub fn merged_from_json(stored: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stored) else {
            warn!("ignoring malformed tree config: {:?}", stored);
            return Self::default();
        };

        let mut config = Self::default();
        if let Some(active) = map.get("activeNodeId") {
            config.active_node_id = active.as_str().map(str::to_string);
        }
        if let Some(Value::Object(expanded)) = map.get("expanded") {
            config.expanded = expanded
                .iter()
                .filter_map(|(id, v)| v.as_bool().map(|b| (id.clone(), b)))
                .collect();
        }
        config
    }

    pub fn to_json(&self) -> String {
        // A struct of strings and bools always serializes
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn record_expanded(&mut self, id: &str, expanded: bool) {
        self.expanded.insert(id.to_string(), expanded);
    }
}
