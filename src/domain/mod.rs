//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod format_selector;
pub mod schema;
pub mod tree;
pub mod tree_config;

pub use error::DomainError;
pub use format_selector::FormatSelector;
pub use schema::{
    download_all_path, schema_id_from_node, schema_node_id, schema_path, schemas_path,
    sorted_schema_ids, SchemaFormat, SCHEMAS_NODE_ID,
};
pub use tree::{Click, ElementRole, NodeSpec, TreeArena, TreeNode};
pub use tree_config::TreeConfig;
