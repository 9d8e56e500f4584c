//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (HttpClient, KeyValueStore, etc.)
//! but are themselves concrete structs, not traits.

mod schema_browser;
mod tree_widget;

pub use schema_browser::{
    BrowserIo, SchemaBrowser, ViewOutcome, ViewerOptions, FORMAT_INDEX_KEY, TREE_CONTAINER_ID,
    VIEWER_CONTENT_KEY, VIEWER_SCHEMA_ID_KEY,
};
pub use tree_widget::{TreeEvent, TreeWidget};
