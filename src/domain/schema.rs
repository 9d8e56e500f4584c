//! Schema entries, display formats and the request paths built from them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Id of the group node that holds all schema nodes.
pub const SCHEMAS_NODE_ID: &str = "schemas";

/// Schema rendering/serialization requested from the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchemaFormat {
    /// Raw swagger document, shown in the embedded spec viewer
    Swagger,
    /// Server-rendered HTML
    Html,
    /// Any other format the server understands; only downloadable
    Other(String),
}

impl SchemaFormat {
    pub fn wire_name(&self) -> &str {
        match self {
            SchemaFormat::Swagger => "SWAGGER",
            SchemaFormat::Html => "HTML",
            SchemaFormat::Other(name) => name,
        }
    }

    /// File suffix the server uses for downloads in this format.
    pub fn suffix(&self) -> &'static str {
        match self {
            SchemaFormat::Swagger => ".yaml",
            SchemaFormat::Html => ".html",
            SchemaFormat::Other(_) => "",
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for SchemaFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidFormat(s.to_string()));
        }
        Ok(match trimmed.to_ascii_uppercase().as_str() {
            "SWAGGER" => SchemaFormat::Swagger,
            "HTML" => SchemaFormat::Html,
            _ => SchemaFormat::Other(trimmed.to_string()),
        })
    }
}

impl TryFrom<String> for SchemaFormat {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaFormat> for String {
    fn from(format: SchemaFormat) -> Self {
        format.wire_name().to_string()
    }
}

/// Tree node id for a schema.
pub fn schema_node_id(schema_id: &str) -> String {
    format!("{SCHEMAS_NODE_ID}/{schema_id}")
}

/// Schema name carried by a tree node id, if it is a schema node.
pub fn schema_id_from_node(node_id: &str) -> Option<&str> {
    node_id
        .strip_prefix(SCHEMAS_NODE_ID)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|name| !name.is_empty())
}

/// Path of the schema list endpoint.
pub fn schemas_path() -> &'static str {
    "schemas"
}

/// Path for a single schema, relative to the server root.
pub fn schema_path(schema_id: &str, download: bool, format: &SchemaFormat) -> String {
    format!(
        "schemas/{}?download={}&format={}",
        urlencoding::encode(schema_id),
        download,
        urlencoding::encode(format.wire_name())
    )
}

/// Path for the bulk download of every schema.
pub fn download_all_path(format: &SchemaFormat) -> String {
    format!(
        "download/schemas?format={}",
        urlencoding::encode(format.wire_name())
    )
}

/// Sort schema names lexicographically and drop duplicates.
pub fn sorted_schema_ids(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids.dedup();
    ids
}
