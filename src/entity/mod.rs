//! Entities managed by a Saiku server.
//!
//! Every entity keeps the JSON fields it doesn't know about in `extra`,
//! so a [Snapshot](crate::snapshot::Snapshot) carries them over unchanged.

pub mod repository;

use serde_json::{Map, Value};

pub use repository::{Acl, AclType, ContentEncoding, File, Folder, Node, Permission};

/// Entities identified by a natural, server-wide unique key.
pub trait Keyed {
    /// Type of the natural key.
    type Key: Ord + Clone;

    /// Returns the natural key of the entity.
    fn key(&self) -> &Self::Key;
}

/// A user account.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

impl Keyed for User {
    type Key = String;

    fn key(&self) -> &String {
        &self.username
    }
}

/// A Mondrian schema.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    pub name: String,
    /// Repository path of the schema file.
    #[serde(default)]
    pub path: String,
    /// The schema definition itself.
    ///
    /// Listing schemas doesn't return it, it has to be fetched from the
    /// repository resource at [`path`](Self::path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Keyed for Schema {
    type Key = String;

    fn key(&self) -> &String {
        &self.name
    }
}

/// A datasource connecting a schema to a database.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Datasource {
    pub id: String,
    #[serde(default, rename = "connectionname", skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    #[serde(default, rename = "connectiontype", skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(default, rename = "jdbcurl", skip_serializing_if = "Option::is_none")]
    pub jdbc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Datasource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Keyed for Datasource {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}
