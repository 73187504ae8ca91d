//! Wire shape of a [Snapshot] document.

use std::collections::BTreeMap;

use serde_json::Value;

use super::Snapshot;
use crate::entity::repository::NodeRef;
use crate::entity::{Acl, Datasource, File, Node, Schema, User};

/// Document as read, before validation.
#[derive(serde::Deserialize)]
pub(super) struct Document {
    #[serde(default)]
    pub created: Option<Value>,
    #[serde(default)]
    pub license: Option<File>,
    #[serde(default)]
    pub homes: Option<Node>,
    #[serde(default)]
    pub acls: BTreeMap<String, Acl>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub schemas: Vec<Schema>,
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

#[derive(serde::Serialize)]
pub(super) struct DocumentRef<'a> {
    created: String,
    license: Option<&'a File>,
    homes: NodeRef<'a>,
    acls: &'a BTreeMap<String, Acl>,
    users: Vec<&'a User>,
    schemas: Vec<&'a Schema>,
    datasources: Vec<&'a Datasource>,
}

impl<'a> From<&'a Snapshot> for DocumentRef<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        Self {
            created: snapshot.created.to_rfc3339(),
            license: snapshot.license.as_ref(),
            homes: NodeRef::Folder(&snapshot.homes),
            acls: &snapshot.acls,
            users: snapshot.users.values().collect(),
            schemas: snapshot.schemas.values().collect(),
            datasources: snapshot.datasources.values().collect(),
        }
    }
}
