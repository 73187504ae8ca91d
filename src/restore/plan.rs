//! Three-way diff of live state against a [Snapshot](crate::snapshot::Snapshot).
//!
//! Planning never talks to the server, it only decides which calls to issue
//! and in which order.

use std::collections::{BTreeMap, HashSet};

use crate::entity::{Acl, Folder, Node};
use crate::walk;

/// A mutating call needed to make one entity match the snapshot.
#[derive(Debug, PartialEq)]
pub enum Change<'a, T> {
    Create(&'a T),
    Update(&'a T),
    Delete(&'a T),
}

impl<'a, T> Change<'a, T> {
    pub fn entity(&self) -> &'a T {
        match self {
            Change::Create(entity) | Change::Update(entity) | Change::Delete(entity) => *entity,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Change::Create(_) => "create",
            Change::Update(_) => "update",
            Change::Delete(_) => "delete",
        }
    }
}

/// Plans the changes turning `existing` into `desired`.
///
/// Every desired key is created, or updated when it already exists, even if
/// nothing changed. Existing keys not desired are deleted afterwards.
pub fn plan<'a, K: Ord, T>(
    existing: &'a BTreeMap<K, T>,
    desired: &'a BTreeMap<K, T>,
) -> Vec<Change<'a, T>> {
    let upserts = desired.iter().map(|(key, entity)| {
        if existing.contains_key(key) {
            Change::Update(entity)
        } else {
            Change::Create(entity)
        }
    });
    let deletes = existing
        .iter()
        .filter(|(key, _)| !desired.contains_key(*key))
        .map(|(_, entity)| Change::Delete(entity));

    upserts.chain(deletes).collect()
}

/// A mutating repository call, see [plan_repository].
#[derive(Debug, PartialEq)]
pub enum RepoChange<'a> {
    Store(&'a Node),
    SetAcl(&'a str, &'a Acl),
    Delete(&'a Node),
}

/// Plans the calls turning the live homes folder into `desired`.
///
/// Desired nodes are visited in pre-order so parents are stored before their
/// children. Files are always stored, folders only when missing since the
/// server refuses to create an existing folder. The ACL of a desired path is
/// set whether or not its node was stored. Live nodes not desired are
/// deleted last, children before their parents.
pub fn plan_repository<'a>(
    desired: &'a Folder,
    acls: &'a BTreeMap<String, Acl>,
    live: Option<&'a Folder>,
) -> Vec<RepoChange<'a>> {
    let existing: Vec<_> = live.map(|live| walk::flatten(live).collect()).unwrap_or_default();
    let existing_paths: HashSet<&str> = existing.iter().map(|(path, _)| *path).collect();

    let mut changes = Vec::new();
    let mut restored = HashSet::new();
    for (path, node) in walk::flatten(desired) {
        if !node.is_folder() || !existing_paths.contains(path) {
            changes.push(RepoChange::Store(node));
        }
        if let Some(acl) = acls.get(path) {
            changes.push(RepoChange::SetAcl(path, acl));
        }
        restored.insert(path);
    }

    changes.extend(
        existing
            .iter()
            .rev()
            .filter(|(path, _)| !restored.contains(path))
            .map(|&(_, node)| RepoChange::Delete(node)),
    );
    changes
}
