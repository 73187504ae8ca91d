//! Depth-first traversal of the repository tree.

use std::collections::HashSet;
use std::slice;

use crate::entity::{Acl, File, Folder, Node};

/// Absolute path of the folder holding the users' home folders.
pub const HOMES_PATH: &str = "/homes";

/// Returns a lazy pre-order walk over every node below `root`.
///
/// `root` itself isn't yielded. Every call starts a fresh walk.
pub fn flatten(root: &Folder) -> Walk<'_> {
    Walk {
        stack: vec![root.children().iter()],
        seen: HashSet::new(),
    }
}

/// Iterator returned by [flatten].
///
/// A path that was already yielded is skipped together with its subtree.
pub struct Walk<'a> {
    stack: Vec<slice::Iter<'a, Node>>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a str, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            let Some(node) = level.next() else {
                self.stack.pop();
                continue;
            };

            let path = node.path();
            if !self.seen.insert(path) {
                log::warn!(target: "walk", "Skipping duplicate repository path: {path}");
                continue;
            }

            if let Node::Folder(folder) = node {
                self.stack.push(folder.children().iter());
            }
            return Some((path, node));
        }
    }
}

/// Walks below `root` like [flatten] and looks up the [Acl] of every node.
///
/// `lookup` is called exactly once per node. Nodes without an ACL are
/// skipped. After the first error the walk ends.
pub fn collect_acls<F, E>(root: &Folder, lookup: F) -> AclWalk<'_, F>
where
    F: FnMut(&str) -> Result<Option<Acl>, E>,
{
    AclWalk {
        walk: flatten(root),
        lookup,
        failed: false,
    }
}

/// Iterator returned by [collect_acls].
pub struct AclWalk<'a, F> {
    walk: Walk<'a>,
    lookup: F,
    failed: bool,
}

impl<'a, F, E> Iterator for AclWalk<'a, F>
where
    F: FnMut(&str) -> Result<Option<Acl>, E>,
{
    type Item = Result<(&'a str, Acl), E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        for (path, _) in self.walk.by_ref() {
            match (self.lookup)(path) {
                Ok(Some(acl)) => return Some(Ok((path, acl))),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Finds the `/homes` folder among the immediate children of `repository`.
pub fn find_homes(repository: &Folder) -> Option<&Folder> {
    repository
        .children()
        .iter()
        .filter_map(Node::as_folder)
        .find(|folder| folder.path == HOMES_PATH)
}

/// Finds the first license file of `repository` in pre-order.
pub fn find_license(repository: &Folder) -> Option<&File> {
    flatten(repository)
        .filter_map(|(_, node)| node.as_file())
        .find(|file| file.is_license())
}
