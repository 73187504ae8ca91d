#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use saiku_backup_lib::client::{Client, ClientError};
use saiku_backup_lib::entity::{Acl, Datasource, File, Folder, Node, Schema, User};

/// Live state of the [FakeSaiku] server.
#[derive(Debug, Clone)]
pub struct State {
    pub tree: Folder,
    pub acls: BTreeMap<String, Acl>,
    pub users: Vec<User>,
    pub schemas: Vec<Schema>,
    pub datasources: Vec<Datasource>,
    pub license: Option<File>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            tree: Folder::new(""),
            acls: BTreeMap::new(),
            users: Vec::new(),
            schemas: Vec::new(),
            datasources: Vec::new(),
            license: None,
        }
    }
}

/// In-memory server recording every call.
///
/// Mutating calls are applied to the [State]. Storing an existing folder is
/// rejected like the real server does.
#[derive(Default)]
pub struct FakeSaiku {
    pub state: RefCell<State>,
    calls: RefCell<Vec<String>>,
    failing: RefCell<Vec<String>>,
}

impl FakeSaiku {
    pub fn new(state: State) -> Self {
        Self {
            state: RefCell::new(state),
            ..Default::default()
        }
    }

    /// Makes every call whose record starts with `prefix` fail.
    pub fn fail_on(&self, prefix: &str) {
        self.failing.borrow_mut().push(prefix.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Recorded calls except the read-only ones.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("get_") && !call.starts_with("list_"))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: String) -> Result<(), ClientError> {
        let failing = self.failing.borrow().iter().any(|prefix| call.starts_with(prefix.as_str()));
        self.calls.borrow_mut().push(call.clone());
        if failing {
            return Err(rejected(&call, 503));
        }
        Ok(())
    }
}

fn rejected(operation: &str, status: u16) -> ClientError {
    ClientError::Rejected {
        operation: operation.to_string(),
        status,
        message: "fake".to_string(),
    }
}

fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

fn folder_mut<'a>(folder: &'a mut Folder, path: &str) -> Option<&'a mut Folder> {
    if folder.path == path {
        return Some(folder);
    }
    folder.repo_objects.iter_mut().find_map(|node| match node {
        Node::Folder(child) => folder_mut(child, path),
        Node::File(_) => None,
    })
}

fn contains(folder: &Folder, path: &str) -> bool {
    folder
        .children()
        .iter()
        .any(|node| node.path() == path || node.as_folder().is_some_and(|f| contains(f, path)))
}

fn remove(folder: &mut Folder, path: &str) -> bool {
    let before = folder.repo_objects.len();
    folder.repo_objects.retain(|node| node.path() != path);
    before != folder.repo_objects.len()
        || folder.repo_objects.iter_mut().any(|node| match node {
            Node::Folder(child) => remove(child, path),
            Node::File(_) => false,
        })
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = item.clone(),
        None => items.push(item.clone()),
    }
}

impl Client for FakeSaiku {
    fn get_tree(&self, recursive: bool) -> Result<Folder, ClientError> {
        self.record(format!("get_tree {recursive}"))?;
        Ok(self.state.borrow().tree.clone())
    }

    fn get_resource(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        self.record(format!("get_resource {path}"))?;
        let state = self.state.borrow();
        state
            .schemas
            .iter()
            .find(|schema| schema.path == path)
            .and_then(|schema| schema.xml.clone())
            .map(String::into_bytes)
            .ok_or_else(|| rejected(path, 404))
    }

    fn store_resource(&self, node: &Node) -> Result<(), ClientError> {
        self.record(format!("store_resource {}", node.path()))?;
        let mut state = self.state.borrow_mut();
        let stored = match node {
            Node::Folder(folder) => {
                if contains(&state.tree, &folder.path) {
                    return Err(rejected(&folder.path, 500));
                }
                let mut empty = folder.clone();
                empty.repo_objects.clear();
                Node::Folder(empty)
            }
            Node::File(file) => Node::File(file.clone()),
        };

        let parent = folder_mut(&mut state.tree, parent_path(node.path()))
            .ok_or_else(|| rejected(node.path(), 404))?;
        match parent.repo_objects.iter_mut().find(|n| n.path() == node.path()) {
            Some(existing) => *existing = stored,
            None => parent.repo_objects.push(stored),
        }
        Ok(())
    }

    fn delete_resource(&self, node: &Node) -> Result<(), ClientError> {
        self.record(format!("delete_resource {}", node.path()))?;
        if remove(&mut self.state.borrow_mut().tree, node.path()) {
            Ok(())
        } else {
            Err(rejected(node.path(), 404))
        }
    }

    fn get_acl(&self, path: &str) -> Result<Option<Acl>, ClientError> {
        self.record(format!("get_acl {path}"))?;
        Ok(self.state.borrow().acls.get(path).cloned())
    }

    fn set_acl(&self, path: &str, acl: &Acl) -> Result<(), ClientError> {
        self.record(format!("set_acl {path}"))?;
        self.state.borrow_mut().acls.insert(path.to_string(), acl.clone());
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.record("list_users".to_string())?;
        Ok(self.state.borrow().users.clone())
    }

    fn create_user(&self, user: &User) -> Result<(), ClientError> {
        self.record(format!("create_user {}", user.username))?;
        self.state.borrow_mut().users.push(user.clone());
        Ok(())
    }

    fn update_user_password(&self, user: &User) -> Result<(), ClientError> {
        self.record(format!("update_user_password {}", user.username))?;
        let mut state = self.state.borrow_mut();
        upsert(&mut state.users, user, |u| u.username == user.username);
        Ok(())
    }

    fn delete_user(&self, user: &User) -> Result<(), ClientError> {
        self.record(format!("delete_user {}", user.username))?;
        self.state.borrow_mut().users.retain(|u| u.username != user.username);
        Ok(())
    }

    fn list_schemas(&self, with_xml: bool) -> Result<Vec<Schema>, ClientError> {
        self.record(format!("list_schemas {with_xml}"))?;
        let mut schemas = self.state.borrow().schemas.clone();
        if !with_xml {
            schemas.iter_mut().for_each(|schema| schema.xml = None);
        }
        Ok(schemas)
    }

    fn create_schema(&self, schema: &Schema) -> Result<(), ClientError> {
        self.record(format!("create_schema {}", schema.name))?;
        self.state.borrow_mut().schemas.push(schema.clone());
        Ok(())
    }

    fn update_schema(&self, schema: &Schema) -> Result<(), ClientError> {
        self.record(format!("update_schema {}", schema.name))?;
        let mut state = self.state.borrow_mut();
        upsert(&mut state.schemas, schema, |s| s.name == schema.name);
        Ok(())
    }

    fn delete_schema(&self, schema: &Schema) -> Result<(), ClientError> {
        self.record(format!("delete_schema {}", schema.name))?;
        self.state.borrow_mut().schemas.retain(|s| s.name != schema.name);
        Ok(())
    }

    fn list_datasources(&self) -> Result<Vec<Datasource>, ClientError> {
        self.record("list_datasources".to_string())?;
        Ok(self.state.borrow().datasources.clone())
    }

    fn create_datasource(&self, datasource: &Datasource) -> Result<(), ClientError> {
        self.record(format!("create_datasource {}", datasource.id))?;
        self.state.borrow_mut().datasources.push(datasource.clone());
        Ok(())
    }

    fn update_datasource(&self, datasource: &Datasource) -> Result<(), ClientError> {
        self.record(format!("update_datasource {}", datasource.id))?;
        let mut state = self.state.borrow_mut();
        upsert(&mut state.datasources, datasource, |d| d.id == datasource.id);
        Ok(())
    }

    fn delete_datasource(&self, datasource: &Datasource) -> Result<(), ClientError> {
        self.record(format!("delete_datasource {}", datasource.id))?;
        self.state.borrow_mut().datasources.retain(|d| d.id != datasource.id);
        Ok(())
    }

    fn store_license(&self, license: &File) -> Result<(), ClientError> {
        self.record(format!("store_license {}", license.path))?;
        self.state.borrow_mut().license = Some(license.clone());
        Ok(())
    }
}
