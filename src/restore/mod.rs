//! Reconciling a live server with a [Snapshot].
//!
//! A restore runs five independent passes in a fixed order: license, users,
//! schemas, datasources and finally the repository. Each pass re-reads the
//! live state of its category, [plans](fn@plan) the differences and applies
//! them. The snapshot itself is never modified.

pub mod plan;

use std::collections::BTreeMap;
use std::fmt;

use derive_more::{Display, Error};

use crate::client::{Client, ClientError};
use crate::entity::Keyed;
use crate::snapshot::Snapshot;
use crate::walk;
pub use plan::{plan, plan_repository, Change, RepoChange};

/// Reconciliation pass of a single entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Pass {
    #[display("license")]
    License,
    #[display("users")]
    Users,
    #[display("schemas")]
    Schemas,
    #[display("datasources")]
    Datasources,
    #[display("repository")]
    Repository,
}

/// Passes of a [Restore] that failed.
///
/// Passes are independent, a failing pass doesn't stop the following ones
/// and changes applied before the failure are kept.
#[derive(Debug, Error)]
pub struct RestoreError {
    failures: Vec<(Pass, ClientError)>,
}

impl RestoreError {
    pub fn failures(&self) -> &[(Pass, ClientError)] {
        &self.failures
    }
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Restore failed in {} pass(es)", self.failures.len())?;
        for (pass, error) in &self.failures {
            write!(f, "; {pass}: {error}")?;
        }
        Ok(())
    }
}

/// Mutating calls of one entity category.
struct Operations<C, T> {
    create: fn(&C, &T) -> Result<(), ClientError>,
    update: fn(&C, &T) -> Result<(), ClientError>,
    delete: fn(&C, &T) -> Result<(), ClientError>,
}

/// Applies a [Snapshot] to a live server.
pub struct Restore<'c, C> {
    client: &'c C,
    include_license: bool,
    dry_run: bool,
}

impl<'c, C: Client> Restore<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            include_license: false,
            dry_run: false,
        }
    }

    /// Also restore the license file.
    pub fn include_license(mut self, include_license: bool) -> Self {
        self.include_license = include_license;
        self
    }

    /// Only read the live state and log the planned changes.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs all passes, see the [module documentation](self).
    pub fn restore(&self, snapshot: &Snapshot) -> Result<(), RestoreError> {
        log::info!(target: "restore", "Restoring backup created at {}", snapshot.created());
        if self.dry_run {
            log::warn!(target: "restore", "Running in dry-run mode");
        }

        let mut passes = Vec::with_capacity(5);
        if self.include_license {
            passes.push(Pass::License);
        }
        passes.extend([Pass::Users, Pass::Schemas, Pass::Datasources, Pass::Repository]);

        let mut failures = Vec::new();
        for pass in passes {
            let result = match pass {
                Pass::License => self.restore_license(snapshot),
                Pass::Users => self.restore_users(snapshot),
                Pass::Schemas => self.restore_schemas(snapshot),
                Pass::Datasources => self.restore_datasources(snapshot),
                Pass::Repository => self.restore_repository(snapshot),
            };
            if let Err(e) = result {
                log::error!(target: "restore", "Restoring {pass} failed: {e}");
                failures.push((pass, e));
            }
        }

        if failures.is_empty() {
            log::info!(target: "restore", "Finished restore");
            Ok(())
        } else {
            Err(RestoreError { failures })
        }
    }

    /// Uploads the snapshot's license. An existing license is never removed.
    pub fn restore_license(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        let Some(license) = snapshot.license() else {
            log::info!(target: "restore::license", "Backup contains no license");
            return Ok(());
        };

        log::info!(target: "restore::license", "Store license {}", license.path);
        if !self.dry_run {
            self.client.store_license(license)?;
        }
        Ok(())
    }

    pub fn restore_users(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        let existing = self.client.list_users()?;
        let operations = Operations {
            create: C::create_user,
            update: C::update_user_password,
            delete: C::delete_user,
        };
        self.reconcile("restore::users", existing, snapshot.users(), operations)
    }

    pub fn restore_schemas(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        let existing = self.client.list_schemas(false)?;
        let operations = Operations {
            create: C::create_schema,
            update: C::update_schema,
            delete: C::delete_schema,
        };
        self.reconcile("restore::schemas", existing, snapshot.schemas(), operations)
    }

    pub fn restore_datasources(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        let existing = self.client.list_datasources()?;
        let operations = Operations {
            create: C::create_datasource,
            update: C::update_datasource,
            delete: C::delete_datasource,
        };
        self.reconcile("restore::datasources", existing, snapshot.datasources(), operations)
    }

    fn reconcile<T: Keyed<Key = String>>(
        &self,
        target: &str,
        existing: Vec<T>,
        desired: &BTreeMap<String, T>,
        operations: Operations<C, T>,
    ) -> Result<(), ClientError> {
        let existing: BTreeMap<String, T> = existing
            .into_iter()
            .map(|entity| (entity.key().clone(), entity))
            .collect();

        let changes = plan(&existing, desired);
        log::info!(target: target, "Applying {} changes", changes.len());
        for change in changes {
            log::debug!(target: target, "{} {}", change.action(), change.entity().key());
            if self.dry_run {
                continue;
            }
            match change {
                Change::Create(entity) => (operations.create)(self.client, entity)?,
                Change::Update(entity) => (operations.update)(self.client, entity)?,
                Change::Delete(entity) => (operations.delete)(self.client, entity)?,
            }
        }
        Ok(())
    }

    /// Restores the `/homes` folder and the ACLs of its nodes.
    pub fn restore_repository(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        let repository = self.client.get_tree(false)?;
        let live = walk::find_homes(&repository);
        if live.is_none() {
            log::warn!(target: "restore::repository", "No {} folder on server", walk::HOMES_PATH);
        }

        let changes = plan_repository(snapshot.homes(), snapshot.acls(), live);
        log::info!(target: "restore::repository", "Applying {} changes", changes.len());
        for change in changes {
            match change {
                RepoChange::Store(node) => {
                    log::debug!(target: "restore::repository", "store {}", node.path());
                    if !self.dry_run {
                        self.client.store_resource(node)?;
                    }
                }
                RepoChange::SetAcl(path, acl) => {
                    log::debug!(target: "restore::repository", "set acl {path}");
                    if !self.dry_run {
                        self.client.set_acl(path, acl)?;
                    }
                }
                RepoChange::Delete(node) => {
                    log::debug!(target: "restore::repository", "delete {}", node.path());
                    if !self.dry_run {
                        self.client.delete_resource(node)?;
                    }
                }
            }
        }
        Ok(())
    }
}
