//! Capturing a [Snapshot] of a live server.

use crate::client::{Client, ClientError};
use crate::snapshot::Snapshot;
use crate::walk;

/// Reads the state of a server into a [Snapshot].
///
/// Only read calls are issued. Any failing call aborts the capture.
pub struct Capture<'c, C> {
    client: &'c C,
    include_license: bool,
}

impl<'c, C: Client> Capture<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            include_license: false,
        }
    }

    /// Also capture the server's license file.
    pub fn include_license(mut self, include_license: bool) -> Self {
        self.include_license = include_license;
        self
    }

    pub fn capture(&self) -> Result<Snapshot, ClientError> {
        let mut snapshot = Snapshot::new();
        log::info!(target: "backup", "Capturing backup at {}", snapshot.created());

        let repository = self.client.get_tree(true)?;

        if self.include_license {
            let license = walk::find_license(&repository);
            match license {
                Some(license) => {
                    log::debug!(target: "backup::license", "Found license {}", license.path)
                }
                None => {
                    log::warn!(target: "backup::license", "No license file found in repository")
                }
            }
            snapshot.set_license(license.cloned());
        }

        match walk::find_homes(&repository) {
            Some(homes) => {
                if let Some(acl) = self.client.get_acl(&homes.path)? {
                    snapshot.add_acl(homes.path.clone(), acl);
                }
                for acl in walk::collect_acls(homes, |path| self.client.get_acl(path)) {
                    let (path, acl) = acl?;
                    snapshot.add_acl(path, acl);
                }
                log::info!(
                    target: "backup::repository",
                    "Captured {} nodes below {} with {} ACLs",
                    walk::flatten(homes).count(),
                    homes.path,
                    snapshot.acls().len()
                );
                snapshot.set_homes(homes.clone());
            }
            None => log::warn!(
                target: "backup::repository",
                "No {} folder in repository",
                walk::HOMES_PATH
            ),
        }

        for user in self.client.list_users()? {
            snapshot.add_user(user);
        }
        log::info!(target: "backup::users", "Captured {} users", snapshot.users().len());

        for schema in self.client.list_schemas(true)? {
            snapshot.add_schema(schema);
        }
        log::info!(target: "backup::schemas", "Captured {} schemas", snapshot.schemas().len());

        for datasource in self.client.list_datasources()? {
            snapshot.add_datasource(datasource);
        }
        log::info!(
            target: "backup::datasources",
            "Captured {} datasources",
            snapshot.datasources().len()
        );

        Ok(snapshot)
    }
}
