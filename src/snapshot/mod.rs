//! A complete, portable capture of a Saiku server's configuration.
//!
//! The [Snapshot] is stored as a single JSON document:
//!
//! ```json
//! {
//!   "created": "2019-02-02T14:35:20+00:00",
//!   "license": null,
//!   "homes": { "type": "FOLDER", "path": "/homes", "repoObjects": [] },
//!   "acls": { "/homes/home:admin": { "type": "PRIVATE", "owner": "admin" } },
//!   "users": [],
//!   "schemas": [],
//!   "datasources": []
//! }
//! ```
//!
//! Only `created` is required, every other field defaults to empty.
//! Files ending in `.gz` are transparently (de-)compressed.

mod document;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File as FsFile;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use derive_more::{Display, Error, From};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::entity::{Acl, Datasource, File, Folder, Keyed, Node, Schema, User};
use crate::walk::HOMES_PATH;
use document::{Document, DocumentRef};

#[derive(Debug, Display, Error, From)]
/// Errors on loading or storing a [Snapshot].
pub enum SnapshotError {
    /// The `created` timestamp is missing or not RFC 3339.
    #[display("Malformed backup: cannot parse created date {_0:?}")]
    MalformedCreated(#[error(ignore)] String),
    /// The `homes` node isn't a folder.
    #[display("Malformed backup: homes is not a folder")]
    HomesNotAFolder,
    /// The document isn't structurally valid.
    #[display("Malformed backup: {_0}")]
    #[from]
    Json(serde_json::Error),
    /// Reading or writing the snapshot file failed.
    #[display("Accessing the backup file failed: {_0}")]
    #[from]
    Io(io::Error),
}

/// Backup of users, schemas, datasources, home folders and their ACLs.
///
/// All collections are keyed by the natural key of their entities, adding
/// an entity with a key already present replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    created: DateTime<FixedOffset>,
    license: Option<File>,
    homes: Folder,
    acls: BTreeMap<String, Acl>,
    users: BTreeMap<String, User>,
    schemas: BTreeMap<String, Schema>,
    datasources: BTreeMap<String, Datasource>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Creates an empty snapshot taken now.
    pub fn new() -> Self {
        Self::created_at(Utc::now().fixed_offset())
    }

    fn created_at(created: DateTime<FixedOffset>) -> Self {
        Self {
            created,
            license: None,
            homes: Folder::new(HOMES_PATH),
            acls: BTreeMap::new(),
            users: BTreeMap::new(),
            schemas: BTreeMap::new(),
            datasources: BTreeMap::new(),
        }
    }

    /// Loads a snapshot from its serialized JSON document.
    pub fn parse(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Self::try_from(serde_json::from_slice::<Document>(bytes)?)
    }

    /// Loads a snapshot from an already parsed JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        Self::try_from(serde_json::from_value::<Document>(value)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, SnapshotError> {
        Ok(serde_json::to_value(DocumentRef::from(self))?)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, SnapshotError> {
        let document = DocumentRef::from(self);
        let json = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(json)
    }

    /// Reads a snapshot from `path`.
    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let mut file = BufReader::new(FsFile::open(path)?);
        let mut bytes = Vec::new();
        if is_compressed(path) {
            GzDecoder::new(file).read_to_end(&mut bytes)?;
        } else {
            file.read_to_end(&mut bytes)?;
        }
        log::debug!(target: "snapshot", "Read {} bytes from {}", bytes.len(), path.display());

        Self::parse(&bytes)
    }

    /// Writes the snapshot to `path`, replacing an existing file.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<(), SnapshotError> {
        let json = self.to_json(pretty)?;
        let mut file = BufWriter::new(FsFile::create(path)?);
        if is_compressed(path) {
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?.flush()?;
        } else {
            file.write_all(json.as_bytes())?;
            file.flush()?;
        }
        log::debug!(target: "snapshot", "Wrote backup to {}", path.display());

        Ok(())
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Compact JSON, as written by [`to_json(false)`](Snapshot::to_json).
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(false).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for Snapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

impl TryFrom<Document> for Snapshot {
    type Error = SnapshotError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let created = match document.created {
            Some(serde_json::Value::String(created)) => DateTime::parse_from_rfc3339(&created)
                .map_err(|_| SnapshotError::MalformedCreated(created))?,
            other => {
                let created = other.map(|v| v.to_string()).unwrap_or_default();
                return Err(SnapshotError::MalformedCreated(created));
            }
        };

        let mut snapshot = Self::created_at(created);
        snapshot.license = document.license;
        match document.homes {
            Some(Node::Folder(homes)) => snapshot.homes = homes,
            Some(Node::File(_)) => return Err(SnapshotError::HomesNotAFolder),
            None => {}
        }
        for (path, acl) in document.acls {
            snapshot.add_acl(path, acl);
        }
        for user in document.users {
            snapshot.add_user(user);
        }
        for schema in document.schemas {
            snapshot.add_schema(schema);
        }
        for datasource in document.datasources {
            snapshot.add_datasource(datasource);
        }

        Ok(snapshot)
    }
}

fn insert_keyed<T: Keyed<Key = String>>(map: &mut BTreeMap<String, T>, entity: T) {
    let key = entity.key().clone();
    if map.insert(key, entity).is_some() {
        log::debug!(target: "snapshot", "Replaced entry with duplicate key");
    }
}

// accessors
impl Snapshot {
    pub fn created(&self) -> &DateTime<FixedOffset> {
        &self.created
    }

    pub fn license(&self) -> Option<&File> {
        self.license.as_ref()
    }

    pub fn set_license(&mut self, license: Option<File>) -> &mut Self {
        self.license = license;
        self
    }

    /// Root of the backed up repository subtree, the `/homes` folder.
    pub fn homes(&self) -> &Folder {
        &self.homes
    }

    pub fn set_homes(&mut self, homes: Folder) -> &mut Self {
        self.homes = homes;
        self
    }

    pub fn acl(&self, path: &str) -> Option<&Acl> {
        self.acls.get(path)
    }

    pub fn acls(&self) -> &BTreeMap<String, Acl> {
        &self.acls
    }

    pub fn add_acl(&mut self, path: impl Into<String>, acl: Acl) {
        self.acls.insert(path.into(), acl);
    }

    pub fn users(&self) -> &BTreeMap<String, User> {
        &self.users
    }

    pub fn add_user(&mut self, user: User) {
        insert_keyed(&mut self.users, user);
    }

    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    pub fn add_schema(&mut self, schema: Schema) {
        insert_keyed(&mut self.schemas, schema);
    }

    pub fn datasources(&self) -> &BTreeMap<String, Datasource> {
        &self.datasources
    }

    pub fn add_datasource(&mut self, datasource: Datasource) {
        insert_keyed(&mut self.datasources, datasource);
    }
}
