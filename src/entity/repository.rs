//! Nodes of the Saiku repository and the ACLs attached to them.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

/// File type of the Saiku license file.
pub const LICENSE_FILE_TYPE: &str = "lic";

/// A node of the repository tree.
///
/// Folders exclusively own their children, so every node lives at exactly
/// one absolute [`path`](Node::path).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "FILE")]
    File(File),
    #[serde(rename = "FOLDER")]
    Folder(Folder),
}

impl Node {
    pub fn path(&self) -> &str {
        match self {
            Node::File(file) => &file.path,
            Node::Folder(folder) => &folder.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Folder(folder) => &folder.name,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Node::File(file)
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Node::Folder(folder)
    }
}

/// Borrowed [Node] for serializing a lone [Folder] with its type tag.
#[derive(serde::Serialize)]
#[serde(tag = "type")]
pub(crate) enum NodeRef<'a> {
    #[serde(rename = "FOLDER")]
    Folder(&'a Folder),
}

/// A leaf of the repository tree.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct File {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub path: String,
    #[serde(default, rename = "fileType", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Encoding of [`content`](Self::content), plain text if unset.
    #[serde(default, rename = "contentEncoding", skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<ContentEncoding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Encoding of binary [File] content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    Base64,
}

impl File {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: basename(&path).to_string(),
            file_type: extension(&path).map(str::to_string),
            path,
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self.content_encoding = None;
        self
    }

    /// Sets the content from the raw bytes of the resource.
    ///
    /// Content that isn't UTF-8 is kept as base64.
    pub fn set_raw_content(&mut self, bytes: Vec<u8>) {
        match String::from_utf8(bytes) {
            Ok(text) => {
                self.content = Some(text);
                self.content_encoding = None;
            }
            Err(e) => {
                self.content = Some(BASE64_STANDARD.encode(e.into_bytes()));
                self.content_encoding = Some(ContentEncoding::Base64);
            }
        }
    }

    /// Returns the raw bytes of the content, empty if there is none.
    pub fn raw_content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let content = self.content.as_deref().unwrap_or_default();
        match self.content_encoding {
            Some(ContentEncoding::Base64) => BASE64_STANDARD.decode(content),
            None => Ok(content.as_bytes().to_vec()),
        }
    }

    /// Returns if this is the server's license file.
    pub fn is_license(&self) -> bool {
        self.file_type.as_deref() == Some(LICENSE_FILE_TYPE)
    }
}

/// An inner node of the repository tree.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Folder {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub path: String,
    #[serde(default, rename = "repoObjects")]
    pub repo_objects: Vec<Node>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: basename(&path).to_string(),
            path,
            ..Default::default()
        }
    }

    /// Appends `node` to the children of the folder.
    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.repo_objects.push(node.into());
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.repo_objects
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<&str> {
    basename(path).rsplit_once('.').map(|(_, ext)| ext)
}

/// Access-control list of a repository path.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Acl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: AclType,
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<Permission>>,
    #[serde(default)]
    pub users: BTreeMap<String, Vec<Permission>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Acl {
    pub fn new(kind: AclType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Visibility of a repository path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AclType {
    #[default]
    Public,
    Secured,
    Private,
}

/// Permission granted by an [Acl] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    None,
    Read,
    Write,
    Grant,
}
