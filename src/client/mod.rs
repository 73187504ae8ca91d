//! Access to a live Saiku server.
//!
//! [Capture](crate::backup::Capture) and [Restore](crate::restore::Restore)
//! only talk to the server through the [Client] trait. [Saiku] implements it
//! on top of the server's REST API.

pub mod saiku;

use derive_more::{Display, Error, From};

use crate::entity::{Acl, Datasource, File, Folder, Node, Schema, User};

pub use saiku::{Saiku, SaikuConfig};

#[derive(Debug, Display, Error, From)]
/// Errors of a [Client] call.
pub enum ClientError {
    /// The request couldn't be performed.
    #[display("Request to the Saiku server failed: {_0}")]
    #[from]
    Transport(reqwest::Error),
    /// The server refused the operation.
    #[display("Saiku server rejected {operation} ({status}): {message}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },
    /// The response body isn't understood.
    #[display("Unexpected response from the Saiku server: {_0}")]
    #[from]
    Decode(serde_json::Error),
    /// Text was expected but the content isn't UTF-8.
    #[display("Content is not valid UTF-8: {_0}")]
    #[from]
    NotUtf8(std::string::FromUtf8Error),
    /// Base64 encoded file content can't be decoded.
    #[display("File content is not valid base64: {_0}")]
    #[from]
    Content(base64::DecodeError),
    /// The configured server URL can't be used.
    #[display("Invalid Saiku server URL: {_0}")]
    InvalidUrl(#[error(ignore)] String),
}

/// Operations a Saiku server offers, grouped by entity.
///
/// No call is retried, failures are returned to the caller as is.
pub trait Client {
    /// Fetches the repository tree below `/`.
    ///
    /// With `recursive` every folder is expanded and the content of every
    /// file is attached.
    fn get_tree(&self, recursive: bool) -> Result<Folder, ClientError>;
    /// Fetches the raw content of the resource at `path`.
    fn get_resource(&self, path: &str) -> Result<Vec<u8>, ClientError>;
    /// Creates a folder or stores a file, overwriting an existing file.
    fn store_resource(&self, node: &Node) -> Result<(), ClientError>;
    fn delete_resource(&self, node: &Node) -> Result<(), ClientError>;
    fn get_acl(&self, path: &str) -> Result<Option<Acl>, ClientError>;
    fn set_acl(&self, path: &str, acl: &Acl) -> Result<(), ClientError>;

    fn list_users(&self) -> Result<Vec<User>, ClientError>;
    fn create_user(&self, user: &User) -> Result<(), ClientError>;
    /// Updates the credentials of an existing user, not the whole profile.
    fn update_user_password(&self, user: &User) -> Result<(), ClientError>;
    fn delete_user(&self, user: &User) -> Result<(), ClientError>;

    /// Lists all schemas, with `with_xml` their definition is attached.
    fn list_schemas(&self, with_xml: bool) -> Result<Vec<Schema>, ClientError>;
    fn create_schema(&self, schema: &Schema) -> Result<(), ClientError>;
    fn update_schema(&self, schema: &Schema) -> Result<(), ClientError>;
    fn delete_schema(&self, schema: &Schema) -> Result<(), ClientError>;

    fn list_datasources(&self) -> Result<Vec<Datasource>, ClientError>;
    fn create_datasource(&self, datasource: &Datasource) -> Result<(), ClientError>;
    fn update_datasource(&self, datasource: &Datasource) -> Result<(), ClientError>;
    fn delete_datasource(&self, datasource: &Datasource) -> Result<(), ClientError>;

    fn store_license(&self, license: &File) -> Result<(), ClientError>;
}
