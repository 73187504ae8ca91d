//! [Client] implementation using the REST API of a Saiku server.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{Client, ClientError};
use crate::entity::{Acl, Datasource, File, Folder, Node, Schema, User};

const DEFAULT_URL: &str = "http://localhost:8080/saiku";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings of a Saiku server.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SaikuConfig {
    /// Base URL of the Saiku web application.
    #[serde(default = "default_url")]
    pub url: String,

    /// Administrative account used for all requests.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password of [`username`](Self::username).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Timeout of a single request in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SaikuConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: default_username(),
            password: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// A logged in session with a Saiku server.
#[derive(Debug, Clone)]
pub struct Saiku {
    http: reqwest::blocking::Client,
    base: Url,
}

impl Saiku {
    /// Opens a session with the server described by `config`.
    pub fn login(config: &SaikuConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.url.clone()));
        }

        let http = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let saiku = Self { http, base };

        log::info!(target: "client::saiku", "Logging in to {} as {}", saiku.base, config.username);
        let password = config.password.as_deref().unwrap_or_default();
        let request = saiku
            .http
            .post(saiku.endpoint(&["session"]))
            .form(&[("username", config.username.as_str()), ("password", password)]);
        saiku.send("login", request)?;

        Ok(saiku)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // checked on login: the base URL can be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["rest", "saiku"]).extend(segments);
        }
        url
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        log::trace!(target: "client::saiku", "Request: {operation}");
        let response = request.send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().unwrap_or_default();
        log::debug!(target: "client::saiku", "{operation} failed with {status}: {message}");
        Err(ClientError::Rejected {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    fn fetch<T: DeserializeOwned>(&self, operation: &str, url: Url) -> Result<T, ClientError> {
        let body = self.send(operation, self.http.get(url))?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn attach_content(&self, folder: &mut Folder) -> Result<(), ClientError> {
        for node in &mut folder.repo_objects {
            match node {
                Node::File(file) => file.set_raw_content(self.get_resource(&file.path)?),
                Node::Folder(folder) => self.attach_content(folder)?,
            }
        }
        Ok(())
    }

    fn schema_form(schema: &Schema) -> Form {
        let xml = schema.xml.clone().unwrap_or_default();
        Form::new()
            .text("name", schema.name.clone())
            .part("file", Part::text(xml).file_name(schema.name.clone()))
    }
}

impl Client for Saiku {
    fn get_tree(&self, recursive: bool) -> Result<Folder, ClientError> {
        let url = self.endpoint(&["api", "repository"]);
        let objects: Vec<Node> = self.fetch("list repository", url)?;
        let mut root = Folder::new("");
        root.repo_objects = objects;
        if recursive {
            self.attach_content(&mut root)?;
        }
        Ok(root)
    }

    fn get_resource(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(&["api", "repository", "resource"]);
        let request = self.http.get(url).query(&[("file", path)]);
        Ok(self.send(&format!("get resource {path}"), request)?.bytes()?.to_vec())
    }

    fn store_resource(&self, node: &Node) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "repository", "resource"]);
        let request = match node {
            Node::File(file) => {
                // the endpoint only takes text content
                let content = String::from_utf8(file.raw_content()?)?;
                let form = [("file", file.path.as_str()), ("content", content.as_str())];
                self.http.post(url).form(&form)
            }
            Node::Folder(folder) => self.http.post(url).form(&[("file", folder.path.as_str())]),
        };
        self.send(&format!("store resource {}", node.path()), request)?;
        Ok(())
    }

    fn delete_resource(&self, node: &Node) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "repository", "resource"]);
        let request = self.http.delete(url).query(&[("file", node.path())]);
        self.send(&format!("delete resource {}", node.path()), request)?;
        Ok(())
    }

    fn get_acl(&self, path: &str) -> Result<Option<Acl>, ClientError> {
        let url = self.endpoint(&["api", "repository", "resource", "acl"]);
        let request = self.http.get(url).query(&[("file", path)]);
        let response = match self.send(&format!("get acl {path}"), request) {
            Err(ClientError::Rejected { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                return Ok(None);
            }
            response => response?,
        };

        let body = response.text()?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    fn set_acl(&self, path: &str, acl: &Acl) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "repository", "resource", "acl"]);
        let acl = serde_json::to_string(acl)?;
        let request = self.http.post(url).form(&[("file", path), ("acl", acl.as_str())]);
        self.send(&format!("set acl {path}"), request)?;
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.fetch("list users", self.endpoint(&["admin", "users"]))
    }

    fn create_user(&self, user: &User) -> Result<(), ClientError> {
        let request = self.http.post(self.endpoint(&["admin", "users"])).json(user);
        self.send(&format!("create user {}", user.username), request)?;
        Ok(())
    }

    fn update_user_password(&self, user: &User) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "users", user.username.as_str()]);
        let request = self.http.put(url).json(user);
        self.send(&format!("update password of user {}", user.username), request)?;
        Ok(())
    }

    fn delete_user(&self, user: &User) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "users", user.username.as_str()]);
        self.send(&format!("delete user {}", user.username), self.http.delete(url))?;
        Ok(())
    }

    fn list_schemas(&self, with_xml: bool) -> Result<Vec<Schema>, ClientError> {
        let url = self.endpoint(&["admin", "schema"]);
        let mut schemas: Vec<Schema> = self.fetch("list schemas", url)?;
        if with_xml {
            for schema in &mut schemas {
                schema.xml = Some(String::from_utf8(self.get_resource(&schema.path)?)?);
            }
        }
        Ok(schemas)
    }

    fn create_schema(&self, schema: &Schema) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "schema", schema.name.as_str()]);
        let request = self.http.post(url).multipart(Self::schema_form(schema));
        self.send(&format!("create schema {}", schema.name), request)?;
        Ok(())
    }

    fn update_schema(&self, schema: &Schema) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "schema", schema.name.as_str()]);
        let request = self.http.put(url).multipart(Self::schema_form(schema));
        self.send(&format!("update schema {}", schema.name), request)?;
        Ok(())
    }

    fn delete_schema(&self, schema: &Schema) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "schema", schema.name.as_str()]);
        self.send(&format!("delete schema {}", schema.name), self.http.delete(url))?;
        Ok(())
    }

    fn list_datasources(&self) -> Result<Vec<Datasource>, ClientError> {
        self.fetch("list datasources", self.endpoint(&["admin", "datasources"]))
    }

    fn create_datasource(&self, datasource: &Datasource) -> Result<(), ClientError> {
        let request = self.http.post(self.endpoint(&["admin", "datasources"])).json(datasource);
        self.send(&format!("create datasource {}", datasource.id), request)?;
        Ok(())
    }

    fn update_datasource(&self, datasource: &Datasource) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "datasources", datasource.id.as_str()]);
        let request = self.http.put(url).json(datasource);
        self.send(&format!("update datasource {}", datasource.id), request)?;
        Ok(())
    }

    fn delete_datasource(&self, datasource: &Datasource) -> Result<(), ClientError> {
        let url = self.endpoint(&["admin", "datasources", datasource.id.as_str()]);
        self.send(&format!("delete datasource {}", datasource.id), self.http.delete(url))?;
        Ok(())
    }

    fn store_license(&self, license: &File) -> Result<(), ClientError> {
        let content = license.raw_content()?;
        let request = self
            .http
            .post(self.endpoint(&["api", "license"]))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content);
        self.send("store license", request)?;
        Ok(())
    }
}
