//! Library to backup and restore the configuration of a [Saiku][saiku] server.
//!
//! A backup captures users, schemas, datasources, the `/homes` repository
//! folder with the ACLs of its nodes and optionally the license into one
//! [`Snapshot`](snapshot::Snapshot). A restore reconciles a live server with
//! a snapshot, see the [`restore`] module.
//!
//! [saiku]: https://github.com/OSBI/saiku

#![forbid(unsafe_code)]

pub mod backup;
pub mod cli;
pub mod client;
pub mod config;
pub mod entity;
pub mod restore;
pub mod snapshot;
pub mod walk;
