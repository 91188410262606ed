//! # memverse-upload: file intake for the memory universe
//!
//! A small REST service that accepts multipart uploads, writes the bytes to
//! a blob directory and records metadata in SQLite.
//!
//! ## Modules
//!
//! - `config`: layered settings (defaults, TOML file, `MEMVERSE_*` env)
//! - `error`: `UploadError` and its HTTP mapping
//! - `store`: SQLite metadata (`uploads` table)
//! - `blobs`: on-disk blob directory
//! - `routes`: axum router and handlers

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blobs;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use config::UploadConfig;
pub use error::UploadError;
pub use routes::{AppState, router};
pub use store::{UploadRecord, UploadStore};
