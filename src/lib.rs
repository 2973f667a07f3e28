//! # Tasklane
//!
//! A self-hostable task server: namespaces, lists, kanban buckets and tasks,
//! shared with users, teams or public links, and readable by calendar
//! clients over CalDAV. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! tasklane = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tasklane::config::ServerConfig;
//! use tasklane::server::{AppState, create_router};
//! use tasklane::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config, "link-share-secret"));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `tasklane` binary. Disable with `default-features = false`.

pub mod access;
pub mod auth;
pub mod caldav;
pub mod config;
pub mod error;
pub mod events;
pub mod files;
pub mod migration;
pub mod server;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
