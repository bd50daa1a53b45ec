//! # nyoworks-core
//!
//! Project state for NYOWORKS projects: a task catalog, phase, feature and
//! decision stores, and exclusive time-bounded task leases that let several
//! agents coordinate on who works on which task.

pub mod catalog;
pub mod client;
pub mod clock;
pub mod docs;
pub mod error;
pub mod infrastructure;
#[path = "infrastructure_in_memory.rs"]
pub mod infrastructure_in_memory;
#[path = "infrastructure_json.rs"]
pub mod infrastructure_json;
#[cfg(feature = "sqlite")]
#[path = "infrastructure_sqlite.rs"]
pub mod infrastructure_sqlite;
pub mod lock;
pub mod state;
pub mod types;

pub use client::ProjectClient;
pub use error::{NyoError, StorageError};

#[cfg(test)]
mod catalog_test;
#[cfg(test)]
mod client_test;
