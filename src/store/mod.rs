//! Durable lead storage.

pub mod libsql_backend;

pub use libsql_backend::LibSqlBackend;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::lead::Lead;

/// Tabular lead storage: append-only rows plus a full listing.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Append one completed lead as a row.
    async fn append(&self, lead: &Lead) -> Result<(), StorageError>;

    /// All previously persisted leads, oldest first.
    async fn list(&self) -> Result<Vec<Lead>, StorageError>;
}
