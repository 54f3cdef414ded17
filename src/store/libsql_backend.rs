//! libSQL backend — async `LeadStore` implementation.
//!
//! Supports local file and in-memory databases. One row per completed lead,
//! column order matching the tabular export:
//! name, industry, budget, service, email, country, phone, lead_score,
//! timestamp.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;
use uuid::Uuid;

use crate::error::StorageError;
use crate::lead::Lead;
use crate::store::LeadStore;

/// libSQL lead store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Lead database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS leads (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    industry TEXT NOT NULL,
                    budget TEXT NOT NULL,
                    service TEXT NOT NULL,
                    email TEXT NOT NULL,
                    country TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    lead_score INTEGER NOT NULL,
                    timestamp TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StorageError::Query(format!("Failed to create leads table: {e}")))?;
        Ok(())
    }
}

/// Parse the stored timestamp back into a `DateTime<Utc>`.
///
/// Rows are written in `%Y-%m-%d %H:%M:%S`; RFC 3339 is accepted for rows
/// imported from elsewhere.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    DateTime::<Utc>::MIN_UTC
}

#[async_trait]
impl LeadStore for LibSqlBackend {
    async fn append(&self, lead: &Lead) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO leads
                 (id, name, industry, budget, service, email, country, phone, lead_score, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    Uuid::new_v4().to_string(),
                    lead.name.clone(),
                    lead.industry.clone(),
                    lead.budget.clone(),
                    lead.service.clone(),
                    lead.email.clone(),
                    lead.country.clone(),
                    lead.phone.clone(),
                    lead.lead_score as i64,
                    lead.timestamp_str(),
                ],
            )
            .await
            .map_err(|e| StorageError::Query(format!("Failed to insert lead: {e}")))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Lead>, StorageError> {
        let mut rows = self
            .conn
            .query(
                "SELECT name, industry, budget, service, email, country, phone,
                        lead_score, timestamp
                 FROM leads ORDER BY rowid",
                (),
            )
            .await
            .map_err(|e| StorageError::Query(format!("Failed to query leads: {e}")))?;

        let mut leads = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StorageError::Query(format!("Failed to read lead row: {e}")))?
        {
            let get_text = |idx: i32| -> Result<String, StorageError> {
                row.get::<String>(idx)
                    .map_err(|e| StorageError::Query(format!("Bad column {idx}: {e}")))
            };
            let score = row
                .get::<i64>(7)
                .map_err(|e| StorageError::Query(format!("Bad lead_score column: {e}")))?;
            leads.push(Lead {
                name: get_text(0)?,
                industry: get_text(1)?,
                budget: get_text(2)?,
                service: get_text(3)?,
                email: get_text(4)?,
                country: get_text(5)?,
                phone: get_text(6)?,
                lead_score: score.clamp(0, i64::from(u32::MAX)) as u32,
                timestamp: parse_timestamp(&get_text(8)?),
            });
        }
        Ok(leads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_lead(name: &str, score: u32) -> Lead {
        Lead {
            name: name.into(),
            industry: "tech".into(),
            budget: "120000".into(),
            service: "Website".into(),
            email: format!("{}@example.com", name.to_lowercase()),
            country: "US".into(),
            phone: "+14155552671".into(),
            lead_score: score,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_and_list_roundtrip() {
        let store = LibSqlBackend::new_memory().await.unwrap();
        store.append(&make_lead("Alex", 100)).await.unwrap();

        let leads = store.list().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Alex");
        assert_eq!(leads[0].lead_score, 100);
        assert_eq!(leads[0].email, "alex@example.com");
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = LibSqlBackend::new_memory().await.unwrap();
        for (name, score) in [("First", 10), ("Second", 60), ("Third", 100)] {
            store.append(&make_lead(name, score)).await.unwrap();
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = LibSqlBackend::new_memory().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.db");

        {
            let store = LibSqlBackend::new_local(&path).await.unwrap();
            store.append(&make_lead("Alex", 85)).await.unwrap();
        }

        let store = LibSqlBackend::new_local(&path).await.unwrap();
        let leads = store.list().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].lead_score, 85);
    }

    #[test]
    fn timestamp_roundtrips_through_storage_format() {
        let now = Utc::now();
        let formatted = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let parsed = parse_timestamp(&formatted);
        assert_eq!(parsed.timestamp(), now.timestamp());
    }
}
