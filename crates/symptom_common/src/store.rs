//! SQLite-backed query store.
//!
//! Append-only persistence of each request/result pair. The daemon holds
//! one store behind an `Arc` and handlers call it concurrently, so the
//! connection sits behind a mutex to serialize writes.
//!
//! Schema:
//! - queries: symptoms, age, gender, conditions (JSON), recommendations
//!   (JSON), created_at

use crate::types::{AnalysisRequest, AnalysisResult, QueryRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Default database path (next to the daemon's working directory)
pub const DEFAULT_DB_PATH: &str = "symptom_checker.db";

/// Upper bound applied to history reads
pub const MAX_HISTORY_LIMIT: usize = 100;

/// SQLite-backed store of past analyses
pub struct QueryStore {
    conn: Mutex<Connection>,
}

impl QueryStore {
    /// Open or create the store at `path`, initializing the schema.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening query store at {}", path.as_ref().display()))?;

        // WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symptoms TEXT NOT NULL,
                age INTEGER,
                gender TEXT,
                conditions TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_queries_created_at ON queries(created_at);
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an existing store read-only (CLI inspection; writes fail).
    /// Returns None if the file does not exist or cannot be opened.
    pub fn open_readonly<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return None;
        }
        let conn =
            Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY).ok()?;
        Some(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store (tests and `doctor` probes)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS queries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symptoms TEXT NOT NULL,
                age INTEGER,
                gender TEXT,
                conditions TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append one request/result pair, returning the assigned row id.
    ///
    /// Lists are stored as JSON-encoded text columns.
    pub fn save(&self, request: &AnalysisRequest, result: &AnalysisResult) -> Result<i64> {
        let conditions = serde_json::to_string(&result.conditions)?;
        let recommendations = serde_json::to_string(&result.recommendations)?;
        let created_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock().expect("query store mutex poisoned");
        conn.execute(
            "INSERT INTO queries (symptoms, age, gender, conditions, recommendations, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &request.symptoms,
                request.age,
                request.gender.as_deref(),
                conditions,
                recommendations,
                created_at,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Read back the most recent records, newest first.
    ///
    /// `limit` is clamped to 1..=[`MAX_HISTORY_LIMIT`].
    pub fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>> {
        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);

        let conn = self.conn.lock().expect("query store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, symptoms, age, gender, conditions, recommendations, created_at
             FROM queries
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<u32>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, symptoms, age, gender, conditions, recommendations, created_at) = row?;
            records.push(QueryRecord {
                id,
                symptoms,
                age,
                gender,
                conditions: serde_json::from_str(&conditions)
                    .with_context(|| format!("decoding conditions for query {}", id))?,
                recommendations: serde_json::from_str(&recommendations)
                    .with_context(|| format!("decoding recommendations for query {}", id))?,
                created_at: created_at
                    .parse::<DateTime<Utc>>()
                    .with_context(|| format!("decoding timestamp for query {}", id))?,
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_store() -> QueryStore {
        let tmp = NamedTempFile::new().unwrap();
        QueryStore::open_at(tmp.path()).unwrap()
    }

    fn request(symptoms: &str) -> AnalysisRequest {
        AnalysisRequest {
            symptoms: symptoms.to_string(),
            age: Some(30),
            gender: Some("female".to_string()),
        }
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            conditions: vec!["Common cold".to_string(), "Allergies".to_string()],
            recommendations: vec!["Rest".to_string()],
        }
    }

    #[test]
    fn test_save_and_read_back() {
        let store = test_store();
        let id = store.save(&request("headache"), &result()).unwrap();
        assert!(id > 0);

        let records = store.recent(10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].symptoms, "headache");
        assert_eq!(records[0].age, Some(30));
        assert_eq!(records[0].gender.as_deref(), Some("female"));
        assert_eq!(records[0].conditions, result().conditions);
        assert_eq!(records[0].recommendations, result().recommendations);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let store = test_store();
        for i in 0..5 {
            store.save(&request(&format!("symptom {}", i)), &result()).unwrap();
        }

        let records = store.recent(5).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].symptoms, "symptom 4");
        assert_eq!(records[4].symptoms, "symptom 0");
        assert!(records.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn test_recent_respects_limit() {
        let store = test_store();
        for i in 0..10 {
            store.save(&request(&format!("symptom {}", i)), &result()).unwrap();
        }

        assert_eq!(store.recent(3).unwrap().len(), 3);
        // Zero is clamped up rather than returning nothing
        assert_eq!(store.recent(0).unwrap().len(), 1);
    }

    #[test]
    fn test_in_memory_store() {
        let store = QueryStore::open_in_memory().unwrap();
        store.save(&request("cough"), &result()).unwrap();
        assert_eq!(store.recent(10).unwrap().len(), 1);
    }
}
