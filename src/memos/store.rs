//! Memo persistence
//!
//! `MemoStore` is the seam between the memo service and durable storage.
//! `SqliteMemoStore` keeps memos and their cached summaries in two tables:
//!
//! ```text
//! memos(id, title, content, category, tags JSON, created_at, updated_at)
//! memo_summaries(memo_id UNIQUE -> memos.id ON DELETE CASCADE, summary, ...)
//! ```
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision, so `ORDER BY created_at` is chronological.

use crate::error::{Error, Result};
use crate::memos::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Mutex, MutexGuard};

/// Durable storage for memos and summaries
#[async_trait]
pub trait MemoStore: Send + Sync {
    /// Memos matching the filter, newest `created_at` first
    async fn list(&self, filter: &MemoFilter) -> Result<Vec<Memo>>;

    async fn get(&self, id: &str) -> Result<Option<Memo>>;

    /// Insert a memo and return it as stored
    async fn insert(&self, memo: NewMemo) -> Result<Memo>;

    /// Insert several memos atomically, returning how many were written
    async fn insert_many(&self, memos: Vec<NewMemo>) -> Result<usize>;

    /// Insert `memos` only if the store holds no memo at all, checked in the
    /// same transaction as the insert. Returns `None` when it was not empty.
    async fn insert_many_if_empty(&self, memos: Vec<NewMemo>) -> Result<Option<usize>>;

    /// Apply the present fields of `patch` and refresh `updated_at`.
    /// Returns `None` when no memo has this id.
    async fn update(&self, id: &str, patch: &UpdateMemoRequest) -> Result<Option<Memo>>;

    /// Delete a memo (and its summary). Deleting an unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn count(&self) -> Result<u64>;

    async fn get_summary(&self, memo_id: &str) -> Result<Option<String>>;

    /// Insert or overwrite the single summary kept for a memo
    async fn upsert_summary(&self, memo_id: &str, summary: &str) -> Result<()>;
}

/// SQLite-backed memo store
pub struct SqliteMemoStore {
    conn: Mutex<Connection>,
}

impl SqliteMemoStore {
    /// Open (or create) the database at `url`; `:memory:` opens a private
    /// in-memory database.
    pub fn open(url: &str) -> Result<Self> {
        let conn = if url == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(url)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_tables()?;
        tracing::debug!(url, "Memo store opened");
        Ok(store)
    }

    /// Convenience constructor for tests and one-shot tools
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("memo store connection poisoned".to_string()))
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS memos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT 'personal',
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_memos_created_at ON memos(created_at);
            CREATE INDEX IF NOT EXISTS idx_memos_category ON memos(category);
            CREATE TABLE IF NOT EXISTS memo_summaries (
                memo_id TEXT NOT NULL UNIQUE REFERENCES memos(id) ON DELETE CASCADE,
                summary TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

const MEMO_COLUMNS: &str = "id, title, content, category, tags, created_at, updated_at";

#[async_trait]
impl MemoStore for SqliteMemoStore {
    async fn list(&self, filter: &MemoFilter) -> Result<Vec<Memo>> {
        let category = match &filter.category {
            CategoryFilter::All => None,
            CategoryFilter::Only(c) => Some(c.as_str()),
            CategoryFilter::Unknown(_) => return Ok(Vec::new()),
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos
             WHERE (?1 IS NULL OR category = ?1)
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let memos = stmt
            .query_map(params![category], row_to_memo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // SQLite's LOWER() only folds ASCII, so text search runs here.
        let memos = match filter.search.as_deref() {
            Some(q) if !q.trim().is_empty() => {
                let q = q.to_lowercase();
                memos.into_iter().filter(|m| m.matches_text(&q, false)).collect()
            }
            _ => memos,
        };
        Ok(memos)
    }

    async fn get(&self, id: &str) -> Result<Option<Memo>> {
        let conn = self.lock()?;
        get_memo(&conn, id)
    }

    async fn insert(&self, memo: NewMemo) -> Result<Memo> {
        let conn = self.lock()?;
        insert_memo(&conn, &memo)?;
        get_memo(&conn, &memo.id)?
            .ok_or_else(|| Error::Store(format!("memo {} vanished after insert", memo.id)))
    }

    async fn insert_many(&self, memos: Vec<NewMemo>) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for memo in &memos {
            insert_memo(&tx, memo)?;
        }
        tx.commit()?;
        Ok(memos.len())
    }

    async fn insert_many_if_empty(&self, memos: Vec<NewMemo>) -> Result<Option<usize>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM memos", [], |r| r.get(0))?;
        if existing > 0 {
            return Ok(None);
        }
        for memo in &memos {
            insert_memo(&tx, memo)?;
        }
        tx.commit()?;
        Ok(Some(memos.len()))
    }

    async fn update(&self, id: &str, patch: &UpdateMemoRequest) -> Result<Option<Memo>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(mut memo) = get_memo(&tx, id)? else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            memo.title = title.clone();
        }
        if let Some(content) = &patch.content {
            memo.content = content.clone();
        }
        if let Some(category) = patch.category {
            memo.category = category;
        }
        if let Some(tags) = &patch.tags {
            memo.tags = tags.clone();
        }
        memo.updated_at = next_timestamp(memo.updated_at);

        tx.execute(
            "UPDATE memos
             SET title = ?2, content = ?3, category = ?4, tags = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                memo.id,
                memo.title,
                memo.content,
                memo.category.as_str(),
                serde_json::to_string(&memo.tags)?,
                format_ts(&memo.updated_at),
            ],
        )?;
        tx.commit()?;
        Ok(Some(memo))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM memos WHERE id = ?1", params![id])?;
        if removed == 0 {
            tracing::debug!(id, "Delete matched no memo");
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM memos", [], |r| r.get(0))?;
        Ok(count as u64)
    }

    async fn get_summary(&self, memo_id: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let summary = conn
            .query_row(
                "SELECT summary FROM memo_summaries WHERE memo_id = ?1",
                params![memo_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(summary)
    }

    async fn upsert_summary(&self, memo_id: &str, summary: &str) -> Result<()> {
        let conn = self.lock()?;
        let now = format_ts(&Utc::now());
        conn.execute(
            "INSERT INTO memo_summaries (memo_id, summary, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(memo_id) DO UPDATE
             SET summary = excluded.summary, updated_at = excluded.updated_at",
            params![memo_id, summary, now],
        )?;
        Ok(())
    }
}

fn insert_memo(conn: &Connection, memo: &NewMemo) -> Result<()> {
    conn.execute(
        "INSERT INTO memos (id, title, content, category, tags, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            memo.id,
            memo.title,
            memo.content,
            memo.category.as_str(),
            serde_json::to_string(&memo.tags)?,
            format_ts(&memo.created_at),
            format_ts(&memo.updated_at),
        ],
    )?;
    Ok(())
}

fn get_memo(conn: &Connection, id: &str) -> Result<Option<Memo>> {
    let memo = conn
        .query_row(
            &format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?1"),
            params![id],
            row_to_memo,
        )
        .optional()?;
    Ok(memo)
}

fn row_to_memo(row: &rusqlite::Row) -> rusqlite::Result<Memo> {
    let category: String = row.get(3)?;
    let tags: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Memo {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: category
            .parse()
            .map_err(|e: String| conversion_error(3, e))?,
        tags: serde_json::from_str(&tags).map_err(|e| conversion_error(4, e.to_string()))?,
        created_at: parse_ts(&created_at).map_err(|e| conversion_error(5, e))?,
        updated_at: parse_ts(&updated_at).map_err(|e| conversion_error(6, e))?,
    })
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

/// Fixed-width storage format for timestamps
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {:?}: {}", value, e))
}

/// Current time truncated to storage precision, strictly after `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncate_micros(Utc::now());
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

pub(crate) fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(ts.timestamp_micros()).unwrap_or(ts)
}
