//! Generic key-value persistence over the `kv_entries` table.
//!
//! # Responsibility
//! - Store one serialized text value per key with an atomic overwrite.
//! - Track a per-key `revision` so callers can detect writes they did not see.
//!
//! # Invariants
//! - Every successful write bumps the key's revision by exactly one; a fresh
//!   key starts at revision 1.
//! - `set` never checks revisions (last write wins); `set_if_revision` does.
//! - Removing a key drops its revision history.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Monotonic per-key write counter.
pub type Revision = i64;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error surfaced by write paths.
///
/// Read paths of collections never return this; see `CollectionRepository`.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization {
        key: String,
        source: serde_json::Error,
    },
    /// The key moved past the revision the caller based its write on.
    Conflict {
        key: String,
        expected: Option<Revision>,
        actual: Option<Revision>,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "failed to save data: {err}"),
            Self::Serialization { key, source } => {
                write!(f, "failed to serialize `{key}`: {source}")
            }
            Self::Conflict {
                key,
                expected,
                actual,
            } => write!(
                f,
                "write conflict on `{key}`: expected revision {}, found {}",
                revision_label(*expected),
                revision_label(*actual)
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
            Self::Conflict { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn revision_label(revision: Option<Revision>) -> String {
    revision.map_or_else(|| "absent".to_string(), |value| value.to_string())
}

/// A stored value together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: String,
    pub revision: Revision,
}

/// Text storage addressed by fixed string keys.
pub trait KvStore {
    /// Returns the value under `key`, `None` when never written.
    fn get(&self, key: &str) -> RepoResult<Option<StoredValue>>;

    /// Overwrites `key` unconditionally and returns the new revision.
    fn set(&self, key: &str, value: &str) -> RepoResult<Revision>;

    /// Overwrites `key` only when its current revision equals `expected`
    /// (`None` = the key must be absent).
    fn set_if_revision(
        &self,
        key: &str,
        value: &str,
        expected: Option<Revision>,
    ) -> RepoResult<Revision>;

    /// Writes every entry in one transaction; either all land or none.
    fn set_many(&self, entries: &[(&str, String)]) -> RepoResult<()>;

    /// Deletes `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> RepoResult<bool>;

    /// Deletes every key.
    fn clear(&self) -> RepoResult<()>;

    /// Lists stored keys in ascending order.
    fn keys(&self) -> RepoResult<Vec<String>>;
}

const UPSERT_SQL: &str = "INSERT INTO kv_entries (key, value, revision, updated_at)
     VALUES (?1, ?2, 1, (strftime('%s', 'now') * 1000))
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        revision = kv_entries.revision + 1,
        updated_at = excluded.updated_at
     RETURNING revision;";

/// SQLite-backed key-value store.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn current_revision(&self, key: &str) -> RepoResult<Option<Revision>> {
        Ok(self
            .conn
            .query_row(
                "SELECT revision FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<StoredValue>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value, revision FROM kv_entries WHERE key = ?1;",
                [key],
                |row| {
                    Ok(StoredValue {
                        value: row.get(0)?,
                        revision: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<Revision> {
        let revision = self
            .conn
            .query_row(UPSERT_SQL, params![key, value], |row| row.get(0))?;
        debug!(
            "event=kv_set module=repo status=ok key={} revision={} bytes={}",
            key,
            revision,
            value.len()
        );
        Ok(revision)
    }

    fn set_if_revision(
        &self,
        key: &str,
        value: &str,
        expected: Option<Revision>,
    ) -> RepoResult<Revision> {
        let written: Option<Revision> = match expected {
            None => self
                .conn
                .query_row(
                    "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO NOTHING
                     RETURNING revision;",
                    params![key, value],
                    |row| row.get(0),
                )
                .optional()?,
            Some(revision) => self
                .conn
                .query_row(
                    "UPDATE kv_entries
                     SET
                        value = ?2,
                        revision = revision + 1,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE key = ?1 AND revision = ?3
                     RETURNING revision;",
                    params![key, value, revision],
                    |row| row.get(0),
                )
                .optional()?,
        };

        match written {
            Some(revision) => {
                debug!(
                    "event=kv_set module=repo status=ok mode=checked key={} revision={}",
                    key, revision
                );
                Ok(revision)
            }
            None => {
                let actual = self.current_revision(key)?;
                debug!(
                    "event=kv_set module=repo status=conflict key={} expected={} actual={}",
                    key,
                    revision_label(expected),
                    revision_label(actual)
                );
                Err(RepoError::Conflict {
                    key: key.to_string(),
                    expected,
                    actual,
                })
            }
        }
    }

    fn set_many(&self, entries: &[(&str, String)]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_SQL)?;
            for (key, value) in entries {
                stmt.query_row(params![key, value], |row| row.get::<_, Revision>(0))?;
            }
        }
        tx.commit()?;
        debug!(
            "event=kv_set_many module=repo status=ok entries={}",
            entries.len()
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }

    fn keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}
