//! Whole-collection CRUD for entity arrays.
//!
//! # Responsibility
//! - Persist each entity collection as one JSON array under its fixed key.
//! - Provide id-based save/delete/find through linear scans.
//!
//! # Invariants
//! - Reads never fail: a missing, unreadable or unparseable array is an empty
//!   collection. A corrupted store therefore looks exactly like a new one.
//! - `save` is a read-modify-write of the entire array. Two callers that both
//!   read before either writes will lose one insertion (`commit`); use
//!   `commit_checked` to turn that into `RepoError::Conflict`.
//! - Nothing here validates records or enforces references between
//!   collections.

use crate::model::Entity;
use crate::repo::kv_store::{KvStore, RepoError, RepoResult, Revision};
use log::{debug, warn};
use std::marker::PhantomData;

/// Collection contents plus the revision they were read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    /// `None` when the key was absent or could not be read.
    pub revision: Option<Revision>,
}

/// A fully computed collection write that has not been persisted yet.
///
/// Holding one of these models a caller that has read the collection and is
/// about to write it back.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedWrite<T> {
    items: Vec<T>,
    base_revision: Option<Revision>,
}

impl<T> StagedWrite<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn base_revision(&self) -> Option<Revision> {
        self.base_revision
    }
}

/// Typed view of one entity collection.
pub struct CollectionRepository<'s, T: Entity> {
    store: &'s dyn KvStore,
    _entity: PhantomData<fn() -> T>,
}

impl<'s, T: Entity> CollectionRepository<'s, T> {
    pub fn new(store: &'s dyn KvStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        T::COLLECTION.storage_key()
    }

    /// Every record, or an empty list when nothing usable is stored.
    pub fn get_all(&self) -> Vec<T> {
        self.snapshot().items
    }

    /// Reads the collection together with its revision.
    pub fn snapshot(&self) -> Snapshot<T> {
        let key = self.key();
        let stored = match self.store.get(key) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                return Snapshot {
                    items: Vec::new(),
                    revision: None,
                }
            }
            Err(err) => {
                warn!(
                    "event=collection_read module=repo status=error key={} error={}",
                    key, err
                );
                return Snapshot {
                    items: Vec::new(),
                    revision: None,
                };
            }
        };

        match serde_json::from_str::<Vec<T>>(&stored.value) {
            Ok(items) => Snapshot {
                items,
                revision: Some(stored.revision),
            },
            Err(err) => {
                warn!(
                    "event=collection_read module=repo status=error key={} revision={} error_code=parse_failed error={}",
                    key, stored.revision, err
                );
                Snapshot {
                    items: Vec::new(),
                    revision: Some(stored.revision),
                }
            }
        }
    }

    /// Finds a record by id.
    pub fn get_by_id(&self, id: &str) -> Option<T> {
        self.get_all().into_iter().find(|item| item.id() == id)
    }

    /// Records matching `predicate`, in stored order.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.get_all().into_iter().filter(|item| predicate(item)).collect()
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.get_all().into_iter().find(|item| predicate(item))
    }

    /// Replaces the record with the same id, or appends it.
    pub fn save(&self, entity: &T) -> RepoResult<()> {
        let staged = self.stage_save(entity);
        self.commit(staged)
    }

    /// Removes the record with `id` and persists the remainder.
    ///
    /// The array is written back even when nothing matched. Returns whether a
    /// record was removed.
    pub fn delete(&self, id: &str) -> RepoResult<bool> {
        let Snapshot { items, revision } = self.snapshot();
        let before = items.len();
        let staged = without_id(items, revision, id);
        let removed = staged.items.len() < before;
        self.commit(staged)?;
        Ok(removed)
    }

    /// Overwrites the whole collection.
    pub fn replace_all(&self, items: &[T]) -> RepoResult<()> {
        let json = encode(self.key(), items)?;
        self.store.set(self.key(), &json)?;
        debug!(
            "event=collection_replace module=repo status=ok key={} count={}",
            self.key(),
            items.len()
        );
        Ok(())
    }

    /// Removes the collection key entirely.
    pub fn clear(&self) -> RepoResult<bool> {
        self.store.remove(self.key())
    }

    /// Reads the collection and computes the array a save would write.
    pub fn stage_save(&self, entity: &T) -> StagedWrite<T> {
        let Snapshot {
            mut items,
            revision,
        } = self.snapshot();
        match items.iter().position(|item| item.id() == entity.id()) {
            Some(index) => items[index] = entity.clone(),
            None => items.push(entity.clone()),
        }
        StagedWrite {
            items,
            base_revision: revision,
        }
    }

    /// Reads the collection and computes the array a delete would write.
    pub fn stage_delete(&self, id: &str) -> StagedWrite<T> {
        let Snapshot { items, revision } = self.snapshot();
        without_id(items, revision, id)
    }

    /// Writes a staged array unconditionally (last write wins).
    pub fn commit(&self, staged: StagedWrite<T>) -> RepoResult<()> {
        let json = encode(self.key(), &staged.items)?;
        let revision = self.store.set(self.key(), &json)?;
        debug!(
            "event=collection_write module=repo status=ok key={} count={} revision={}",
            self.key(),
            staged.items.len(),
            revision
        );
        Ok(())
    }

    /// Writes a staged array only if nobody wrote the collection since it was
    /// read.
    ///
    /// # Errors
    /// - `RepoError::Conflict` when the collection revision moved.
    pub fn commit_checked(&self, staged: StagedWrite<T>) -> RepoResult<()> {
        let json = encode(self.key(), &staged.items)?;
        let revision = self
            .store
            .set_if_revision(self.key(), &json, staged.base_revision)?;
        debug!(
            "event=collection_write module=repo status=ok mode=checked key={} count={} revision={}",
            self.key(),
            staged.items.len(),
            revision
        );
        Ok(())
    }
}

fn without_id<T: Entity>(items: Vec<T>, revision: Option<Revision>, id: &str) -> StagedWrite<T> {
    StagedWrite {
        items: items.into_iter().filter(|item| item.id() != id).collect(),
        base_revision: revision,
    }
}

fn encode<T: Entity>(key: &str, items: &[T]) -> RepoResult<String> {
    serde_json::to_string(items).map_err(|source| RepoError::Serialization {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::CollectionRepository;
    use crate::db::open_db_in_memory;
    use crate::model::assignment::WorkoutAssignment;
    use crate::repo::kv_store::{KvStore, SqliteKvStore};

    #[test]
    fn unparseable_array_reads_as_empty_but_keeps_revision() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);
        store.set("@pfa/assignments", "{not json").unwrap();

        let repo = CollectionRepository::<WorkoutAssignment>::new(&store);
        let snapshot = repo.snapshot();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.revision, Some(1));
    }

    #[test]
    fn delete_reports_whether_a_record_matched() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);
        let repo = CollectionRepository::<WorkoutAssignment>::new(&store);
        let assignment = WorkoutAssignment::new("c1", "w1", "coach", "2024-01-01T00:00:00.000Z");
        repo.save(&assignment).unwrap();

        assert!(repo.delete(&assignment.id).unwrap());
        assert!(!repo.delete(&assignment.id).unwrap());
        assert!(repo.get_all().is_empty());
    }
}
