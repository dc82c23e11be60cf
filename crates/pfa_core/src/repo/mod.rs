//! Local persistence layer.
//!
//! # Responsibility
//! - `kv_store`: generic get/set/remove of serialized text by key.
//! - `collection_repo`: per-entity array CRUD on top of the key-value layer.
//! - `account_repo`: signed-in user and token scalars.
//! - `local_store`: typed facade that owns the backend.
//!
//! # Invariants
//! - Write failures surface as `RepoError`; collection reads never fail.
//! - Storage performs no schema validation and no cascading.

pub mod account_repo;
pub mod collection_repo;
pub mod kv_store;
pub mod local_store;
