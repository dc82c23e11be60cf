//! Core domain logic for the personal-fitness coaching app.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod performance;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status, LoggingError};
pub use model::validation::ValidationErrors;
pub use model::{Collection, Entity, Record};
pub use performance::{classify, PerformanceRating};
pub use repo::collection_repo::{CollectionRepository, Snapshot, StagedWrite};
pub use repo::kv_store::{KvStore, RepoError, RepoResult, Revision, SqliteKvStore};
pub use repo::local_store::LocalStore;
pub use service::auth_session::{AuthError, AuthSession, SignedInIdentity};
pub use service::invitation_service::InvitationService;
pub use service::progress_service::ProgressService;
pub use service::roster_service::RosterService;
pub use service::session_service::SessionService;
pub use service::transfer_service::{ExportBundle, ImportSummary, TransferError, TransferService};
pub use service::workout_service::WorkoutLibrary;
pub use service::{ServiceError, ServiceResult};
pub use sync::remote::{BlobStore, DocumentStore, QueryOp, RemoteCollection, RemoteError};
pub use sync::remote_sync::RemoteSync;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
