//! Remote document and blob collaborators.
//!
//! # Responsibility
//! - `remote`: untyped collaborator traits and `RemoteError`.
//! - `memory`: in-process implementations.
//! - `remote_sync`: typed, validated facade used by services.

pub mod memory;
pub mod remote;
pub mod remote_sync;
