//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and remote calls into use-case level APIs.
//! - Run form validation before anything is persisted.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod auth_session;
pub mod invitation_service;
pub mod progress_service;
pub mod roster_service;
pub mod session_service;
pub mod transfer_service;
pub mod workout_service;

use crate::model::invitation::InvitationStatus;
use crate::model::session::SessionStatus;
use crate::model::validation::ValidationErrors;
use crate::repo::kv_store::RepoError;
use crate::sync::remote::RemoteError;
use auth_session::AuthError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for every use-case.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed form rules; field-keyed.
    Validation(ValidationErrors),
    /// Local persistence failure.
    Repo(RepoError),
    /// Remote collaborator failure.
    Remote(RemoteError),
    /// Missing or insufficient identity.
    Auth(AuthError),
    /// Referenced record does not exist.
    NotFound { entity: &'static str, id: String },
    /// The session no longer accepts changes.
    SessionClosed {
        session_id: String,
        status: SessionStatus,
    },
    /// An assignment call named no athletes.
    EmptySelection,
    InvitationExpired { code: String },
    InvitationNotPending {
        code: String,
        status: InvitationStatus,
    },
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::SessionClosed { session_id, status } => {
                write!(f, "session {session_id} is {status:?} and cannot change")
            }
            Self::EmptySelection => write!(f, "select at least one athlete"),
            Self::InvitationExpired { code } => write!(f, "invitation {code} has expired"),
            Self::InvitationNotPending { code, status } => {
                write!(f, "invitation {code} is {status:?}, not pending")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::Auth(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RemoteError> for ServiceError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}
