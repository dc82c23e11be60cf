//! Signed-in identity held as an explicit value.
//!
//! # Responsibility
//! - Turn an identity-provider result into a persisted `User` and token.
//! - Answer "who is acting" and "may they" for services.
//!
//! # Invariants
//! - A user's role is chosen on first sign-in and never changes.
//! - `sign_out` clears both persisted slots even when nobody is signed in.
//! - Services never read identity from anywhere but an `AuthSession`.

use crate::model::time::to_iso;
use crate::model::user::{AuthProvider, User, UserRole};
use crate::model::validation::{is_valid_email, ValidationErrors};
use crate::repo::account_repo::AccountRepository;
use crate::repo::kv_store::RepoError;
use crate::sync::remote::RemoteError;
use crate::sync::remote_sync::RemoteSync;
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AuthError {
    NotSignedIn,
    Forbidden { required: UserRole, actual: UserRole },
    InvalidIdentity(ValidationErrors),
    Repo(RepoError),
    Remote(RemoteError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no user is signed in"),
            Self::Forbidden { required, actual } => write!(
                f,
                "role `{}` required, signed in as `{}`",
                required.as_str(),
                actual.as_str()
            ),
            Self::InvalidIdentity(err) => write!(f, "invalid identity: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentity(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RemoteError> for AuthError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// What an identity provider hands back after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInIdentity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub provider: AuthProvider,
}

impl SignedInIdentity {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.uid.trim().is_empty() {
            errors.add("uid", "must not be empty");
        }
        if !is_valid_email(self.email.trim()) {
            errors.add("email", "Please enter a valid email address.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    user: Option<User>,
}

impl AuthSession {
    /// A session with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Signs in against local state only.
    ///
    /// The persisted user is reused (role kept) when it has the same id.
    pub fn sign_in(
        account: &AccountRepository<'_>,
        identity: &SignedInIdentity,
        requested_role: UserRole,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        identity.validate().map_err(AuthError::InvalidIdentity)?;
        let existing = account.get_user().filter(|user| user.id == identity.uid);
        let user = resolve_user(existing, identity, requested_role, now);
        persist(account, &user, token)?;
        Ok(Self { user: Some(user) })
    }

    /// Signs in resolving the account through the remote `users` collection,
    /// creating it there on first sign-in.
    pub fn sign_in_remote(
        remote: &RemoteSync<'_>,
        account: &AccountRepository<'_>,
        identity: &SignedInIdentity,
        requested_role: UserRole,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        identity.validate().map_err(AuthError::InvalidIdentity)?;
        let existing = remote.fetch::<User>(&identity.uid)?;
        let user = resolve_user(existing, identity, requested_role, now);
        remote.push(&user)?;
        persist(account, &user, token)?;
        Ok(Self { user: Some(user) })
    }

    /// Rebuilds the session from the persisted user, signed out when absent.
    pub fn restore(account: &AccountRepository<'_>) -> Self {
        Self {
            user: account.get_user(),
        }
    }

    pub fn sign_out(&mut self, account: &AccountRepository<'_>) -> Result<(), AuthError> {
        account.remove_user()?;
        account.remove_token()?;
        self.user = None;
        info!("event=auth_sign_out module=service status=ok");
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotSignedIn)
    }

    pub fn require_role(&self, role: UserRole) -> Result<&User, AuthError> {
        let user = self.require_user()?;
        if user.role != role {
            return Err(AuthError::Forbidden {
                required: role,
                actual: user.role,
            });
        }
        Ok(user)
    }
}

fn resolve_user(
    existing: Option<User>,
    identity: &SignedInIdentity,
    requested_role: UserRole,
    now: DateTime<Utc>,
) -> User {
    let now = to_iso(now);
    match existing {
        Some(mut user) => {
            user.email = identity.email.trim().to_string();
            user.display_name = identity.display_name.clone().or(user.display_name);
            user.photo_url = identity.photo_url.clone().or(user.photo_url);
            user.last_login_at = Some(now);
            user
        }
        None => User {
            id: identity.uid.clone(),
            email: identity.email.trim().to_string(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
            role: requested_role,
            auth_provider: identity.provider,
            created_at: now.clone(),
            last_login_at: Some(now),
        },
    }
}

fn persist(account: &AccountRepository<'_>, user: &User, token: &str) -> Result<(), AuthError> {
    account.save_user(user)?;
    account.save_token(token)?;
    info!(
        "event=auth_sign_in module=service status=ok role={}",
        user.role.as_str()
    );
    Ok(())
}
