//! Invitations that link a pending athlete record to a future sign-in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::{parse_iso, to_iso};
use super::validation::{is_valid_email, ValidationErrors};
use super::{new_id, Record};

pub const INVITATION_EXPIRATION_DAYS: i64 = 30;
pub const DEEP_LINK_SCHEME: &str = "pfa://";
const INVITE_PATH: &str = "invite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInvitation {
    pub id: String,
    pub client_id: String,
    pub email: String,
    /// Opaque token carried by the deep link.
    pub invitation_code: String,
    pub status: InvitationStatus,
    pub sent_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    pub expires_at: String,
    #[serde(default)]
    pub resend_count: u32,
}

impl ClientInvitation {
    /// Creates a pending invitation expiring `INVITATION_EXPIRATION_DAYS` after `now`.
    pub fn issue(client_id: impl Into<String>, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            client_id: client_id.into(),
            email: email.into(),
            invitation_code: Uuid::new_v4().simple().to_string(),
            status: InvitationStatus::Pending,
            sent_at: to_iso(now),
            accepted_at: None,
            expires_at: expiry_from(now),
            resend_count: 0,
        }
    }

    /// Restarts the expiry window and bumps the resend counter.
    pub fn renew(&mut self, now: DateTime<Utc>) {
        self.sent_at = to_iso(now);
        self.expires_at = expiry_from(now);
        self.status = InvitationStatus::Pending;
        self.resend_count += 1;
    }

    /// Unparseable expiry timestamps count as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        parse_iso(&self.expires_at).map_or(true, |expires_at| now > expires_at)
    }

    pub fn deep_link(&self) -> String {
        invite_link(&self.invitation_code)
    }
}

impl Record for ClientInvitation {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.invitation_code.trim().is_empty() {
            errors.add("invitationCode", "must not be empty");
        }
        if !is_valid_email(&self.email) {
            errors.add("email", "Please enter a valid email address.");
        }
        if parse_iso(&self.expires_at).is_none() {
            errors.add("expiresAt", "must be an ISO-8601 timestamp");
        }
        errors.into_result()
    }
}

fn expiry_from(now: DateTime<Utc>) -> String {
    to_iso(now + Duration::days(INVITATION_EXPIRATION_DAYS))
}

/// `pfa://invite?code={code}`
pub fn invite_link(code: &str) -> String {
    format!("{DEEP_LINK_SCHEME}{INVITE_PATH}?code={code}")
}

/// Extracts the invitation code from a deep link, `None` for other links.
pub fn parse_invite_link(uri: &str) -> Option<String> {
    let rest = uri.trim().strip_prefix(DEEP_LINK_SCHEME)?;
    let query = rest.strip_prefix(INVITE_PATH)?.strip_prefix('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "code")
        .map(|(_, value)| value.to_string())
        .filter(|code| !code.is_empty())
}
