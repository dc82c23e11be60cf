//! Athlete invitation use-cases.
//!
//! # Responsibility
//! - Issue, resend and accept invitations stored in the remote
//!   `invitations` collection.
//! - Link an accepted invitation's athlete record to the signing-in user.
//!
//! # Invariants
//! - Only pending, unexpired invitations can be accepted.
//! - Acceptance always links the athlete record; a record missing locally
//!   is fetched from the remote store.
//! - An expired invitation found during acceptance is persisted as expired.
//! - Email delivery is out of scope; the deep link is only logged.

use crate::model::athlete::Client;
use crate::model::invitation::{ClientInvitation, InvitationStatus};
use crate::model::time::to_iso;
use crate::model::user::UserRole;
use crate::repo::kv_store::KvStore;
use crate::repo::local_store::LocalStore;
use crate::service::auth_session::{AuthSession, SignedInIdentity};
use crate::service::{ServiceError, ServiceResult};
use crate::sync::remote::QueryOp;
use crate::sync::remote_sync::RemoteSync;
use chrono::{DateTime, Utc};
use log::info;
use serde_json::Value;

pub struct InvitationService<'a, S: KvStore> {
    store: &'a LocalStore<S>,
    remote: &'a RemoteSync<'a>,
    session: &'a AuthSession,
}

impl<'a, S: KvStore> InvitationService<'a, S> {
    pub fn new(
        store: &'a LocalStore<S>,
        remote: &'a RemoteSync<'a>,
        session: &'a AuthSession,
    ) -> Self {
        Self {
            store,
            remote,
            session,
        }
    }

    /// Issues a pending invitation for the athlete and flags the athlete as
    /// invited. The athlete record is pushed so another device can link it.
    pub fn send_invitation(
        &self,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<ClientInvitation> {
        self.session.require_role(UserRole::Admin)?;
        let clients = self.store.clients();
        let mut client = clients
            .get_by_id(client_id)
            .ok_or_else(|| ServiceError::not_found("client", client_id))?;

        let invitation = ClientInvitation::issue(client.id.as_str(), client.email.as_str(), now);
        self.remote.push(&invitation)?;

        client.invitation_sent = Some(true);
        client.invitation_sent_at = Some(invitation.sent_at.clone());
        client.updated_at = Some(to_iso(now));
        clients.save(&client)?;
        self.remote.push(&client)?;

        info!(
            "event=invitation_send module=service status=ok link={}",
            invitation.deep_link()
        );
        Ok(invitation)
    }

    /// Restarts the expiry window of an existing invitation.
    pub fn resend_invitation(
        &self,
        invitation_id: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<ClientInvitation> {
        self.session.require_role(UserRole::Admin)?;
        let mut invitation = self
            .remote
            .fetch::<ClientInvitation>(invitation_id)?
            .ok_or_else(|| ServiceError::not_found("invitation", invitation_id))?;
        if invitation.status == InvitationStatus::Accepted {
            return Err(ServiceError::InvitationNotPending {
                code: invitation.invitation_code,
                status: invitation.status,
            });
        }
        invitation.renew(now);
        self.remote.push(&invitation)?;
        info!(
            "event=invitation_resend module=service status=ok resend_count={}",
            invitation.resend_count
        );
        Ok(invitation)
    }

    /// Pending invitations for one athlete.
    pub fn pending_for_client(&self, client_id: &str) -> ServiceResult<Vec<ClientInvitation>> {
        let invitations = self.remote.query::<ClientInvitation>(
            "clientId",
            QueryOp::Eq,
            &Value::String(client_id.to_string()),
        )?;
        Ok(invitations
            .into_iter()
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
            .collect())
    }

    /// Accepts the invitation carrying `code` on behalf of `identity`.
    ///
    /// # Errors
    /// - `NotFound` when no invitation has the code, or when the athlete
    ///   record is neither stored locally nor remotely.
    /// - `InvitationNotPending` when it was already accepted or expired.
    /// - `InvitationExpired` when the expiry passed; the invitation is
    ///   stored as expired first.
    pub fn accept_invitation(
        &self,
        code: &str,
        identity: &SignedInIdentity,
        now: DateTime<Utc>,
    ) -> ServiceResult<ClientInvitation> {
        let mut invitation = self
            .remote
            .query::<ClientInvitation>(
                "invitationCode",
                QueryOp::Eq,
                &Value::String(code.to_string()),
            )?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found("invitation", code))?;

        if invitation.status != InvitationStatus::Pending {
            return Err(ServiceError::InvitationNotPending {
                code: code.to_string(),
                status: invitation.status,
            });
        }
        if invitation.is_expired_at(now) {
            invitation.status = InvitationStatus::Expired;
            self.remote.push(&invitation)?;
            info!("event=invitation_accept module=service status=error error_code=expired");
            return Err(ServiceError::InvitationExpired {
                code: code.to_string(),
            });
        }

        let clients = self.store.clients();
        let mut client = match clients.get_by_id(&invitation.client_id) {
            Some(client) => client,
            None => self
                .remote
                .fetch::<Client>(&invitation.client_id)?
                .ok_or_else(|| ServiceError::not_found("client", &invitation.client_id))?,
        };
        client.user_id = Some(identity.uid.clone());
        client.updated_at = Some(to_iso(now));
        clients.save(&client)?;
        self.remote.push(&client)?;

        invitation.status = InvitationStatus::Accepted;
        invitation.accepted_at = Some(to_iso(now));
        self.remote.push(&invitation)?;
        info!("event=invitation_accept module=service status=ok");
        Ok(invitation)
    }
}
