//! Athlete (client) record and its creation form.

use serde::{Deserialize, Serialize};

use super::validation::{check_name, is_valid_email, is_valid_phone, ValidationErrors};
use super::{new_id, Collection, Entity, Record};

/// An athlete managed by a coach.
///
/// `user_id` stays `None` until the athlete accepts an invitation and signs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Local image URI or uploaded download URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_sent_at: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Coach user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Client {
    /// Builds a client with a generated id and no optional fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self::with_id(new_id(), name, email, created_at)
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            name: name.into(),
            email: email.into(),
            phone: None,
            notes: None,
            photo_uri: None,
            active: None,
            invitation_sent: None,
            invitation_sent_at: None,
            created_at: created_at.into(),
            updated_at: None,
            created_by: None,
        }
    }
}

impl Record for Client {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        ClientForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            notes: self.notes.clone(),
        }
        .validate()
    }
}

impl Entity for Client {
    const COLLECTION: Collection = Collection::Clients;
}

/// Coach-entered athlete details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl ClientForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Name", &self.name);
        if !is_valid_email(self.email.trim()) {
            errors.add("email", "Please enter a valid email address.");
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if !is_valid_phone(phone) {
                errors.add("phone", "Please enter a valid phone number");
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::ClientForm;

    #[test]
    fn form_collects_every_failing_field() {
        let form = ClientForm {
            name: "J".to_string(),
            email: "not-an-email".to_string(),
            phone: Some("ring ring".to_string()),
            notes: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("phone").is_some());
    }

    #[test]
    fn blank_phone_is_treated_as_absent() {
        let form = ClientForm {
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("  ".to_string()),
            notes: None,
        };
        assert!(form.validate().is_ok());
    }
}
