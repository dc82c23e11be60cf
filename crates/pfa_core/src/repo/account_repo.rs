//! Scalar slots for the signed-in user and the identity token.

use crate::model::user::User;
use crate::repo::kv_store::{KvStore, RepoError, RepoResult};
use log::warn;

pub const USER_KEY: &str = "@pfa/user";
pub const AUTH_TOKEN_KEY: &str = "@pfa/auth_token";

/// Reads and writes the persisted identity.
///
/// Reads follow the collection rule: anything unreadable is treated as absent.
pub struct AccountRepository<'s> {
    store: &'s dyn KvStore,
}

impl<'s> AccountRepository<'s> {
    pub fn new(store: &'s dyn KvStore) -> Self {
        Self { store }
    }

    pub fn save_user(&self, user: &User) -> RepoResult<()> {
        self.write_json(USER_KEY, user)
    }

    pub fn get_user(&self) -> Option<User> {
        self.read_json(USER_KEY)
    }

    pub fn remove_user(&self) -> RepoResult<()> {
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    /// Stores the opaque token as a JSON string.
    pub fn save_token(&self, token: &str) -> RepoResult<()> {
        self.write_json(AUTH_TOKEN_KEY, &token)
    }

    pub fn get_token(&self) -> Option<String> {
        self.read_json(AUTH_TOKEN_KEY)
    }

    pub fn remove_token(&self) -> RepoResult<()> {
        self.store.remove(AUTH_TOKEN_KEY)?;
        Ok(())
    }

    fn write_json<V: serde::Serialize + ?Sized>(&self, key: &str, value: &V) -> RepoResult<()> {
        let json = serde_json::to_string(value).map_err(|source| RepoError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &json)?;
        Ok(())
    }

    fn read_json<V: serde::de::DeserializeOwned>(&self, key: &str) -> Option<V> {
        let stored = match self.store.get(key) {
            Ok(stored) => stored?,
            Err(err) => {
                warn!(
                    "event=account_read module=repo status=error key={} error={}",
                    key, err
                );
                return None;
            }
        };
        match serde_json::from_str(&stored.value) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=account_read module=repo status=error key={} error_code=parse_failed error={}",
                    key, err
                );
                None
            }
        }
    }
}
