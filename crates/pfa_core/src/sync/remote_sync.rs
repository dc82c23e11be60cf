//! Typed access to the remote collaborators.
//!
//! # Responsibility
//! - Map entity types to remote collections.
//! - Validate entities before they leave the device and documents before
//!   they are trusted.
//! - Build blob paths for athlete photos and workout videos.
//!
//! # Invariants
//! - A malformed or invalid fetched document is `RemoteError::Schema`, never
//!   a silently dropped record.
//! - Collaborator failures pass through unchanged.

use crate::model::assignment::WorkoutAssignment;
use crate::model::athlete::Client;
use crate::model::exercise::Exercise;
use crate::model::invitation::ClientInvitation;
use crate::model::session::WorkoutSession;
use crate::model::user::User;
use crate::model::workout::Workout;
use crate::model::Record;
use crate::sync::remote::{
    BlobStore, Document, DocumentStore, QueryOp, RemoteCollection, RemoteError, RemoteResult,
};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;

/// A record with a remote home.
pub trait RemoteEntity: Record {
    const REMOTE: RemoteCollection;
}

impl RemoteEntity for User {
    const REMOTE: RemoteCollection = RemoteCollection::Users;
}

impl RemoteEntity for Client {
    const REMOTE: RemoteCollection = RemoteCollection::Clients;
}

impl RemoteEntity for Workout {
    const REMOTE: RemoteCollection = RemoteCollection::Workouts;
}

impl RemoteEntity for Exercise {
    const REMOTE: RemoteCollection = RemoteCollection::Exercises;
}

impl RemoteEntity for WorkoutAssignment {
    const REMOTE: RemoteCollection = RemoteCollection::Assignments;
}

impl RemoteEntity for WorkoutSession {
    const REMOTE: RemoteCollection = RemoteCollection::Sessions;
}

impl RemoteEntity for ClientInvitation {
    const REMOTE: RemoteCollection = RemoteCollection::Invitations;
}

/// `athletes/{clientId}/photo.jpg`
pub fn athlete_photo_path(client_id: &str) -> String {
    format!("athletes/{client_id}/photo.jpg")
}

/// `videos/{userId}/{workoutId}/{epochMillis}.mp4`
pub fn workout_video_path(user_id: &str, workout_id: &str, at: DateTime<Utc>) -> String {
    format!(
        "videos/{user_id}/{workout_id}/{}.mp4",
        at.timestamp_millis()
    )
}

/// Typed facade over a document store and a blob store.
pub struct RemoteSync<'r> {
    documents: &'r dyn DocumentStore,
    blobs: &'r dyn BlobStore,
}

impl<'r> RemoteSync<'r> {
    pub fn new(documents: &'r dyn DocumentStore, blobs: &'r dyn BlobStore) -> Self {
        Self { documents, blobs }
    }

    /// Validates and merge-writes one entity under its id.
    pub fn push<T: RemoteEntity>(&self, entity: &T) -> RemoteResult<()> {
        if let Err(errors) = entity.validate() {
            warn!(
                "event=remote_push module=sync status=error collection={} error_code=invalid fields={}",
                T::REMOTE,
                errors.len()
            );
            return Err(RemoteError::Rejected {
                collection: T::REMOTE,
                id: entity.id().to_string(),
                errors,
            });
        }
        let fields = match serde_json::to_value(entity).map_err(RemoteError::Encode)? {
            Value::Object(fields) => fields,
            _ => Document::new(),
        };
        self.documents
            .set_document(T::REMOTE, entity.id(), fields)?;
        debug!(
            "event=remote_push module=sync status=ok collection={}",
            T::REMOTE
        );
        Ok(())
    }

    /// Fetches and decodes one entity.
    pub fn fetch<T: RemoteEntity>(&self, id: &str) -> RemoteResult<Option<T>> {
        self.documents
            .get_document(T::REMOTE, id)?
            .map(decode::<T>)
            .transpose()
    }

    /// Fetches every entity of the collection; one bad document fails the call.
    pub fn fetch_all<T: RemoteEntity>(&self) -> RemoteResult<Vec<T>> {
        self.documents
            .list_documents(T::REMOTE)?
            .into_iter()
            .map(decode::<T>)
            .collect()
    }

    pub fn query<T: RemoteEntity>(
        &self,
        field: &str,
        op: QueryOp,
        value: &Value,
    ) -> RemoteResult<Vec<T>> {
        self.documents
            .query_documents(T::REMOTE, field, op, value)?
            .into_iter()
            .map(decode::<T>)
            .collect()
    }

    pub fn remove<T: RemoteEntity>(&self, id: &str) -> RemoteResult<()> {
        self.documents.delete_document(T::REMOTE, id)
    }

    /// Uploads an athlete photo and returns its download URL.
    pub fn upload_client_photo(&self, client_id: &str, bytes: &[u8]) -> RemoteResult<String> {
        let url = self
            .blobs
            .upload_blob(&athlete_photo_path(client_id), bytes)?;
        debug!(
            "event=blob_upload module=sync status=ok kind=athlete_photo bytes={}",
            bytes.len()
        );
        Ok(url)
    }

    /// Uploads a workout video. Returns `(path, download_url)`.
    pub fn upload_workout_video(
        &self,
        user_id: &str,
        workout_id: &str,
        bytes: &[u8],
        at: DateTime<Utc>,
    ) -> RemoteResult<(String, String)> {
        let path = workout_video_path(user_id, workout_id, at);
        let url = self.blobs.upload_blob(&path, bytes)?;
        debug!(
            "event=blob_upload module=sync status=ok kind=workout_video bytes={}",
            bytes.len()
        );
        Ok((path, url))
    }

    pub fn delete_blob(&self, path: &str) -> RemoteResult<()> {
        self.blobs.delete_blob(path)
    }

    pub fn download_url(&self, path: &str) -> RemoteResult<String> {
        self.blobs.download_url(path)
    }
}

fn decode<T: RemoteEntity>(document: Document) -> RemoteResult<T> {
    let id = document
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let entity: T = serde_json::from_value(Value::Object(document)).map_err(|err| {
        RemoteError::Schema {
            collection: T::REMOTE,
            id: id.clone(),
            message: err.to_string(),
        }
    })?;
    entity.validate().map_err(|errors| RemoteError::Schema {
        collection: T::REMOTE,
        id,
        message: errors.to_string(),
    })?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::{athlete_photo_path, workout_video_path, RemoteSync};
    use crate::model::athlete::Client;
    use crate::sync::memory::{MemoryBlobStore, MemoryDocumentStore};
    use crate::sync::remote::{DocumentStore, RemoteCollection, RemoteError};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn blob_paths_follow_layout() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(athlete_photo_path("c1"), "athletes/c1/photo.jpg");
        assert_eq!(
            workout_video_path("u1", "w1", at),
            "videos/u1/w1/1704067200000.mp4"
        );
    }

    #[test]
    fn fetch_rejects_documents_missing_required_fields() {
        let documents = MemoryDocumentStore::new();
        let blobs = MemoryBlobStore::new();
        documents
            .set_document(
                RemoteCollection::Clients,
                "c1",
                json!({"name": "Jane"}).as_object().cloned().unwrap(),
            )
            .unwrap();

        let remote = RemoteSync::new(&documents, &blobs);
        let err = remote.fetch::<Client>("c1").unwrap_err();
        assert!(matches!(err, RemoteError::Schema { collection: RemoteCollection::Clients, .. }));
    }

    #[test]
    fn push_refuses_invalid_entities() {
        let documents = MemoryDocumentStore::new();
        let blobs = MemoryBlobStore::new();
        let remote = RemoteSync::new(&documents, &blobs);

        let client = Client::with_id("c1", "Jane Smith", "not-an-email", "2024-01-01T00:00:00.000Z");
        assert!(matches!(
            remote.push(&client),
            Err(RemoteError::Rejected { .. })
        ));
        assert_eq!(documents.count(RemoteCollection::Clients), 0);
    }
}
