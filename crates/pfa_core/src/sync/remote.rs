//! Remote collaborator contracts: a document store and a blob store.
//!
//! # Responsibility
//! - Name the remote collections and query operators.
//! - Define the untyped document/blob traits that backends implement.
//!
//! # Invariants
//! - `set_document` merges: fields absent from the write keep their value.
//! - The store owns `createdAt` (first write) and `updatedAt` (every write).
//! - Failures are returned unchanged; nothing here retries.

use crate::model::validation::ValidationErrors;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Remote document body.
pub type Document = Map<String, Value>;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RemoteCollection {
    Users,
    Clients,
    Workouts,
    Exercises,
    Assignments,
    Sessions,
    Invitations,
}

impl RemoteCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Clients => "clients",
            Self::Workouts => "workouts",
            Self::Exercises => "exercises",
            Self::Assignments => "assignments",
            Self::Sessions => "sessions",
            Self::Invitations => "invitations",
        }
    }
}

impl Display for RemoteCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field comparison used by `query_documents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    ArrayContains,
    In,
}

impl QueryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::ArrayContains => "array-contains",
            Self::In => "in",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "array-contains" => Some(Self::ArrayContains),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// Remote-side failure.
#[derive(Debug)]
pub enum RemoteError {
    /// Backend rejected or could not serve the call.
    Backend {
        operation: &'static str,
        message: String,
    },
    /// A blob path that does not exist.
    BlobNotFound(String),
    /// A fetched document does not match the entity schema.
    Schema {
        collection: RemoteCollection,
        id: String,
        message: String,
    },
    /// An entity failed validation before it was pushed.
    Rejected {
        collection: RemoteCollection,
        id: String,
        errors: ValidationErrors,
    },
    /// An entity could not be encoded as a document.
    Encode(serde_json::Error),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend { operation, message } => {
                write!(f, "remote {operation} failed: {message}")
            }
            Self::BlobNotFound(path) => write!(f, "blob not found: {path}"),
            Self::Schema {
                collection,
                id,
                message,
            } => write!(f, "malformed document {collection}/{id}: {message}"),
            Self::Rejected {
                collection,
                id,
                errors,
            } => write!(f, "refusing to push {collection}/{id}: {errors}"),
            Self::Encode(err) => write!(f, "failed to encode document: {err}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected { errors, .. } => Some(errors),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

/// Document database collaborator.
pub trait DocumentStore {
    /// Returns the document including its `id` field, `None` when absent.
    fn get_document(&self, collection: RemoteCollection, id: &str)
        -> RemoteResult<Option<Document>>;

    /// Merge-writes `fields` into the document, creating it when absent.
    fn set_document(
        &self,
        collection: RemoteCollection,
        id: &str,
        fields: Document,
    ) -> RemoteResult<()>;

    /// Deleting an absent document succeeds.
    fn delete_document(&self, collection: RemoteCollection, id: &str) -> RemoteResult<()>;

    fn query_documents(
        &self,
        collection: RemoteCollection,
        field: &str,
        op: QueryOp,
        value: &Value,
    ) -> RemoteResult<Vec<Document>>;

    fn list_documents(&self, collection: RemoteCollection) -> RemoteResult<Vec<Document>>;
}

/// Binary object storage collaborator.
pub trait BlobStore {
    /// Stores `bytes` at `path` and returns its download URL.
    fn upload_blob(&self, path: &str, bytes: &[u8]) -> RemoteResult<String>;

    fn delete_blob(&self, path: &str) -> RemoteResult<()>;

    fn download_url(&self, path: &str) -> RemoteResult<String>;
}
