//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten core errors into message envelopes the UI can render.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the configured database; no connection outlives a call.
//! - Validation failures come back field-keyed, never as a bare string.

use log::warn;
use pfa_core::model::athlete::{Client, ClientForm};
use pfa_core::model::invitation::parse_invite_link;
use pfa_core::{
    classify, core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, AuthSession, CoreConfig, LocalStore, RosterService, ServiceError,
    SqliteKvStore, TransferService,
};
use std::path::PathBuf;
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One failed form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// camelCase field name, e.g. `email` or `exercises[0].targetReps`.
    pub field: String,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created or affected record.
    pub id: Option<String>,
    /// Human-readable result for diagnostics/UI.
    pub message: String,
    /// Non-empty only for validation failures.
    pub field_errors: Vec<FieldError>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    fn failure(context: &str, err: ServiceError) -> Self {
        let field_errors = match &err {
            ServiceError::Validation(errors) => errors
                .fields()
                .iter()
                .map(|(field, message)| FieldError {
                    field: field.clone(),
                    message: message.clone(),
                })
                .collect(),
            _ => Vec::new(),
        };
        warn!(
            "event=ffi_call module=ffi status=error call={} fields={}",
            context,
            field_errors.len()
        );
        Self {
            ok: false,
            id: None,
            message: format!("{context} failed: {err}"),
            field_errors,
        }
    }

    fn message_only(message: String) -> Self {
        Self {
            ok: false,
            id: None,
            message,
            field_errors: Vec::new(),
        }
    }
}

/// Athlete row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientItem {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub photo_uri: Option<String>,
    pub invitation_sent: bool,
}

impl From<Client> for ClientItem {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            email: client.email,
            phone: client.phone,
            photo_uri: client.photo_uri,
            invitation_sent: client.invitation_sent.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientListResponse {
    pub items: Vec<ClientItem>,
    pub message: String,
}

/// Export payload envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// Pretty-printed JSON document; empty on failure.
    pub payload: String,
    pub message: String,
}

/// Creates an athlete from the coach form.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the new id on success and field errors on invalid input.
#[flutter_rust_bridge::frb(sync)]
pub fn client_create(
    name: String,
    email: String,
    phone: Option<String>,
    notes: Option<String>,
) -> ActionResponse {
    let form = ClientForm {
        name,
        email,
        phone,
        notes,
    };
    let result = with_store(|store| {
        let session = AuthSession::restore(&store.account());
        RosterService::new(store, &session).create_client(form)
    });
    match result {
        Ok(client) => ActionResponse::success("Client created.", Some(client.id)),
        Err(err) => ActionResponse::failure("client_create", err),
    }
}

/// Lists every athlete in stored order.
#[flutter_rust_bridge::frb(sync)]
pub fn clients_list() -> ClientListResponse {
    match with_store(|store| {
        let session = AuthSession::restore(&store.account());
        Ok(RosterService::new(store, &session).list_clients())
    }) {
        Ok(clients) => ClientListResponse {
            message: format!("{} client(s).", clients.len()),
            items: clients.into_iter().map(ClientItem::from).collect(),
        },
        Err(err) => ClientListResponse {
            items: Vec::new(),
            message: format!("clients_list failed: {err}"),
        },
    }
}

/// Deletes an athlete; assignments and sessions are kept.
#[flutter_rust_bridge::frb(sync)]
pub fn client_delete(client_id: String) -> ActionResponse {
    let result = with_store(|store| {
        let session = AuthSession::restore(&store.account());
        RosterService::new(store, &session).delete_client(client_id.trim())
    });
    match result {
        Ok(true) => ActionResponse::success("Client deleted.", Some(client_id)),
        Ok(false) => ActionResponse::success("Client was already gone.", None),
        Err(err) => ActionResponse::failure("client_delete", err),
    }
}

/// Exports every collection as pretty-printed JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn data_export() -> ExportResponse {
    let db_path = resolve_db_path();
    let exported = open_db(&db_path)
        .map_err(|err| format!("data_export failed: {err}"))
        .and_then(|conn| {
            let store = LocalStore::sqlite(&conn);
            TransferService::new(&store)
                .export_all()
                .map_err(|err| format!("data_export failed: {err}"))
        });
    match exported {
        Ok(payload) => ExportResponse {
            ok: true,
            payload,
            message: "Export ready.".to_string(),
        },
        Err(message) => ExportResponse {
            ok: false,
            payload: String::new(),
            message,
        },
    }
}

/// Replaces collections from an export document; all or nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn data_import(payload: String) -> ActionResponse {
    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return ActionResponse::message_only(format!("data_import failed: {err}")),
    };
    let store = LocalStore::sqlite(&conn);
    match TransferService::new(&store).import_all(&payload) {
        Ok(summary) => ActionResponse::success(
            format!("Imported {} collection(s).", summary.collections.len()),
            None,
        ),
        Err(err) => ActionResponse::message_only(err.to_string()),
    }
}

/// Rates `actual` against `target`: `exceeded|met|close|under`.
#[flutter_rust_bridge::frb(sync)]
pub fn performance_rating(actual: f64, target: f64) -> String {
    classify(actual, target).as_str().to_string()
}

/// Extracts the invitation code from a `pfa://invite?code=` link.
#[flutter_rust_bridge::frb(sync)]
pub fn invite_code_from_link(uri: String) -> Option<String> {
    parse_invite_link(&uri)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&LocalStore<SqliteKvStore<'_>>) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let conn = open_db(resolve_db_path())
        .map_err(|err| ServiceError::Repo(pfa_core::RepoError::Db(err)))?;
    let store = LocalStore::sqlite(&conn);
    f(&store)
}

#[cfg(test)]
mod tests {
    use super::{
        client_create, clients_list, core_version, data_export, data_import, init_logging,
        invite_code_from_link, performance_rating, ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn invalid_client_form_returns_field_errors() {
        let response = client_create("J".to_string(), "nope".to_string(), None, None);
        assert!(!response.ok);
        let fields: Vec<&str> = response
            .field_errors
            .iter()
            .map(|error| error.field.as_str())
            .collect();
        assert_eq!(fields, vec!["email", "name"]);
    }

    #[test]
    fn created_client_is_listed() {
        let response = client_create(
            "Jordan Reyes".to_string(),
            "jordan@example.com".to_string(),
            Some("+1 555 0100".to_string()),
            None,
        );
        assert!(response.ok, "{}", response.message);
        let id = response.id.expect("created client should return id");

        let listed = clients_list();
        assert!(listed.items.iter().any(|item| item.id == id));
    }

    #[test]
    fn export_produces_json_and_bad_import_is_rejected() {
        let exported = data_export();
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.payload.contains("\"exerciseLogs\""));

        let rejected = data_import("{\"clients\": [{\"id\": 1}]}".to_string());
        assert!(!rejected.ok);
        assert!(rejected.message.starts_with("failed to import data"));
    }

    #[test]
    fn rating_and_link_helpers() {
        assert_eq!(performance_rating(8.0, 10.0), "close");
        assert_eq!(
            invite_code_from_link("pfa://invite?code=abc".to_string()).as_deref(),
            Some("abc")
        );
    }
}
