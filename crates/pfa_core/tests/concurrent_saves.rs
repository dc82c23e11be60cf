use pfa_core::db::open_db_in_memory;
use pfa_core::model::athlete::Client;
use pfa_core::{LocalStore, RepoError};

const CREATED_AT: &str = "2024-03-01T09:00:00.000Z";

fn client(id: &str) -> Client {
    Client::with_id(id, "Jordan Reyes", "jordan@example.com", CREATED_AT)
}

#[test]
fn interleaved_blind_saves_lose_one_record() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    let clients = store.clients();

    let first = clients.stage_save(&client("c1"));
    let second = clients.stage_save(&client("c2"));
    clients.commit(first).unwrap();
    clients.commit(second).unwrap();

    let ids: Vec<String> = clients.get_all().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c2".to_string()]);
}

#[test]
fn checked_commit_rejects_stale_write() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    let clients = store.clients();
    clients.save(&client("c0")).unwrap();

    let first = clients.stage_save(&client("c1"));
    let second = clients.stage_save(&client("c2"));
    assert_eq!(first.base_revision(), Some(1));
    clients.commit_checked(first).unwrap();

    match clients.commit_checked(second).unwrap_err() {
        RepoError::Conflict {
            key,
            expected,
            actual,
        } => {
            assert_eq!(key, "@pfa/clients");
            assert_eq!(expected, Some(1));
            assert_eq!(actual, Some(2));
        }
        other => panic!("unexpected error: {other}"),
    }

    let retry = clients.stage_save(&client("c2"));
    clients.commit_checked(retry).unwrap();
    let ids: Vec<String> = clients.get_all().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["c0", "c1", "c2"]);
}

#[test]
fn checked_commit_on_absent_key_conflicts_with_first_writer() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    let clients = store.clients();

    let first = clients.stage_save(&client("c1"));
    let second = clients.stage_save(&client("c2"));
    assert_eq!(second.base_revision(), None);
    clients.commit_checked(first).unwrap();

    assert!(matches!(
        clients.commit_checked(second),
        Err(RepoError::Conflict {
            expected: None,
            actual: Some(1),
            ..
        })
    ));
}
