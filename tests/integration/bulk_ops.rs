//! Integration tests for bulk operations against a live server.
//!
//! Bulk operations issue one request per task and are not
//! transactional: confirmed outcomes stick even when another item in
//! the batch fails.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use taskflow::gateway::HttpGateway;
use taskflow::session::SessionStore;
use taskflow::sync::{SyncError, TaskDraft, TaskStore};
use taskflow_proto::task::TaskId;
use taskflow_testserver::state::ServerState;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn setup() -> (TaskStore<HttpGateway>, Arc<ServerState>, tempfile::TempDir) {
    let (addr, state, _handle) = taskflow_testserver::serve_ephemeral()
        .await
        .expect("bind test server");
    let dir = tempfile::tempdir().expect("create temp dir");
    let session = Arc::new(SessionStore::init(dir.path().to_path_buf()));
    let gateway = HttpGateway::new(format!("http://{addr}"), session);
    let auth = gateway
        .register("user@example.com", "pw", None)
        .await
        .expect("register");
    let mut store = TaskStore::new(gateway, auth.user.id);
    store.load().await.expect("initial load");
    (store, state, dir)
}

/// Create `n` tasks and return their ids in creation order.
async fn seed_tasks(store: &mut TaskStore<HttpGateway>, n: usize) -> Vec<TaskId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let draft = TaskDraft {
            title: format!("Task {i}"),
            ..TaskDraft::default()
        };
        ids.push(store.create(&draft).await.expect("create"));
    }
    ids
}

// ---------------------------------------------------------------------------
// Clean runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_completed_clears_only_completed_tasks() {
    let (mut store, _state, _dir) = setup().await;
    let ids = seed_tasks(&mut store, 3).await;
    store.toggle_completion(ids[0]).await.expect("complete");
    store.toggle_completion(ids[2]).await.expect("complete");

    let deleted = store.delete_completed().await.expect("bulk delete");
    assert_eq!(deleted, 2);

    store.load().await.expect("reload");
    let remaining: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![ids[1]]);
}

#[tokio::test]
async fn complete_all_marks_every_open_task() {
    let (mut store, _state, _dir) = setup().await;
    let ids = seed_tasks(&mut store, 3).await;
    store.toggle_completion(ids[1]).await.expect("complete");

    let completed = store.complete_all().await.expect("bulk complete");
    assert_eq!(completed, 2);

    store.load().await.expect("reload");
    assert!(store.tasks().iter().all(|t| t.completed));
}

#[tokio::test]
async fn bulk_operations_on_empty_sets_are_no_ops() {
    let (mut store, _state, _dir) = setup().await;
    seed_tasks(&mut store, 2).await;

    // Nothing is completed, so there is nothing to delete.
    assert_eq!(store.delete_completed().await.expect("bulk delete"), 0);
    assert_eq!(store.tasks().len(), 2);
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_completed_continues_past_a_failing_item() {
    let (mut store, state, _dir) = setup().await;
    let ids = seed_tasks(&mut store, 3).await;
    for id in &ids {
        store.toggle_completion(*id).await.expect("complete");
    }

    // Remove the middle task behind the client's back so its delete
    // 404s mid-batch.
    assert!(state.delete_task(store.user_id(), ids[1]).await);

    let err = store
        .delete_completed()
        .await
        .expect_err("one item must fail");
    assert!(matches!(err, SyncError::Mutation(_)));

    // First and third were confirmed and removed; the failing one
    // stays in the local collection until the next refresh.
    let local: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(local, vec![ids[1]]);

    // The server agrees nothing is left.
    store.load().await.expect("reload");
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn complete_all_continues_past_a_failing_item() {
    let (mut store, state, _dir) = setup().await;
    let ids = seed_tasks(&mut store, 3).await;

    assert!(state.delete_task(store.user_id(), ids[1]).await);

    let err = store.complete_all().await.expect_err("one item must fail");
    assert!(matches!(err, SyncError::Mutation(_)));

    // The surviving tasks were completed despite the failure.
    store.load().await.expect("reload");
    let completed: Vec<TaskId> = store
        .tasks()
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.id)
        .collect();
    assert_eq!(completed, vec![ids[0], ids[2]]);
}
