//! Integration tests for authentication and session persistence.
//!
//! Runs the real `HttpGateway` against an in-process test server:
//! login/register round trips, error detail surfacing, persisted
//! sessions across restarts, and forced credential expiry.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use taskflow::gateway::{GatewayError, HttpGateway};
use taskflow::session::SessionStore;
use taskflow_testserver::state::ServerState;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Spin up a test server and a gateway with a fresh on-disk session.
async fn setup() -> (HttpGateway, Arc<ServerState>, tempfile::TempDir) {
    let (addr, state, _handle) = taskflow_testserver::serve_ephemeral()
        .await
        .expect("bind test server");
    let dir = tempfile::tempdir().expect("create temp dir");
    let session = Arc::new(SessionStore::init(dir.path().to_path_buf()));
    let gateway = HttpGateway::new(format!("http://{addr}"), session);
    (gateway, state, dir)
}

// ---------------------------------------------------------------------------
// Registration and login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_starts_a_session() {
    let (gateway, _state, _dir) = setup().await;

    let auth = gateway
        .register("alice@example.com", "hunter2", Some("Alice"))
        .await
        .expect("register");
    assert_eq!(auth.user.email, "alice@example.com");
    assert_eq!(auth.user.name.as_deref(), Some("Alice"));
    assert!(gateway.session().is_active());

    let me = gateway.fetch_current_user().await.expect("me");
    assert_eq!(me.id, auth.user.id);
}

#[tokio::test]
async fn login_after_register_round_trips() {
    let (gateway, _state, _dir) = setup().await;
    gateway
        .register("bob@example.com", "pw", None)
        .await
        .expect("register");
    gateway.logout();
    assert!(!gateway.session().is_active());

    let auth = gateway.login("bob@example.com", "pw").await.expect("login");
    assert_eq!(auth.user.email, "bob@example.com");
    assert!(gateway.session().is_active());
}

#[tokio::test]
async fn wrong_password_surfaces_server_detail() {
    let (gateway, _state, _dir) = setup().await;
    gateway
        .register("carol@example.com", "right", None)
        .await
        .expect("register");
    gateway.logout();

    let err = gateway
        .login("carol@example.com", "wrong")
        .await
        .expect_err("login must fail");
    match err {
        GatewayError::Unauthorized { message } => {
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
    assert!(!gateway.session().is_active());
}

#[tokio::test]
async fn duplicate_email_surfaces_server_detail() {
    let (gateway, _state, _dir) = setup().await;
    gateway
        .register("dave@example.com", "pw", None)
        .await
        .expect("register");

    let err = gateway
        .register("dave@example.com", "other", None)
        .await
        .expect_err("duplicate register must fail");
    match err {
        GatewayError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Email already registered");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Session persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_survives_a_client_restart() {
    let (gateway, _state, dir) = setup().await;
    let auth = gateway
        .register("erin@example.com", "pw", None)
        .await
        .expect("register");
    assert!(gateway.session().token().is_some());
    drop(gateway);

    // A fresh store over the same directory picks up the session.
    let session = Arc::new(SessionStore::init(dir.path().to_path_buf()));
    assert!(session.is_active());
    let restored = session.get().expect("restored session");
    assert_eq!(restored.user.id, auth.user.id);
}

#[tokio::test]
async fn logout_clears_the_persisted_session() {
    let (gateway, _state, dir) = setup().await;
    gateway
        .register("frank@example.com", "pw", None)
        .await
        .expect("register");
    gateway.logout();

    let session = Arc::new(SessionStore::init(dir.path().to_path_buf()));
    assert!(!session.is_active());
}

// ---------------------------------------------------------------------------
// Credential expiry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn revoked_token_ends_the_session() {
    let (gateway, state, _dir) = setup().await;
    let auth = gateway
        .register("grace@example.com", "pw", None)
        .await
        .expect("register");

    // Server-side revocation, as if the token expired.
    state.revoke_tokens(auth.user.id).await;

    let err = gateway
        .fetch_current_user()
        .await
        .expect_err("stale token must be rejected");
    assert!(err.is_auth());
    // The 401 cleared the stored session as a side effect.
    assert!(!gateway.session().is_active());
}

#[tokio::test]
async fn unauthenticated_request_is_unauthorized() {
    let (gateway, _state, _dir) = setup().await;
    let err = gateway
        .fetch_current_user()
        .await
        .expect_err("no session, no access");
    assert!(err.is_auth());
}
