//! `TaskFlow` test server library.
//!
//! An in-memory implementation of the task server's HTTP contract,
//! exposed for integration tests and local development. State lives in
//! process memory; nothing survives a restart.

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::state::ServerState;

/// Bind an ephemeral port on localhost and serve in a background task.
///
/// Returns the bound address, a handle to the shared state (so tests
/// can revoke tokens or inspect stored tasks), and the server task.
///
/// # Errors
///
/// Returns an I/O error when the listener cannot be bound.
pub async fn serve_ephemeral()
-> std::io::Result<(SocketAddr, Arc<ServerState>, JoinHandle<()>)> {
    let state = Arc::new(ServerState::new());
    let app = routes::router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "test server stopped");
        }
    });
    Ok((addr, state, handle))
}
