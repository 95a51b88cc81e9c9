//! `TaskFlow` test server -- in-memory task API for local development.
//!
//! ```bash
//! # Run on the default address 127.0.0.1:8000
//! cargo run --bin taskflow-testserver
//!
//! # Run on a custom address
//! cargo run --bin taskflow-testserver -- --bind 127.0.0.1:9001
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use taskflow_testserver::routes;
use taskflow_testserver::state::ServerState;

#[derive(clap::Parser, Debug)]
#[command(version, about = "In-memory task server for local development")]
struct CliArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000", env = "TASKFLOW_SERVER_ADDR")]
    bind: SocketAddr,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKFLOW_SERVER_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %cli.bind, "starting taskflow test server");

    let state = Arc::new(ServerState::new());
    let app = routes::router(state);

    let listener = match tokio::net::TcpListener::bind(cli.bind).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
