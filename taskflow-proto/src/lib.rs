//! Shared wire-schema definitions for the `TaskFlow` HTTP API.
//!
//! Field names match the server's JSON contract exactly; every type in
//! this crate is pure data shared by the client and the test server.

pub mod auth;
pub mod task;
