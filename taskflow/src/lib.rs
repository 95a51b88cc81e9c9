//! `TaskFlow`, a terminal task manager synced against a remote HTTP API.

pub mod app;
pub mod config;
pub mod gateway;
pub mod session;
pub mod sync;
pub mod ui;
pub mod worker;
