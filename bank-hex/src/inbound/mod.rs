//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the ledger and payment services.

mod auth;
mod handlers;
mod server;

pub use handlers::{ApiError, AppState};
pub use server::HttpServer;
