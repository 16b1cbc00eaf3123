//! HTTP surface: the static route table and its axum server.

pub mod router;
pub mod server;
