//! API server module: the write-protected query endpoint and the health check

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;
pub mod validation;

pub use server::build_app;
pub use server::serve_api;
