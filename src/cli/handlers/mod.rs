//! CLI command handlers module
//!
//! - serve: API server
//! - rag: one-shot questions and index builds
//! - init: database initialization
//! - keygen: API key generation

pub mod init;
pub mod keygen;
pub mod rag;
pub mod serve;

pub use init::*;
pub use keygen::*;
pub use rag::*;
pub use serve::*;
