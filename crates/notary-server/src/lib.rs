//! HTTP server for the document notary.
//!
//! Exposes the upload/commit protocol and the read path over a small REST
//! API. The request body of an upload is consumed as a stream, so documents
//! are never buffered in memory.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use server::NotaryServer;
pub use state::AppState;
