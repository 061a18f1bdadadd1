use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Document notary server.
pub struct NotaryServer {
    config: ServerConfig,
    state: AppState,
}

impl NotaryServer {
    /// Open storage and the ledger as configured.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    /// Serve prebuilt state, e.g. with a different ledger backend.
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.max_upload_size)
    }

    /// Start serving requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "notary server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        info!("notary server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_blob::BlobStoreConfig;

    fn config(dir: &tempfile::TempDir) -> ServerConfig {
        ServerConfig {
            storage: BlobStoreConfig::with_root(dir.path().join("blobs")),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn server_construction() {
        let dir = tempfile::tempdir().unwrap();
        let server = NotaryServer::new(config(&dir)).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:50051".parse().unwrap());
        assert!(dir.path().join("blobs").is_dir());
    }

    #[test]
    fn router_builds() {
        let dir = tempfile::tempdir().unwrap();
        let server = NotaryServer::new(config(&dir)).unwrap();
        let _router = server.router();
    }

    #[test]
    fn unreadable_journal_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = config(&dir);
        // A directory cannot be opened as the journal file.
        c.ledger = notary_ledger::JournalConfig::at(dir.path());
        assert!(matches!(NotaryServer::new(c), Err(ServerError::Ledger(_))));
    }
}
