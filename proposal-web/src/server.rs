//! Proposal Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use chrono::Utc;
use proposal_auth::SessionStore;
use proposal_core::Settings;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct ProposalServer {
    settings: Settings,
    state: AppState,
}

impl ProposalServer {
    pub async fn new(settings: Settings) -> WebResult<Self> {
        settings.validate().map_err(|e| {
            e.log();
            WebError::Config(e.to_string())
        })?;
        let state = AppState::new(settings.clone()).await?;

        Ok(Self { settings, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.settings.server.address();

        info!(
            address = %address,
            session_ttl_minutes = self.settings.auth.session_ttl_minutes,
            "Starting proposal web server"
        );

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        let reaper = spawn_session_reaper(
            self.state.db.clone(),
            self.settings.server.session_reaper_interval_secs,
        );

        let result = serve(listener, app).await;

        if let Some(reaper) = reaper {
            reaper.abort();
        }

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Periodically delete expired sessions. Validation rejects them regardless;
/// this only keeps the table small. An interval of 0 disables it.
pub fn spawn_session_reaper(
    sessions: Arc<dyn SessionStore>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        info!("Session reaper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            match sessions.delete_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Removed expired sessions"),
                Err(e) => warn!(error = %e, "Failed to remove expired sessions"),
            }
        }
    }))
}

/// Builder for ProposalServer
pub struct ProposalServerBuilder {
    settings: Settings,
}

impl ProposalServerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.settings.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.settings.server.port = port;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.settings.database.url = database_url.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<ProposalServer> {
        ProposalServer::new(self.settings).await
    }
}
