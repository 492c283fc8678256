use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{BackendClient, RemoteSessionGate};
use crate::config::{Config, StoreMode};
use crate::models::Session;
use crate::services::{
    AuthError, BeehiveError, BeehiveService, LocalBeehiveService, LocalSessionGate, SessionGate,
    View,
};
use crate::store::Store;

/// Services wired for the configured store mode.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub hives: Arc<dyn BeehiveService>,

    pub gate: Arc<dyn SessionGate>,

    /// Only present in local mode.
    pub local: Option<Arc<LocalBeehiveService>>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.store).await?;
        Self::with_store(config, store).await
    }

    pub async fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let state = match config.store.mode {
            StoreMode::Local => {
                let local = Arc::new(LocalBeehiveService::new(
                    store.clone(),
                    config.identifiers.clone(),
                ));
                let gate =
                    LocalSessionGate::new(store.clone(), config.account.clone(), &config.security)
                        .await?;

                Self {
                    hives: local.clone(),
                    gate: Arc::new(gate),
                    local: Some(local),
                    store,
                    config,
                }
            }
            StoreMode::Remote => {
                let client = BackendClient::new(&config.backend)?;
                info!(base_url = %client.base_url(), "Using remote backend");

                Self {
                    hives: Arc::new(client.clone()),
                    gate: Arc::new(RemoteSessionGate::new(client, store.clone())),
                    local: None,
                    store,
                    config,
                }
            }
        };

        Ok(state)
    }

    /// Session allowed to reach `view`, or an error naming the next step.
    pub async fn require(&self, view: View) -> anyhow::Result<Session> {
        match self.gate.require(view).await {
            Ok(session) => Ok(session),
            Err(AuthError::NotLoggedIn) => {
                anyhow::bail!("Not logged in. Run `hivekeep login <username>` first")
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Passes `result` through, clearing the stored session first when the
    /// backend rejected it.
    pub async fn settle<T>(&self, result: Result<T, BeehiveError>) -> anyhow::Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.is_auth_failure() {
                    warn!("Session rejected by backend, clearing it");
                    if let Err(e) = self.store.clear_session().await {
                        warn!(error = %e, "Failed to clear rejected session");
                    }
                    anyhow::bail!("{err}. Run `hivekeep login <username>` again");
                }
                Err(err.into())
            }
        }
    }

    pub fn local_only(&self, what: &str) -> anyhow::Result<&LocalBeehiveService> {
        self.local
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("`{what}` is only available with store.mode = \"local\""))
    }
}
