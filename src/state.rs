use std::sync::Arc;

use tokio::task::spawn_blocking;
use tracing::info;

use crate::{
    auth::{
        jwt::TokenService,
        store::{CredentialStore, DEMO_ACCOUNTS, MemoryCredentialStore},
    },
    config::Config,
    error::AppError,
    logs::LogCache,
};

#[derive(Clone)]
pub struct AppState {
    pub logs: Arc<LogCache>,
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<dyn CredentialStore>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(
        logs: LogCache,
        tokens: TokenService,
        credentials: Arc<dyn CredentialStore>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            logs: Arc::new(logs),
            tokens: Arc::new(tokens),
            credentials,
            bcrypt_cost,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let state = Self::new(
            LogCache::new(config.log_file.clone()),
            TokenService::new(&config.jwt_secret),
            Arc::new(MemoryCredentialStore::new()),
            config.bcrypt_cost,
        );

        if config.seed_demo_users {
            state.seed_demo_accounts().await?;
        }
        Ok(state)
    }

    pub async fn seed_demo_accounts(&self) -> Result<(), AppError> {
        for &(username, password) in DEMO_ACCOUNTS {
            let cost = self.bcrypt_cost;
            let hash = spawn_blocking(move || bcrypt::hash(password, cost)).await??;
            self.credentials.put(username, hash).await?;
        }
        info!(count = DEMO_ACCOUNTS.len(), "Seeded demo accounts");
        Ok(())
    }
}
