//! Installation records, keyed the way the add-on settings store keys them:
//! `<client_key>:<field>`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::core::models::ClientInfo;
use crate::errors::BotError;

#[async_trait]
pub trait InstallationStore: Send + Sync {
    async fn save_client(&self, client_info: ClientInfo) -> Result<(), BotError>;

    async fn get_client(&self, client_key: &str) -> Result<Option<ClientInfo>, BotError>;

    /// Removes every record stored under `client_key`, returning how many went.
    async fn remove_client(&self, client_key: &str) -> Result<usize, BotError>;
}

/// Process-local [`InstallationStore`].
#[derive(Default)]
pub struct MemoryInstallationStore {
    entries: RwLock<HashMap<String, ClientInfo>>,
}

impl MemoryInstallationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_info_key(client_key: &str) -> String {
        format!("{client_key}:clientInfo")
    }
}

#[async_trait]
impl InstallationStore for MemoryInstallationStore {
    async fn save_client(&self, client_info: ClientInfo) -> Result<(), BotError> {
        let key = Self::client_info_key(&client_info.client_key);
        self.entries.write().await.insert(key, client_info);
        Ok(())
    }

    async fn get_client(&self, client_key: &str) -> Result<Option<ClientInfo>, BotError> {
        let key = Self::client_info_key(client_key);
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn remove_client(&self, client_key: &str) -> Result<usize, BotError> {
        let prefix = format!("{client_key}:");
        let mut entries = self.entries.write().await;
        let doomed: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();

        for key in &doomed {
            info!("Removing key: {}", key);
            entries.remove(key);
        }
        Ok(doomed.len())
    }
}
