//! Application state.

use std::sync::Arc;

use tracing::info;

use jobboard_firestore::{FirestoreClient, JobRepository};

use crate::auth::ApiKeyVerifier;
use crate::config::{ApiConfig, StoreBackend};
use crate::store::{JobStore, MemoryJobStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub api_key: ApiKeyVerifier,
}

impl AppState {
    /// Create application state for the configured store backend.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn JobStore> = match config.store {
            StoreBackend::Firestore => {
                let client = FirestoreClient::from_env().await?;
                Arc::new(JobRepository::new(client))
            }
            StoreBackend::Memory => Arc::new(MemoryJobStore::new()),
        };
        info!(store = %config.store, "Job store initialized");

        Ok(Self::with_store(config, store))
    }

    /// Build state around an existing store.
    pub fn with_store(config: ApiConfig, store: Arc<dyn JobStore>) -> Self {
        let api_key = ApiKeyVerifier::new(config.api_key.as_deref());
        Self {
            config,
            store,
            api_key,
        }
    }
}
