//! Service wiring: one backend client, one decision engine, shared state.

use std::sync::Arc;

use stockroute_client::{ShopClient, StockCache};
use stockroute_routing::DecisionEngine;

use crate::config::AppConfig;

/// Shared per-process services, built once from configuration.
pub struct AppServices {
    client: Arc<ShopClient>,
    engine: DecisionEngine<Arc<ShopClient>>,
    poll_window: chrono::Duration,
}

impl AppServices {
    pub fn build(config: &AppConfig) -> Self {
        let cache = config.stock_cache_ttl.map(StockCache::new);
        let client = Arc::new(ShopClient::new(
            config.backend.base_url.clone(),
            config.backend.credentials.clone(),
            cache,
        ));

        let engine = DecisionEngine::new(
            client.clone(),
            config.topology.clone(),
            config.policy.clone(),
        );

        Self {
            client,
            engine,
            poll_window: config.poll_window,
        }
    }

    /// Order reads and warehouse writes.
    pub fn backend(&self) -> &Arc<ShopClient> {
        &self.client
    }

    pub fn engine(&self) -> &DecisionEngine<Arc<ShopClient>> {
        &self.engine
    }

    pub fn poll_window(&self) -> chrono::Duration {
        self.poll_window
    }
}
