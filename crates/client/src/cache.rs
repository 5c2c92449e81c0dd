//! Short-lived cache of per-warehouse bulk stock listings.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use stockroute_core::{ProductId, WarehouseId};

/// Caches the bulk stock listing of a warehouse for a freshness window.
///
/// Keys are warehouse ids; entries expire after the TTL and are never
/// written back to the backend. A product missing from a fresh listing
/// means zero stock, not a miss.
#[derive(Debug)]
pub struct StockCache {
    ttl: Duration,
    listings: Mutex<HashMap<WarehouseId, CachedListing>>,
}

#[derive(Debug)]
struct CachedListing {
    taken_at: Instant,
    levels: HashMap<ProductId, u64>,
}

impl StockCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            listings: Mutex::new(HashMap::new()),
        }
    }

    /// Available quantity from a fresh listing, or `None` when no fresh
    /// listing exists for the warehouse.
    pub async fn available(&self, warehouse: WarehouseId, product: ProductId) -> Option<u64> {
        self.available_at(warehouse, product, Instant::now()).await
    }

    /// Store a freshly fetched listing for `warehouse`.
    pub async fn put(&self, warehouse: WarehouseId, levels: HashMap<ProductId, u64>) {
        self.put_at(warehouse, levels, Instant::now()).await;
    }

    async fn available_at(
        &self,
        warehouse: WarehouseId,
        product: ProductId,
        now: Instant,
    ) -> Option<u64> {
        let mut listings = self.listings.lock().await;
        match listings.get(&warehouse) {
            Some(listing) if now.duration_since(listing.taken_at) < self.ttl => {
                Some(listing.levels.get(&product).copied().unwrap_or(0))
            }
            Some(_) => {
                listings.remove(&warehouse);
                None
            }
            None => None,
        }
    }

    async fn put_at(&self, warehouse: WarehouseId, levels: HashMap<ProductId, u64>, now: Instant) {
        let mut listings = self.listings.lock().await;
        listings.insert(
            warehouse,
            CachedListing {
                taken_at: now,
                levels,
            },
        );
    }
}
