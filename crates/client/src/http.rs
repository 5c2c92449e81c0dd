//! Reqwest client for the shop's order and inventory endpoints.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use stockroute_core::{
    ItemCategory, LineItem, Order, OrderId, ProcessError, ProcessResult, ProductId, ProductKey,
    VariantId, WarehouseId,
};
use stockroute_routing::{StockReading, StockSource};

use crate::cache::StockCache;
use crate::gateway::{MutationOutcome, OrderGateway, WarehouseWriter};

/// Basic-auth credentials for the backend's admin API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key: String,
    pub password: String,
}

/// HTTP client for the shop backend.
///
/// One instance per process; cheap to share behind an `Arc`. Variant
/// resolution results are memoized for the client's lifetime (the
/// variant→product mapping is immutable on the backend).
pub struct ShopClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    cache: Option<StockCache>,
    resolved_variants: Mutex<HashMap<VariantId, ProductId>>,
}

impl ShopClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, cache: Option<StockCache>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            credentials,
            cache,
            resolved_variants: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.credentials.key, Some(&self.credentials.password))
    }

    fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .put(format!("{}{}", self.base_url, path))
            .basic_auth(&self.credentials.key, Some(&self.credentials.password))
    }

    /// Canonical product id for a lookup key.
    ///
    /// `Ok(None)` means the backend has no such variant (missing data, not
    /// a failed call).
    async fn resolve(&self, key: ProductKey) -> ProcessResult<Option<ProductId>> {
        let variant = match key {
            ProductKey::Product(id) => return Ok(Some(id)),
            ProductKey::Variant(id) => id,
        };

        if let Some(hit) = self.resolved_variants.lock().await.get(&variant) {
            return Ok(Some(*hit));
        }

        let response = self
            .get(&format!("/admin/variants/{variant}.json"))
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let payload: VariantEnvelope = response.json().await.map_err(transport)?;
                let product = ProductId::new(payload.variant.product_id);
                self.resolved_variants.lock().await.insert(variant, product);
                Ok(Some(product))
            }
            status => Err(ProcessError::transient(format!(
                "variant lookup returned {status}"
            ))),
        }
    }

    /// Stock for one (product, warehouse) pair, bypassing the cache.
    async fn quantity_direct(&self, product: ProductId, warehouse: WarehouseId) -> ProcessResult<u64> {
        let response = self
            .get(&format!("/admin/products/{product}/stock.json"))
            .query(&[("warehouse_id", warehouse.as_i64())])
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(0),
            status if status.is_success() => {
                let payload: StockEnvelope = response.json().await.map_err(transport)?;
                Ok(payload.available.unwrap_or(0))
            }
            status => Err(ProcessError::transient(format!(
                "stock lookup returned {status}"
            ))),
        }
    }

    /// Bulk stock listing for a warehouse, as the cache stores it.
    async fn warehouse_listing(&self, warehouse: WarehouseId) -> ProcessResult<HashMap<ProductId, u64>> {
        let response = self
            .get(&format!("/admin/warehouses/{warehouse}/stock.json"))
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(HashMap::new()),
            status if status.is_success() => {
                let rows: Vec<WarehouseStockRow> = response.json().await.map_err(transport)?;
                Ok(rows
                    .into_iter()
                    .map(|row| (ProductId::new(row.product_id), row.available.unwrap_or(0)))
                    .collect())
            }
            status => Err(ProcessError::transient(format!(
                "warehouse listing returned {status}"
            ))),
        }
    }

    async fn try_available(&self, key: ProductKey, warehouse: WarehouseId) -> ProcessResult<u64> {
        let Some(product) = self.resolve(key).await? else {
            return Ok(0);
        };

        let Some(cache) = &self.cache else {
            return self.quantity_direct(product, warehouse).await;
        };

        if let Some(level) = cache.available(warehouse, product).await {
            return Ok(level);
        }
        let listing = self.warehouse_listing(warehouse).await?;
        let level = listing.get(&product).copied().unwrap_or(0);
        cache.put(warehouse, listing).await;
        Ok(level)
    }
}

#[async_trait]
impl StockSource for ShopClient {
    /// Single attempt, no retries: a failed call degrades to `Unknown` and
    /// the policy layer deals with it conservatively.
    async fn available(&self, product: ProductKey, warehouse: WarehouseId) -> StockReading {
        match self.try_available(product, warehouse).await {
            Ok(quantity) => StockReading::Available(quantity),
            Err(err) => {
                tracing::warn!(%product, %warehouse, %err, "stock lookup failed");
                StockReading::Unknown
            }
        }
    }
}

#[async_trait]
impl OrderGateway for ShopClient {
    async fn fetch_order(&self, id: OrderId) -> ProcessResult<Order> {
        let response = self
            .get(&format!("/admin/orders/{id}.json"))
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProcessError::NotFound),
            status if status.is_success() => {
                let envelope: OrderEnvelope = response.json().await.map_err(transport)?;
                Ok(envelope.order.into())
            }
            status => Err(ProcessError::transient(format!(
                "order fetch returned {status}"
            ))),
        }
    }

    async fn recent_orders(&self, since: DateTime<Utc>) -> ProcessResult<Vec<OrderId>> {
        let response = self
            .get("/admin/orders.json")
            .query(&[("updated_since", since.to_rfc3339())])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(ProcessError::transient(format!(
                "order listing returned {}",
                response.status()
            )));
        }

        let listing: OrderListEnvelope = response.json().await.map_err(transport)?;
        Ok(listing
            .orders
            .into_iter()
            .map(|summary| OrderId::new(summary.id))
            .collect())
    }
}

#[async_trait]
impl WarehouseWriter for ShopClient {
    async fn assign_warehouse(
        &self,
        id: OrderId,
        target: WarehouseId,
    ) -> ProcessResult<MutationOutcome> {
        let current = self.fetch_order(id).await?;
        if current.warehouse == Some(target) {
            return Ok(MutationOutcome::AlreadyAssigned);
        }

        let body = serde_json::json!({ "order": { "warehouse_id": target.as_i64() } });
        let response = self
            .put(&format!("/admin/orders/{id}.json"))
            .json(&body)
            .send()
            .await
            .map_err(|err| ProcessError::mutation(target, err.to_string()))?;

        if !response.status().is_success() {
            return Err(ProcessError::mutation(
                target,
                format!("write returned {}", response.status()),
            ));
        }

        // Success is only reported once the backend shows the new value.
        let written = self
            .fetch_order(id)
            .await
            .map_err(|err| ProcessError::mutation(target, format!("verification read failed: {err}")))?;
        if written.warehouse != Some(target) {
            return Err(ProcessError::mutation(
                target,
                "verification read does not show the new assignment",
            ));
        }

        Ok(MutationOutcome::Applied)
    }
}

fn transport(err: reqwest::Error) -> ProcessError {
    ProcessError::transient(err.to_string())
}

// Wire shapes of the backend's admin API.

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: OrderPayload,
}

#[derive(Debug, Deserialize)]
struct OrderPayload {
    id: i64,
    warehouse_id: Option<i64>,
    #[serde(default)]
    order_lines: Vec<OrderLinePayload>,
}

#[derive(Debug, Deserialize)]
struct OrderLinePayload {
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default)]
    variant_id: Option<i64>,
    quantity: u32,
    #[serde(default = "physical")]
    category: ItemCategory,
}

// Lines without a category are stock-checked rather than waved through.
fn physical() -> ItemCategory {
    ItemCategory::Physical
}

impl From<OrderPayload> for Order {
    fn from(payload: OrderPayload) -> Self {
        let lines = payload
            .order_lines
            .into_iter()
            .map(|line| {
                let product = match (line.product_id, line.variant_id) {
                    (Some(product), _) => Some(ProductKey::Product(ProductId::new(product))),
                    (None, Some(variant)) => Some(ProductKey::Variant(VariantId::new(variant))),
                    (None, None) => None,
                };
                LineItem {
                    product,
                    quantity: line.quantity,
                    category: line.category,
                }
            })
            .collect();

        Order {
            id: OrderId::new(payload.id),
            warehouse: payload.warehouse_id.map(WarehouseId::new),
            lines,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VariantEnvelope {
    variant: VariantPayload,
}

#[derive(Debug, Deserialize)]
struct VariantPayload {
    product_id: i64,
}

#[derive(Debug, Deserialize)]
struct StockEnvelope {
    available: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WarehouseStockRow {
    product_id: i64,
    available: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OrderListEnvelope {
    orders: Vec<OrderSummaryPayload>,
}

#[derive(Debug, Deserialize)]
struct OrderSummaryPayload {
    id: i64,
}
