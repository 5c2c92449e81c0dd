//! Environment-backed configuration, built once at startup.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use stockroute_client::Credentials;
use stockroute_core::{WarehouseId, WarehouseTopology};
use stockroute_routing::RoutingPolicy;

/// Everything the process needs, resolved before the first request.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Bearer token guarding the trigger endpoints; `None` disables auth.
    pub webhook_token: Option<String>,
    pub backend: BackendConfig,
    pub topology: WarehouseTopology,
    pub policy: RoutingPolicy,
    /// How far back a poll trigger looks for changed orders.
    pub poll_window: chrono::Duration,
    /// Freshness window for per-warehouse stock listings; `None` disables
    /// the cache entirely.
    pub stock_cache_ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("STOCKROUTE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let webhook_token = std::env::var("STOCKROUTE_WEBHOOK_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        if webhook_token.is_none() {
            tracing::warn!("STOCKROUTE_WEBHOOK_TOKEN not set; trigger endpoints are unauthenticated");
        }

        let backend = BackendConfig {
            base_url: std::env::var("SHOP_BASE_URL").context("SHOP_BASE_URL is required")?,
            credentials: Credentials {
                key: std::env::var("SHOP_API_KEY").context("SHOP_API_KEY is required")?,
                password: std::env::var("SHOP_API_PASSWORD")
                    .context("SHOP_API_PASSWORD is required")?,
            },
        };

        let primary: WarehouseId = std::env::var("STOCKROUTE_PRIMARY_WAREHOUSE")
            .context("STOCKROUTE_PRIMARY_WAREHOUSE is required")?
            .parse()
            .context("STOCKROUTE_PRIMARY_WAREHOUSE")?;
        let fallbacks = parse_warehouse_list(
            &std::env::var("STOCKROUTE_FALLBACK_WAREHOUSES")
                .context("STOCKROUTE_FALLBACK_WAREHOUSES is required")?,
        )
        .context("STOCKROUTE_FALLBACK_WAREHOUSES")?;
        let topology =
            WarehouseTopology::new(primary, fallbacks).context("invalid warehouse topology")?;

        let defaults = RoutingPolicy::default();
        let policy = RoutingPolicy {
            early_exit: env_flag("STOCKROUTE_EARLY_EXIT", defaults.early_exit)?,
            normalize_unrecognized: env_flag(
                "STOCKROUTE_NORMALIZE_UNRECOGNIZED",
                defaults.normalize_unrecognized,
            )?,
            lookup_concurrency: env_parse(
                "STOCKROUTE_LOOKUP_CONCURRENCY",
                defaults.lookup_concurrency,
            )?,
        };

        let poll_window =
            chrono::Duration::minutes(env_parse("STOCKROUTE_POLL_WINDOW_MINUTES", 15i64)?);

        let cache_ttl_secs: u64 = env_parse("STOCKROUTE_STOCK_CACHE_TTL_SECS", 30u64)?;
        let stock_cache_ttl = (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs));

        Ok(Self {
            bind_addr,
            webhook_token,
            backend,
            topology,
            policy,
            poll_window,
            stock_cache_ttl,
        })
    }
}

/// Comma-separated warehouse ids, in fallback preference order.
fn parse_warehouse_list(raw: &str) -> anyhow::Result<Vec<WarehouseId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<WarehouseId>().context("warehouse list"))
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &str, default: bool) -> anyhow::Result<bool> {
    match std::env::var(name) {
        Ok(raw) => {
            parse_flag(&raw).with_context(|| format!("{name} must be a boolean, got {raw:?}"))
        }
        Err(_) => Ok(default),
    }
}

fn env_parse<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{name}: {e}")),
        Err(_) => Ok(default),
    }
}
