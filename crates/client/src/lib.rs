//! `stockroute-client` — HTTP collaborators for the shop backend.
//!
//! Order reads, stock reads (with optional per-warehouse caching and
//! variant resolution), and the idempotent warehouse write.

pub mod cache;
pub mod gateway;
pub mod http;

pub use cache::StockCache;
pub use gateway::{MutationOutcome, OrderGateway, WarehouseWriter};
pub use http::{Credentials, ShopClient};
