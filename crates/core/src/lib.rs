//! `stockroute-core` — shared domain types for order re-routing.
//!
//! This crate contains **pure domain** types (no I/O): identifiers, the
//! order projection, the warehouse topology, and the error taxonomy.

pub mod error;
pub mod id;
pub mod order;
pub mod warehouse;

pub use error::{ProcessError, ProcessResult};
pub use id::{OrderId, ProductId, VariantId, WarehouseId};
pub use order::{ItemCategory, LineItem, Order, ProductKey};
pub use warehouse::{TopologyError, WarehouseRole, WarehouseTopology};
