//! `stockroute-routing` — the warehouse re-routing policy.
//!
//! Pure decision logic over an injected [`StockSource`]; no HTTP, no
//! configuration parsing, no persistence.

pub mod decision;
pub mod engine;
pub mod policy;

pub use decision::{Decision, Evaluation, ItemAssessment, ItemOutcome, Rationale, StockReading};
pub use engine::{DecisionEngine, StockSource};
pub use policy::RoutingPolicy;
