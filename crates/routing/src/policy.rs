//! Named configuration for the genuinely ambiguous policy choices.

/// Routing policy knobs.
///
/// Constructed once at startup and passed into the engine; nothing here is
/// mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    /// Stop evaluating at the first shortfall a fallback can resolve,
    /// instead of accumulating the full per-item rationale. The decision is
    /// the same either way; only rationale completeness and lookup volume
    /// differ.
    pub early_exit: bool,

    /// Treat an order sitting on an unrecognized warehouse as if it were on
    /// the primary (and default it there unless a fallback wins). When
    /// false, foreign assignments are left untouched.
    pub normalize_unrecognized: bool,

    /// Upper bound on concurrent primary-stock lookups per evaluation.
    pub lookup_concurrency: usize,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            early_exit: false,
            normalize_unrecognized: true,
            lookup_concurrency: 4,
        }
    }
}
