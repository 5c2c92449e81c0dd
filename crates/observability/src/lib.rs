//! Process-wide tracing/logging setup.

pub mod tracing;

/// Initialize observability for the process.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init();
}
