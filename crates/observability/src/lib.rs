//! Tracing/logging setup shared by hosts, tests and benches.

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, init, init_for_tests, init_with_default};
