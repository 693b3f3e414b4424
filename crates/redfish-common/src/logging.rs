//! # Observability & Tracing
//!
//! Every operation in this crate logs through `tracing` with structured fields:
//!
//! - **Single resources**: `Get` and `Patch` at debug level, `Updated` at info,
//!   each inside a span carrying `resource_type` and `uri`.
//! - **Collections**: one span per [`resolve`](crate::CollectionResolver::resolve)
//!   call, a warning per failed member (`address`, `error`) and one
//!   `Collection resolved` summary with `members`, `resolved` and `failed` counts.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Summaries only
//! RUST_LOG=info cargo run
//!
//! # Every fetch and patch
//! RUST_LOG=debug cargo run
//!
//! # Filter to the resolver
//! RUST_LOG=redfish_common::resolver=debug cargo run
//! ```

/// Initialize the global subscriber from `RUST_LOG`.
///
/// Compact format, module paths hidden; spans show inline
/// (e.g. `resolve:get: Get`).
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
