//! # Redfish Resources
//!
//! Concrete Redfish resource schemas built on [`redfish_common`], and an
//! in-memory service to exercise them against.
//!
//! - **[route_set_entry]**: [`RouteSetEntry`], a writable fabric route.
//! - **[signature]**: [`Signature`], a read-only secure boot signature.
//! - **[service]**: [`InMemoryService`], a document store that implements
//!   [`Transport`](redfish_common::Transport) with etag handling.
//!
//! Each schema module exposes `get_<type>` and `list_referenced_<plural>`.

pub mod route_set_entry;
pub mod service;
pub mod signature;

pub use route_set_entry::{get_route_set_entry, list_referenced_route_set_entries, RouteSetEntry};
pub use service::InMemoryService;
pub use signature::{get_signature, list_referenced_signatures, Signature, SignatureTypeRegistry};
