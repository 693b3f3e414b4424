//! # Redfish Common
//!
//! The generic machinery shared by every Redfish resource type. Individual
//! resource schemas are plain structs; this crate gives them identity, a
//! snapshot-diff update protocol and concurrent collection resolution.
//!
//! ## Architecture Overview
//!
//! 1. **Transport Layer** ([`Transport`], [`ServiceClient`]) - the minimal
//!    "fetch a URI / patch a URI" capability, shared by every resource.
//! 2. **Entity Layer** ([`Entity`], [`Snapshot`], [`Resource`]) - identity,
//!    the bytes last received, and the decode contract.
//! 3. **Update Layer** ([`Updatable`]) - diff the declared mutable fields
//!    against the snapshot and PATCH only what changed.
//! 4. **Collection Layer** ([`CollectionLister`], [`CollectionResolver`]) -
//!    fan out one fetch per member, fan the results back in, aggregate failures
//!    in a [`CollectionError`].
//!
//! ## Quick Tour
//!
//! ```rust
//! use redfish_common::mock::MockTransport;
//! use redfish_common::{list_referenced, redfish_resource, updatable, Entity, Updatable};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! pub struct Port {
//!     #[serde(flatten)]
//!     entity: Entity,
//!     #[serde(default)]
//!     enabled: bool,
//!     #[serde(default)]
//!     link_state: String,
//! }
//!
//! redfish_resource!(Port, ports);
//! updatable!(Port { "Enabled" => enabled });
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockTransport::new();
//!     mock.expect_get("/Ports").return_json(json!({"Members": [{"@odata.id": "/Ports/1"}]}));
//!     mock.expect_get("/Ports/1").return_json(json!({"@odata.id": "/Ports/1", "Enabled": false}));
//!     mock.expect_patch("/Ports/1").return_ok("");
//!
//!     let (mut ports, errors) = list_referenced_ports(&mock.client(), "/Ports").await;
//!     assert!(errors.is_none());
//!
//!     let port = &mut ports[0];
//!     port.enabled = true;
//!     port.link_state = "Up".into(); // read-only, never sent
//!     port.update().await.unwrap();
//!
//!     assert_eq!(mock.patches()[0].payload, json!({"Enabled": true}));
//!     mock.verify();
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each collection member is fetched in its own Tokio task.
//! - Results are collected in completion order by the calling task only.
//! - The transport is shared by all tasks and must be safe for concurrent use.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockTransport`](mock::MockTransport), a
//! scripted in-memory transport with per-URI replies, latency injection and a
//! request log.

pub mod client;
pub mod de;
pub mod entity;
pub mod error;
pub mod lister;
pub mod logging;
mod macros;
pub mod mock;
pub mod resolver;
pub mod resource;

// Re-export core types for convenience
pub use client::{Response, ServiceClient, Transport};
pub use entity::{Entity, Snapshot};
pub use error::{CollectionError, Error, Result, TransportError};
pub use lister::{CollectionLister, Link, MemberCollectionLister};
pub use resolver::{list_referenced, CollectionResolver, FetchRecord};
pub use resource::{decode, get, refresh, Payload, Resource, Updatable};

#[doc(hidden)]
pub mod __private {
    pub use paste;
    pub use serde_json;
}
