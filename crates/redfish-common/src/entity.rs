//! # Entity
//!
//! The identity and transport anchor embedded in every resource.
//!
//! An [`Entity`] carries the service-assigned address (`@odata.id`), the opaque
//! `Id`, the type tag (`@odata.type`), the entity tag used for optimistic
//! concurrency, the [`Snapshot`] of the bytes it was decoded from, and a shared
//! [`ServiceClient`].
//!
//! Resource types embed it with `#[serde(flatten)]`:
//!
//! ```rust
//! use redfish_common::Entity;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Thermal {
//!     #[serde(flatten)]
//!     entity: Entity,
//!     #[serde(default)]
//!     description: String,
//! }
//!
//! let thermal: Thermal = serde_json::from_str(
//!     r#"{"@odata.id": "/redfish/v1/Chassis/1/Thermal", "Id": "Thermal", "Description": "fans"}"#,
//! ).unwrap();
//! assert_eq!(thermal.entity.odata_id(), "/redfish/v1/Chassis/1/Thermal");
//! ```
//!
//! The address has no setter. It is filled in once, when the entity is decoded
//! from a server response, and stays put for the life of the value.

use crate::client::ServiceClient;
use crate::de::null_as_default;
use bytes::Bytes;
use serde::Deserialize;

/// The exact bytes of a resource as last received from the service.
///
/// Replaced wholesale whenever the resource is decoded; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(Bytes);

impl Snapshot {
    pub fn new(raw: impl Into<Bytes>) -> Self {
        Self(raw.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entity {
    #[serde(rename = "@odata.id", default, deserialize_with = "null_as_default")]
    odata_id: String,
    #[serde(rename = "Id", default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(rename = "@odata.type", default, deserialize_with = "null_as_default")]
    odata_type: String,
    #[serde(rename = "@odata.etag", default)]
    etag: Option<String>,

    #[serde(skip)]
    disable_etag_match: bool,
    #[serde(skip)]
    snapshot: Snapshot,
    #[serde(skip)]
    client: Option<ServiceClient>,
}

impl Entity {
    /// The canonical URI of this resource.
    pub fn odata_id(&self) -> &str {
        &self.odata_id
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn odata_type(&self) -> &str {
        &self.odata_type
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn client(&self) -> Option<&ServiceClient> {
        self.client.as_ref()
    }

    /// Attach the session's transport. Called once the entity is decoded.
    pub fn set_client(&mut self, client: ServiceClient) {
        self.client = Some(client);
    }

    /// Stop sending `If-Match` on updates, for services that mishandle etags.
    pub fn disable_etag_match(&mut self, disable: bool) {
        self.disable_etag_match = disable;
    }

    pub fn etag_match_disabled(&self) -> bool {
        self.disable_etag_match
    }

    /// The `If-Match` value to send with a partial update, if any.
    pub fn if_match(&self) -> Option<&str> {
        if self.disable_etag_match {
            return None;
        }
        self.etag().filter(|etag| !etag.is_empty())
    }

    pub(crate) fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }
}
