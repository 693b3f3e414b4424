//! A single route of a fabric switch's route set.
//!
//! `EgressIdentifier`, `HopCount`, `VCAction` and `Valid` are writable; the
//! rest is reported by the service and never patched.

use redfish_common::de::null_as_default;
use redfish_common::{redfish_resource, updatable, Entity};
use serde::Deserialize;

/// The content of one entry in a Redfish route set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteSetEntry {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(rename = "@odata.context", default, deserialize_with = "null_as_default")]
    pub odata_context: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Interface identifier corresponding to this route.
    #[serde(default, deserialize_with = "null_as_default")]
    pub egress_identifier: i64,
    /// Number of hops to the destination from the egress interface.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hop_count: i64,
    #[serde(rename = "Oem", default)]
    pub oem: Option<serde_json::Value>,
    /// Index of the VCAT entry corresponding to this route.
    #[serde(rename = "VCAction", default, deserialize_with = "null_as_default")]
    pub vc_action: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valid: bool,
}

redfish_resource!(RouteSetEntry, route_set_entries);
updatable!(RouteSetEntry {
    "EgressIdentifier" => egress_identifier,
    "HopCount" => hop_count,
    "VCAction" => vc_action,
    "Valid" => valid,
});
