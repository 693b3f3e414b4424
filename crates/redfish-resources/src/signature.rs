//! Secure boot signatures, as held in a signature database.

use redfish_common::de::null_as_default;
use redfish_common::{redfish_resource, Entity};
use serde::Deserialize;

/// The registry that qualifies a signature's `SignatureType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SignatureTypeRegistry {
    /// A signature defined in the UEFI Specification.
    #[serde(rename = "UEFI")]
    Uefi,
}

/// A signature held by a Redfish implementation, such as a secure boot key.
///
/// Read-only: there is no update path for signatures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Signature {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(rename = "@odata.context", default, deserialize_with = "null_as_default")]
    pub odata_context: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "Oem", default)]
    pub oem: Option<serde_json::Value>,
    /// Private keys are stripped by the service in responses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub signature_string: String,
    /// Format of `signature_string`, qualified by `signature_type_registry`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub signature_type: String,
    #[serde(default)]
    pub signature_type_registry: Option<SignatureTypeRegistry>,
    /// Only present when the registry is UEFI.
    #[serde(default)]
    pub uefi_signature_owner: Option<String>,
}

redfish_resource!(Signature, signatures);
