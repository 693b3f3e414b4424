//! # Resource Traits
//!
//! [`Resource`] is the decode contract every resource type satisfies: it is
//! `Deserialize`, and it exposes its embedded [`Entity`]. On top of that the
//! module provides the generic single-resource operations: [`decode`], [`get`]
//! and [`refresh`].
//!
//! [`Updatable`] adds the snapshot-diff update protocol. A type declares its
//! mutable fields once (normally through [`updatable!`](crate::updatable)) and
//! inherits [`Updatable::patch_payload`] and [`Updatable::update`].
//!
//! # Update protocol
//!
//! 1. Decode the stored [`Snapshot`](crate::Snapshot) into a fresh "original"
//!    instance, using the same decoding rules as the live one.
//! 2. Compare every declared mutable field by value. Fields outside the declared
//!    set are never looked at.
//! 3. If nothing changed, return without touching the network.
//! 4. Otherwise PATCH the changed fields to the entity's own address.
//!
//! The snapshot is **not** refreshed after a successful update. Call
//! [`refresh`] when later diffs should be computed against the post-update state.

use crate::client::{ServiceClient, IF_MATCH};
use crate::entity::{Entity, Snapshot};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, debug_span, info, instrument, Instrument};

/// The partial-update body: changed wire names mapped to their new values.
///
/// Backed by a sorted map, so identical inputs always serialize identically.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Contract that every resource type satisfies to be fetched and resolved generically.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    /// Short type name for log fields.
    fn resource_type() -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
    }
}

/// A resource type whose declared fields may be written back with a partial update.
#[async_trait]
pub trait Updatable: Resource {
    /// Wire names of the fields the service accepts in a partial update.
    const MUTABLE_FIELDS: &'static [&'static str];

    /// Compare the declared mutable fields of `self` against `original`.
    ///
    /// Returns the changed fields under their wire names with `self`'s values.
    fn diff_against(&self, original: &Self) -> Result<Payload>;

    /// Compute the patch for this resource against its snapshot.
    fn patch_payload(&self) -> Result<Payload> {
        let uri = self.entity().odata_id();
        let original: Self = decode_snapshot(uri, self.entity().snapshot())?;
        self.diff_against(&original)
    }

    /// Push the changed mutable fields back to the service.
    ///
    /// An empty patch is a successful no-op and issues no request.
    async fn update(&self) -> Result<()> {
        let entity = self.entity();
        let span = debug_span!(
            "update",
            resource_type = Self::resource_type(),
            uri = %entity.odata_id()
        );

        async move {
            let payload = self.patch_payload()?;
            if payload.is_empty() {
                debug!("No changes");
                return Ok(());
            }

            let client = entity
                .client()
                .ok_or_else(|| Error::Detached(entity.odata_id().to_string()))?;

            let mut headers = Vec::new();
            if let Some(etag) = entity.if_match() {
                headers.push((IF_MATCH, etag.to_string()));
            }

            let changed = payload.len();
            debug!(fields = ?payload.keys().collect::<Vec<_>>(), "Patch");
            client
                .patch(
                    entity.odata_id(),
                    &serde_json::Value::Object(payload),
                    &headers,
                )
                .await?;
            info!(changed, "Updated");
            Ok::<_, Error>(())
        }
        .instrument(span)
        .await
    }
}

/// Decode `raw` into `T`, keeping the bytes as the resource's snapshot.
pub fn decode<T: Resource>(uri: &str, raw: impl Into<Bytes>) -> Result<T> {
    let raw = raw.into();
    let mut resource: T = serde_json::from_slice(&raw).map_err(|e| Error::decode(uri, e))?;
    resource.entity_mut().set_snapshot(Snapshot::new(raw));
    Ok(resource)
}

fn decode_snapshot<T: Resource>(uri: &str, snapshot: &Snapshot) -> Result<T> {
    // An absent snapshot decodes as an empty document and fails here.
    serde_json::from_slice(snapshot.as_bytes()).map_err(|e| Error::decode(uri, e))
}

/// Fetch and decode the resource at `uri`, attaching `client` to it.
#[instrument(skip(client), fields(resource_type = T::resource_type()))]
pub async fn get<T: Resource>(client: &ServiceClient, uri: &str) -> Result<T> {
    debug!("Get");
    let response = client.get(uri).await?;
    let mut resource: T = decode(uri, response.body)?;
    resource.entity_mut().set_client(client.clone());
    Ok(resource)
}

/// Re-fetch `resource` from its own address, replacing its fields and snapshot.
pub async fn refresh<T: Resource>(resource: &mut T) -> Result<()> {
    let entity = resource.entity();
    let client = entity
        .client()
        .cloned()
        .ok_or_else(|| Error::Detached(entity.odata_id().to_string()))?;
    let uri = entity.odata_id().to_string();
    let etag_match_disabled = entity.etag_match_disabled();

    let mut fresh: T = get(&client, &uri).await?;
    fresh.entity_mut().disable_etag_match(etag_match_disabled);
    *resource = fresh;
    Ok(())
}
