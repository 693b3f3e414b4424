//! # Collection Listing
//!
//! A collection is never materialized as a resource of its own. A
//! [`CollectionLister`] turns a collection reference into the ordered sequence of
//! member addresses, and hands each one over as soon as it is known so the
//! resolver can start fetching while later pages are still being listed.
//!
//! [`MemberCollectionLister`] understands the standard Redfish member collection:
//!
//! ```json
//! {
//!   "Members": [{"@odata.id": "/redfish/v1/Systems/1"}],
//!   "Members@odata.nextLink": "/redfish/v1/Systems?$skip=1"
//! }
//! ```

use crate::client::ServiceClient;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Enumerates the member addresses of a collection reference.
#[async_trait]
pub trait CollectionLister: Send + Sync + 'static {
    /// Emit every member address of `link`, in order, through `emit`.
    ///
    /// An error ends the enumeration. Addresses emitted before the error stay
    /// emitted; the caller decides what to do with them.
    async fn list(
        &self,
        client: &ServiceClient,
        link: &str,
        emit: &mut (dyn FnMut(String) + Send),
    ) -> Result<()>;
}

/// A reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

#[derive(Debug, Deserialize)]
struct MemberPage {
    #[serde(rename = "Members", default)]
    members: Vec<Link>,
    #[serde(rename = "Members@odata.nextLink", default)]
    next_link: Option<String>,
}

/// Lists a Redfish member collection, following `Members@odata.nextLink` pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberCollectionLister;

#[async_trait]
impl CollectionLister for MemberCollectionLister {
    async fn list(
        &self,
        client: &ServiceClient,
        link: &str,
        emit: &mut (dyn FnMut(String) + Send),
    ) -> Result<()> {
        let mut visited = HashSet::new();
        let mut next = Some(link.to_string());

        while let Some(page_uri) = next.take() {
            if !visited.insert(page_uri.clone()) {
                warn!(link, page = %page_uri, "Collection page repeats, stopping");
                break;
            }

            let response = client.get(&page_uri).await?;
            let page: MemberPage =
                serde_json::from_slice(&response.body).map_err(|e| Error::decode(&page_uri, e))?;
            debug!(link, page = %page_uri, members = page.members.len(), "Listed page");

            for member in page.members {
                emit(member.odata_id);
            }
            next = page.next_link.filter(|next| !next.is_empty());
        }
        Ok(())
    }
}
