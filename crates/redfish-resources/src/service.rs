//! # In-Memory Redfish Service
//!
//! [`InMemoryService`] is a [`Transport`] backed by a map of URI to JSON
//! document. It behaves like a small BMC: every GET carries the document's
//! current `@odata.etag`, PATCH merges top-level properties and bumps the
//! etag, and a stale `If-Match` is refused with `412 Precondition Failed`.
//!
//! ```rust
//! use redfish_resources::service::InMemoryService;
//! use redfish_resources::route_set_entry::get_route_set_entry;
//! use redfish_common::Updatable;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = InMemoryService::new();
//!     service.insert("/rs/1", json!({"@odata.id": "/rs/1", "HopCount": 1}));
//!
//!     let mut entry = get_route_set_entry(&service.client(), "/rs/1").await.unwrap();
//!     entry.hop_count = 2;
//!     entry.update().await.unwrap();
//!
//!     assert_eq!(service.document("/rs/1").unwrap()["HopCount"], 2);
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use redfish_common::{Response, ServiceClient, Transport, TransportError};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

const ETAG_FIELD: &str = "@odata.etag";

#[derive(Debug)]
struct Document {
    body: Map<String, Value>,
    version: u64,
}

impl Document {
    fn etag(&self) -> String {
        format!("W/\"{}\"", self.version)
    }
}

/// A shareable in-memory document store that speaks [`Transport`].
///
/// Cloning shares the same documents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryService {
    documents: Arc<Mutex<HashMap<String, Document>>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a client backed by this service.
    pub fn client(&self) -> ServiceClient {
        ServiceClient::new(self.clone())
    }

    /// Stores `document` at `uri`, replacing any previous one.
    ///
    /// Non-object values are stored as an empty document.
    pub fn insert(&self, uri: impl Into<String>, document: Value) {
        let body = match document {
            Value::Object(body) => body,
            other => {
                warn!(kind = ?other, "Ignoring non-object document body");
                Map::new()
            }
        };
        self.lock().insert(uri.into(), Document { body, version: 1 });
    }

    /// Stores a member collection at `link` referencing `members`.
    pub fn insert_collection<S: AsRef<str>>(&self, link: &str, members: &[S]) {
        let refs: Vec<Value> = members
            .iter()
            .map(|member| json!({ "@odata.id": member.as_ref() }))
            .collect();
        self.insert(
            link,
            json!({
                "@odata.id": link,
                "Members@odata.count": refs.len(),
                "Members": refs,
            }),
        );
    }

    pub fn remove(&self, uri: &str) -> bool {
        self.lock().remove(uri).is_some()
    }

    /// The stored document at `uri`, as a GET would return it.
    pub fn document(&self, uri: &str) -> Option<Value> {
        self.lock().get(uri).map(render)
    }

    /// The current entity tag of the document at `uri`.
    pub fn etag(&self, uri: &str) -> Option<String> {
        self.lock().get(uri).map(Document::etag)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Document>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn render(document: &Document) -> Value {
    let mut body = document.body.clone();
    body.insert(ETAG_FIELD.to_string(), Value::String(document.etag()));
    Value::Object(body)
}

fn status(method: &'static str, uri: &str, status: u16, body: impl Into<String>) -> TransportError {
    TransportError::Status {
        method,
        uri: uri.to_string(),
        status,
        body: body.into(),
    }
}

#[async_trait]
impl Transport for InMemoryService {
    async fn get(&self, uri: &str) -> Result<Response, TransportError> {
        let document = self
            .document(uri)
            .ok_or_else(|| status("GET", uri, 404, "resource not found"))?;
        debug!(uri, "GET");
        let body = serde_json::to_vec(&document).map_err(|e| TransportError::Other(Box::new(e)))?;
        Ok(Response::ok(Bytes::from(body)))
    }

    async fn patch(
        &self,
        uri: &str,
        payload: &Value,
        headers: &[(&str, String)],
    ) -> Result<Response, TransportError> {
        let Value::Object(changes) = payload else {
            return Err(status("PATCH", uri, 400, "payload must be a JSON object"));
        };

        let mut documents = self.lock();
        let document = documents
            .get_mut(uri)
            .ok_or_else(|| status("PATCH", uri, 404, "resource not found"))?;

        let current = document.etag();
        let if_match = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(redfish_common::client::IF_MATCH))
            .map(|(_, value)| value.as_str());
        if let Some(expected) = if_match {
            if expected != current && expected != "*" {
                warn!(uri, expected, current = %current, "Stale If-Match");
                return Err(status("PATCH", uri, 412, "precondition failed"));
            }
        }

        for (key, value) in changes {
            document.body.insert(key.clone(), value.clone());
        }
        document.version += 1;
        debug!(uri, fields = changes.len(), etag = %document.etag(), "PATCH applied");

        Ok(Response::new(204, Bytes::new()))
    }
}
