//! # Service Client
//!
//! The core never talks to the network itself. It consumes a [`Transport`]: the
//! minimal capability "given a URI, fetch and return a response or fail", plus a
//! partial-update call. Session establishment, retries and TLS all live behind
//! that trait.
//!
//! [`ServiceClient`] is the cheap, cloneable handle that resources keep a copy of.
//! Every resource decoded from one session shares the same underlying transport.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Header name used for optimistic concurrency on partial updates.
pub const IF_MATCH: &str = "If-Match";

/// A response with its body fully read.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`TransportError::Status`].
    pub fn error_for_status(self, method: &'static str, uri: &str) -> Result<Self, TransportError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(TransportError::Status {
            method,
            uri: uri.to_string(),
            status: self.status,
            body: String::from_utf8_lossy(&self.body).into_owned(),
        })
    }
}

/// The request capability consumed by the core.
///
/// Implementations must be safe for concurrent use: the collection resolver
/// issues one `get` per member in parallel through the same transport, and
/// nothing in this crate serializes those calls.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Fetch the document at `uri`.
    ///
    /// A non-2xx status may come back either as an `Err` or as an `Ok`
    /// response; [`ServiceClient`] rejects the latter before anything decodes it.
    async fn get(&self, uri: &str) -> Result<Response, TransportError>;

    /// Submit a partial update of the document at `uri`.
    async fn patch(
        &self,
        uri: &str,
        payload: &serde_json::Value,
        headers: &[(&str, String)],
    ) -> Result<Response, TransportError>;
}

/// A type-safe, shareable handle to a [`Transport`].
///
/// * **Cloneable** – holds only an `Arc`, so cloning is inexpensive.
/// * **Shared** – every resource fetched through this client keeps a clone; the
///   transport lives as long as the session that created it holds on to it.
#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
}

impl ServiceClient {
    pub fn new<T: Transport>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, uri: &str) -> Result<Response, TransportError> {
        self.transport.get(uri).await?.error_for_status("GET", uri)
    }

    pub async fn patch(
        &self,
        uri: &str,
        payload: &serde_json::Value,
        headers: &[(&str, String)],
    ) -> Result<Response, TransportError> {
        self.transport
            .patch(uri, payload, headers)
            .await?
            .error_for_status("PATCH", uri)
    }

    /// True if both handles share the same transport.
    pub fn same_transport(&self, other: &ServiceClient) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient").finish_non_exhaustive()
    }
}
