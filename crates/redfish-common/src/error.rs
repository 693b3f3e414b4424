//! # Client Errors
//!
//! This module defines the error taxonomy shared by every resource operation.
//!
//! - [`TransportError`] is what the transport capability reports. It is surfaced
//!   verbatim to callers of single-resource operations.
//! - [`Error`] is the crate-wide error. Single-resource operations (fetch,
//!   update, refresh) return the first one they hit.
//! - [`CollectionError`] aggregates independent failures of a fan-out. A
//!   collection operation never fails fast; every member is attempted and the
//!   failures are collected here, keyed by address.

use std::collections::BTreeMap;
use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures reported by a [`Transport`](crate::client::Transport) implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The service answered with a non-success status.
    #[error("{method} {uri} returned status {status}: {body}")]
    Status {
        method: &'static str,
        uri: String,
        status: u16,
        body: String,
    },
    /// The request never produced a response (connection refused, reset, ...).
    #[error("connection error for {uri}: {message}")]
    Connection { uri: String, message: String },
    /// Anything else the transport wants to report.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Returns the HTTP status, if the service produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by resource operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A body (or a stored snapshot) could not be decoded into the expected shape.
    #[error("failed to decode {uri}: {source}")]
    Decode {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    /// A patch value could not be serialized.
    #[error("failed to encode field {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The collection lister could not enumerate the members of `link`.
    #[error("failed to list collection {link}: {source}")]
    Listing {
        link: String,
        #[source]
        source: Box<Error>,
    },

    /// The entity has no transport attached, so it cannot talk to the service.
    #[error("entity {0} is not attached to a service client")]
    Detached(String),

    /// A member fetch ended without producing a result.
    #[error("fetch of {0} was aborted before completing")]
    Aborted(String),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl Error {
    pub(crate) fn decode(uri: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            uri: uri.into(),
            source,
        }
    }

    pub(crate) fn listing(link: impl Into<String>, source: Error) -> Self {
        Error::Listing {
            link: link.into(),
            source: Box::new(source),
        }
    }
}

/// Aggregated failures of a collection fan-out, keyed by the address that failed.
///
/// A listing failure is keyed by the collection reference itself. The map is
/// ordered so that the rendered message is stable.
#[derive(Debug, Default, thiserror::Error)]
#[error("failed to retrieve some items: {}", render_failures(.failures))]
pub struct CollectionError {
    pub failures: BTreeMap<String, Error>,
}

impl CollectionError {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn insert(&mut self, address: impl Into<String>, error: Error) {
        self.failures.insert(address.into(), error);
    }

    pub fn get(&self, address: &str) -> Option<&Error> {
        self.failures.get(address)
    }

    /// Returns `None` when nothing failed, so the caller can drop an empty aggregate.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

fn render_failures(failures: &BTreeMap<String, Error>) -> String {
    struct Rendered<'a>(&'a BTreeMap<String, Error>);

    impl fmt::Display for Rendered<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("{")?;
            for (i, (address, error)) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{address}: {error}")?;
            }
            f.write_str("}")
        }
    }

    Rendered(failures).to_string()
}
