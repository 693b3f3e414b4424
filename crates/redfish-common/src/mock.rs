//! # Mock Transport & Testing Guide
//!
//! [`MockTransport`] implements [`Transport`] entirely in memory. You register
//! expectations per URI, hand [`MockTransport::client`] to the code under test,
//! and afterwards inspect what was requested.
//!
//! ## When to use the mock vs. a real service
//!
//! | Feature | MockTransport | Real service |
//! |---------|---------------|--------------|
//! | **Speed** | Instant (in-memory) | Network bound |
//! | **Determinism** | Replies are scripted | Subject to the BMC |
//! | **Error Injection** | Easy (`return_err`, `return_status`) | Hard |
//! | **Latency** | Scripted per reply (`with_delay`) | Whatever the wire gives you |
//!
//! ## Example
//!
//! ```rust
//! use redfish_common::mock::MockTransport;
//! use redfish_common::{get, Entity, Resource};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct Chassis {
//!     #[serde(flatten)]
//!     entity: Entity,
//! }
//!
//! impl Resource for Chassis {
//!     fn entity(&self) -> &Entity { &self.entity }
//!     fn entity_mut(&mut self) -> &mut Entity { &mut self.entity }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockTransport::new();
//!     mock.expect_get("/redfish/v1/Chassis/1")
//!         .return_json(json!({"@odata.id": "/redfish/v1/Chassis/1", "Id": "1"}));
//!
//!     let chassis: Chassis = get(&mock.client(), "/redfish/v1/Chassis/1").await.unwrap();
//!     assert_eq!(chassis.entity().id(), "1");
//!
//!     mock.verify(); // Ensures all expectations were met
//! }
//! ```
//!
//! ## Matching rules
//!
//! Expectations are queued per URI and consumed first-in first-out, so
//! concurrent requests for different URIs never race for each other's replies.
//! A request with no queued reply gets a 404 and is remembered;
//! [`MockTransport::verify`] fails on leftovers and on such unexpected calls.

use crate::client::{Response, ServiceClient, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Outcome {
    Reply(Result<Response, TransportError>),
    Panic,
}

struct Expectation {
    delay: Option<Duration>,
    outcome: Outcome,
}

/// A partial update as the transport received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPatch {
    pub uri: String,
    pub payload: serde_json::Value,
    pub headers: Vec<(String, String)>,
}

#[derive(Default)]
struct State {
    gets: HashMap<String, VecDeque<Expectation>>,
    patches: HashMap<String, VecDeque<Expectation>>,
    get_log: Vec<String>,
    patch_log: Vec<RecordedPatch>,
    unexpected: Vec<String>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// An in-memory [`Transport`] with scripted replies.
///
/// Cloning shares the same expectations and request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a client backed by this mock.
    pub fn client(&self) -> ServiceClient {
        ServiceClient::new(self.clone())
    }

    /// Expects a `get` of `uri`.
    pub fn expect_get(&self, uri: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            uri: uri.into(),
            kind: Kind::Get,
            delay: None,
            inner: self.inner.clone(),
        }
    }

    /// Expects a `patch` of `uri`.
    pub fn expect_patch(&self, uri: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            uri: uri.into(),
            kind: Kind::Patch,
            delay: None,
            inner: self.inner.clone(),
        }
    }

    /// Every URI fetched so far, in call order.
    pub fn gets(&self) -> Vec<String> {
        self.inner.state.lock().unwrap().get_log.clone()
    }

    pub fn get_count(&self) -> usize {
        self.inner.state.lock().unwrap().get_log.len()
    }

    /// Every partial update received so far, in call order.
    pub fn patches(&self) -> Vec<RecordedPatch> {
        self.inner.state.lock().unwrap().patch_log.clone()
    }

    pub fn patch_count(&self) -> usize {
        self.inner.state.lock().unwrap().patch_log.len()
    }

    /// The highest number of requests that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    /// Verifies that all expectations were met and nothing unexpected was requested.
    pub fn verify(&self) {
        let state = self.inner.state.lock().unwrap();
        let remaining: usize = state
            .gets
            .values()
            .chain(state.patches.values())
            .map(VecDeque::len)
            .sum();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
        if !state.unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", state.unexpected);
        }
    }

    async fn serve(&self, method: &'static str, uri: &str) -> Result<Response, TransportError> {
        let expectation = {
            let mut state = self.inner.state.lock().unwrap();
            let queue = match method {
                "PATCH" => state.patches.get_mut(uri),
                _ => state.gets.get_mut(uri),
            };
            let expectation = queue.and_then(VecDeque::pop_front);
            if expectation.is_none() {
                state.unexpected.push(format!("{method} {uri}"));
            }
            expectation
        };

        let Some(expectation) = expectation else {
            return Err(TransportError::Status {
                method,
                uri: uri.to_string(),
                status: 404,
                body: String::new(),
            });
        };

        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        match expectation.outcome {
            Outcome::Reply(reply) => reply,
            Outcome::Panic => panic!("{method} {uri} was scripted to panic"),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, uri: &str) -> Result<Response, TransportError> {
        self.inner
            .state
            .lock()
            .unwrap()
            .get_log
            .push(uri.to_string());
        self.serve("GET", uri).await
    }

    async fn patch(
        &self,
        uri: &str,
        payload: &serde_json::Value,
        headers: &[(&str, String)],
    ) -> Result<Response, TransportError> {
        self.inner.state.lock().unwrap().patch_log.push(RecordedPatch {
            uri: uri.to_string(),
            payload: payload.clone(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        });
        self.serve("PATCH", uri).await
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Get,
    Patch,
}

/// Builder for a single scripted reply.
pub struct ExpectationBuilder {
    uri: String,
    kind: Kind,
    delay: Option<Duration>,
    inner: Arc<Inner>,
}

impl ExpectationBuilder {
    /// Wait this long before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reply 200 with `body`.
    pub fn return_ok(self, body: impl Into<Bytes>) {
        self.push(Outcome::Reply(Ok(Response::ok(body))));
    }

    /// Reply with `response` as is, whatever its status.
    pub fn return_response(self, response: Response) {
        self.push(Outcome::Reply(Ok(response)));
    }

    /// Reply 200 with `value` serialized as the body.
    pub fn return_json(self, value: serde_json::Value) {
        self.return_ok(value.to_string());
    }

    /// Fail with a status error.
    pub fn return_status(self, status: u16) {
        let method = match self.kind {
            Kind::Get => "GET",
            Kind::Patch => "PATCH",
        };
        let error = TransportError::Status {
            method,
            uri: self.uri.clone(),
            status,
            body: String::new(),
        };
        self.push(Outcome::Reply(Err(error)));
    }

    /// Fail with `error`.
    pub fn return_err(self, error: TransportError) {
        self.push(Outcome::Reply(Err(error)));
    }

    /// Panic inside the transport call, to simulate a task dying mid-request.
    pub fn panic_on_call(self) {
        self.push(Outcome::Panic);
    }

    fn push(self, outcome: Outcome) {
        let mut state = self.inner.state.lock().unwrap();
        let queues = match self.kind {
            Kind::Get => &mut state.gets,
            Kind::Patch => &mut state.patches,
        };
        queues.entry(self.uri).or_default().push_back(Expectation {
            delay: self.delay,
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_are_consumed_in_order_per_uri() {
        let mock = MockTransport::new();
        mock.expect_get("/a").return_ok("first");
        mock.expect_get("/a").return_status(503);
        mock.expect_get("/b").return_json(json!({"b": true}));

        let client = mock.client();
        assert_eq!(client.get("/b").await.unwrap().body, Bytes::from(r#"{"b":true}"#));
        assert_eq!(client.get("/a").await.unwrap().body, Bytes::from("first"));
        assert_eq!(client.get("/a").await.unwrap_err().status(), Some(503));

        assert_eq!(mock.gets(), ["/b", "/a", "/a"]);
        mock.verify();
    }

    #[tokio::test]
    async fn error_status_in_ok_response_is_rejected() {
        let mock = MockTransport::new();
        mock.expect_get("/a")
            .return_response(Response::new(500, r#"{"error": "internal"}"#));
        mock.expect_patch("/a").return_response(Response::new(412, ""));
        mock.expect_patch("/a").return_response(Response::new(204, ""));

        let client = mock.client();
        match client.get("/a").await {
            Err(TransportError::Status { status, body, .. }) => {
                assert_eq!(status, 500);
                assert!(body.contains("internal"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        let err = client.patch("/a", &json!({}), &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(412));
        assert_eq!(client.patch("/a", &json!({}), &[]).await.unwrap().status, 204);
        mock.verify();
    }

    #[tokio::test]
    async fn unscripted_request_is_not_found() {
        let mock = MockTransport::new();
        let err = mock.client().get("/nothing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn verify_flags_unexpected_requests() {
        let mock = MockTransport::new();
        let _ = mock.client().get("/nothing").await;
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn verify_flags_unmet_expectations() {
        let mock = MockTransport::new();
        mock.expect_patch("/a").return_ok("");
        mock.verify();
    }

    #[tokio::test]
    async fn patches_are_recorded_with_headers() {
        let mock = MockTransport::new();
        mock.expect_patch("/a").return_ok("");

        mock.client()
            .patch("/a", &json!({"Valid": true}), &[("If-Match", "\"3\"".to_string())])
            .await
            .unwrap();

        assert_eq!(
            mock.patches(),
            [RecordedPatch {
                uri: "/a".into(),
                payload: json!({"Valid": true}),
                headers: vec![("If-Match".into(), "\"3\"".into())],
            }]
        );
        mock.verify();
    }
}
