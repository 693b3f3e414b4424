//! # Collection Resolver
//!
//! Fans out one fetch per collection member and fans the results back in.
//!
//! ## Fan-out / fan-in
//!
//! 1. The [`CollectionLister`] enumerates member addresses. Each address is
//!    spawned into a [`JoinSet`] the moment it is emitted.
//! 2. Every member task fetches its address, decodes it, attaches the shared
//!    [`ServiceClient`] and produces exactly one [`FetchRecord`].
//! 3. The coordinating task (the caller of [`CollectionResolver::resolve`])
//!    drains the set. Resources are appended in **completion order**, not in the
//!    order the lister produced the addresses. Failures go into a fresh
//!    [`CollectionError`] keyed by address.
//!
//! Only the coordinating task touches the result vector and the error map; the
//! member tasks just produce records, so no lock guards aggregation state.
//!
//! ## Failure policy
//!
//! Nothing fails fast. A listing failure is recorded under the collection
//! reference itself, next to the member failures; members emitted before the
//! listing failed are still fetched. The fan-out is a success iff the aggregate
//! error is empty.
//!
//! ## Concurrency
//!
//! By default every member fetch runs at once. For large collections, cap the
//! number of in-flight fetches with [`CollectionResolver::with_concurrency_limit`].
//! There is no timeout: a stalled member delays the whole call, and any deadline
//! belongs to the transport.

use crate::client::ServiceClient;
use crate::error::{CollectionError, Error, Result};
use crate::lister::{CollectionLister, MemberCollectionLister};
use crate::resource::{get, Resource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// The outcome of one member fetch.
#[derive(Debug)]
pub struct FetchRecord<T> {
    pub address: String,
    pub result: Result<T>,
}

/// Resolves collection references into typed resources.
#[derive(Debug, Clone)]
pub struct CollectionResolver<L = MemberCollectionLister> {
    client: ServiceClient,
    lister: L,
    concurrency_limit: Option<usize>,
}

impl CollectionResolver<MemberCollectionLister> {
    /// Creates a resolver for standard Redfish member collections, with unbounded fan-out.
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client,
            lister: MemberCollectionLister,
            concurrency_limit: None,
        }
    }
}

impl<L: CollectionLister> CollectionResolver<L> {
    /// Replace the collection lister.
    pub fn with_lister<M: CollectionLister>(self, lister: M) -> CollectionResolver<M> {
        CollectionResolver {
            client: self.client,
            lister,
            concurrency_limit: self.concurrency_limit,
        }
    }

    /// Allow at most `limit` member fetches in flight at once (minimum 1).
    ///
    /// One task is still spawned per member; the limit gates the fetch itself.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit.max(1));
        self
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Fetch every member of the collection at `link`.
    ///
    /// Returns the resources that were fetched, in completion order, and the
    /// aggregated failures if there were any. An empty `link` resolves to
    /// nothing without any I/O.
    #[instrument(skip(self), fields(resource_type = T::resource_type()))]
    pub async fn resolve<T: Resource>(&self, link: &str) -> (Vec<T>, Option<CollectionError>) {
        if link.is_empty() {
            debug!("Empty collection reference");
            return (Vec::new(), None);
        }

        let semaphore = self.concurrency_limit.map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<String, usize> = HashMap::new();
        let mut errors = CollectionError::new();

        let listing = {
            let mut spawn_member = |address: String| {
                *pending.entry(address.clone()).or_default() += 1;
                let client = self.client.clone();
                let semaphore = semaphore.clone();
                tasks.spawn(async move {
                    let _permit = match semaphore {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    let result = get::<T>(&client, &address).await;
                    FetchRecord { address, result }
                });
            };
            self.lister
                .list(&self.client, link, &mut spawn_member)
                .await
        };

        if let Err(e) = listing {
            warn!(link, error = %e, "Listing failed");
            errors.insert(link, Error::listing(link, e));
        }

        let spawned = tasks.len();
        let mut resources = Vec::with_capacity(spawned);
        while let Some(joined) = tasks.join_next().await {
            let record = match joined {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Member task ended without a result");
                    continue;
                }
            };

            if let Some(count) = pending.get_mut(&record.address) {
                *count -= 1;
            }
            match record.result {
                Ok(resource) => resources.push(resource),
                Err(e) => {
                    warn!(address = %record.address, error = %e, "Member fetch failed");
                    errors.insert(record.address, e);
                }
            }
        }

        for (address, remaining) in pending {
            if remaining > 0 {
                errors.insert(address.clone(), Error::Aborted(address));
            }
        }

        info!(
            link,
            members = spawned,
            resolved = resources.len(),
            failed = errors.len(),
            "Collection resolved"
        );
        (resources, errors.into_option())
    }
}

/// Resolve every resource referenced by the collection at `link`.
///
/// Shorthand for `CollectionResolver::new(client.clone()).resolve(link)`.
pub async fn list_referenced<T: Resource>(
    client: &ServiceClient,
    link: &str,
) -> (Vec<T>, Option<CollectionError>) {
    CollectionResolver::new(client.clone()).resolve(link).await
}
