//! Per-request fetch memoization
//!
//! Owner resolution rebuilds an ownership graph for every object it reconnects,
//! so the same owners are fetched over and over within one request. Wrapping the
//! client in a [`CachingClient`] for the lifetime of a request collapses those
//! repeats into a single round-trip each. Lists are never cached.

use super::{CrdInfo, ListOptions, ObjectClient};
use crate::error::Result;
use crate::resource::{ObjectReference, Resource};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct CachingClient<'a, C: ObjectClient + ?Sized> {
    inner: &'a C,
    cache: RwLock<HashMap<ObjectReference, Resource>>,
}

impl<'a, C: ObjectClient + ?Sized> CachingClient<'a, C> {
    pub fn new(inner: &'a C) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct objects fetched so far
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl<C: ObjectClient + ?Sized> ObjectClient for CachingClient<'_, C> {
    async fn fetch_by_reference(&self, reference: &ObjectReference) -> Result<Resource> {
        if let Some(hit) = self.cache.read().await.get(reference) {
            tracing::trace!("Fetch cache hit for {}", reference);
            return Ok(hit.clone());
        }

        let object = self.inner.fetch_by_reference(reference).await?;
        self.cache
            .write()
            .await
            .insert(reference.clone(), object.clone());
        Ok(object)
    }

    async fn list_crds(&self, label_selector: &str) -> Result<Vec<CrdInfo>> {
        self.inner.list_crds(label_selector).await
    }

    async fn list_objects(
        &self,
        api_version: &str,
        kind: &str,
        options: &ListOptions,
    ) -> Result<Vec<Resource>> {
        self.inner.list_objects(api_version, kind, options).await
    }
}
