//! Composition point: descriptor -> cache key -> cache store -> adapter -> normalizer.

use std::sync::Arc;

use tracing::info;

use crate::cache::CacheStore;
use crate::canonical::CanonicalData;
use crate::config::TtlPolicy;
use crate::descriptor::QueryDescriptor;
use crate::error::FetchError;
use crate::normalize::normalize;
use crate::provider::ProviderAdapter;

/// Cache of canonical responses, shared across all requests for the process lifetime.
pub type ResponseCache = CacheStore<Arc<CanonicalData>>;

pub struct Gateway {
    adapter: Arc<dyn ProviderAdapter>,
    cache: ResponseCache,
    ttl: TtlPolicy,
}

impl Gateway {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, cache: ResponseCache, ttl: TtlPolicy) -> Self {
        Self {
            adapter,
            cache,
            ttl,
        }
    }

    /// One upstream attempt per cache miss; no retries, no caching of errors.
    pub async fn resolve(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Arc<CanonicalData>, FetchError> {
        let key = descriptor.cache_key();
        let ttl = self.ttl.for_descriptor(descriptor);
        let adapter = Arc::clone(&self.adapter);
        let descriptor = descriptor.clone();

        self.cache
            .resolve(key, ttl, move || async move {
                info!(
                    "Fetching {} from {} {:?}",
                    descriptor.tag(),
                    adapter.id(),
                    descriptor.params()
                );
                let raw = adapter.fetch(&descriptor).await?;
                Ok(Arc::new(normalize(&descriptor, raw)))
            })
            .await
    }

    pub fn provider_id(&self) -> &'static str {
        self.adapter.id()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}
