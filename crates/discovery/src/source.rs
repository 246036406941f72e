//! Capabilities the discovery engine needs from the backend.
//!
//! The engine only reads profiles and exclusions. The one write it asks for,
//! marking lapsed requests, goes through `ExpiryReporter` and is best effort.

use std::sync::Arc;

use async_trait::async_trait;
use skillswap_matching::{ProfileId, RawCandidate};
use tokio::sync::Mutex;

use crate::error::{DiscoveryError, SourceKind};
use crate::exclusion::ExclusionRecord;
use crate::queue::SourceBatch;

#[async_trait]
pub trait PoolFetcher: Send + Sync {
    /// Fetch candidate profiles for `viewer_id`.
    async fn fetch_pool(&self, viewer_id: &ProfileId) -> Result<Vec<RawCandidate>, DiscoveryError>;
}

#[async_trait]
pub trait ExclusionSource: Send + Sync {
    /// Fetch matches and connection requests involving `viewer_id`.
    async fn fetch_exclusions(
        &self,
        viewer_id: &ProfileId,
    ) -> Result<Vec<ExclusionRecord>, DiscoveryError>;
}

#[async_trait]
pub trait ExpiryReporter: Send + Sync {
    /// Mark a lapsed request record in storage.
    async fn mark_expired(&self, record: &ExclusionRecord) -> Result<(), DiscoveryError>;
}

/// The capabilities one session is wired to.
#[derive(Clone)]
pub struct DiscoverySources {
    pub pool: Arc<dyn PoolFetcher>,
    pub exclusions: Arc<dyn ExclusionSource>,
    pub expiry: Arc<dyn ExpiryReporter>,
}

impl DiscoverySources {
    pub fn new(
        pool: Arc<dyn PoolFetcher>,
        exclusions: Arc<dyn ExclusionSource>,
        expiry: Arc<dyn ExpiryReporter>,
    ) -> Self {
        Self {
            pool,
            exclusions,
            expiry,
        }
    }

    /// Use one backend object for all three capabilities.
    pub fn shared<S>(source: Arc<S>) -> Self
    where
        S: PoolFetcher + ExclusionSource + ExpiryReporter + 'static,
    {
        Self {
            pool: source.clone(),
            exclusions: source.clone(),
            expiry: source,
        }
    }

    /// Fetch pool and exclusions concurrently.
    pub async fn fetch_batch(&self, viewer_id: &ProfileId) -> Result<SourceBatch, DiscoveryError> {
        let (pool, exclusions) = tokio::try_join!(
            self.pool.fetch_pool(viewer_id),
            self.exclusions.fetch_exclusions(viewer_id)
        )?;
        Ok(SourceBatch::new(pool, exclusions))
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    profiles: Vec<RawCandidate>,
    exclusions: Vec<ExclusionRecord>,
    expired_reports: Vec<ExclusionRecord>,
    fail_pool: bool,
    fail_exclusions: bool,
    fail_expiry: bool,
    pool_fetches: usize,
}

/// In-memory backend for tests and demos.
pub struct InMemorySource {
    inner: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryState::default())),
        }
    }

    pub fn with_profiles(profiles: Vec<RawCandidate>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryState {
                profiles,
                ..Default::default()
            })),
        }
    }

    pub async fn set_profiles(&self, profiles: Vec<RawCandidate>) {
        self.inner.lock().await.profiles = profiles;
    }

    pub async fn push_profile(&self, profile: RawCandidate) {
        self.inner.lock().await.profiles.push(profile);
    }

    pub async fn add_exclusion(&self, record: ExclusionRecord) {
        self.inner.lock().await.exclusions.push(record);
    }

    pub async fn exclusions(&self) -> Vec<ExclusionRecord> {
        self.inner.lock().await.exclusions.clone()
    }

    /// Make pool fetches fail until switched back.
    pub async fn set_pool_failing(&self, failing: bool) {
        self.inner.lock().await.fail_pool = failing;
    }

    pub async fn set_exclusions_failing(&self, failing: bool) {
        self.inner.lock().await.fail_exclusions = failing;
    }

    pub async fn set_expiry_failing(&self, failing: bool) {
        self.inner.lock().await.fail_expiry = failing;
    }

    /// Records passed to `mark_expired`, in call order.
    pub async fn expired_reports(&self) -> Vec<ExclusionRecord> {
        self.inner.lock().await.expired_reports.clone()
    }

    /// Number of pool fetches attempted.
    pub async fn pool_fetches(&self) -> usize {
        self.inner.lock().await.pool_fetches
    }
}

#[async_trait]
impl PoolFetcher for InMemorySource {
    async fn fetch_pool(&self, viewer_id: &ProfileId) -> Result<Vec<RawCandidate>, DiscoveryError> {
        let mut guard = self.inner.lock().await;
        guard.pool_fetches += 1;
        if guard.fail_pool {
            return Err(DiscoveryError::unavailable(
                SourceKind::Pool,
                "backend unavailable",
            ));
        }
        Ok(guard
            .profiles
            .iter()
            .filter(|p| p.id.as_deref() != Some(viewer_id.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ExclusionSource for InMemorySource {
    async fn fetch_exclusions(
        &self,
        _viewer_id: &ProfileId,
    ) -> Result<Vec<ExclusionRecord>, DiscoveryError> {
        let guard = self.inner.lock().await;
        if guard.fail_exclusions {
            return Err(DiscoveryError::unavailable(
                SourceKind::Exclusions,
                "backend unavailable",
            ));
        }
        Ok(guard.exclusions.clone())
    }
}

#[async_trait]
impl ExpiryReporter for InMemorySource {
    async fn mark_expired(&self, record: &ExclusionRecord) -> Result<(), DiscoveryError> {
        let mut guard = self.inner.lock().await;
        if guard.fail_expiry {
            return Err(DiscoveryError::unavailable(
                SourceKind::Expiry,
                "backend unavailable",
            ));
        }
        guard.exclusions.retain(|existing| existing != record);
        guard.expired_reports.push(record.clone());
        Ok(())
    }
}
