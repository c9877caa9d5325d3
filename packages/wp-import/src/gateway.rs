//! Rate-limited gateway in front of the remote content store.
//!
//! The remote API enforces request-rate quotas; tripping them produces
//! failures that are expensive to tell apart from real errors. The
//! gateway wraps any [`ContentStore`] and collapses all calls onto a
//! serialized, spaced schedule: at most one call in flight, and a
//! minimum interval between successive dispatches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contentful_client::{Asset, Entry};
use governor::{Quota, RateLimiter};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::traits::ContentStore;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Decorator enforcing the gateway invariant for an inner store.
///
/// Components receive the wrapped store, never the inner one, so no call
/// can bypass the limit.
pub struct Gateway<S> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
    slot: Mutex<()>,
}

impl<S> Gateway<S> {
    /// Wrap `inner` with a minimum spacing between call dispatches.
    pub fn new(inner: S, min_spacing: Duration) -> Self {
        let quota = Quota::with_period(min_spacing).expect("min_spacing must be > 0");
        Self {
            inner,
            limiter: Arc::new(RateLimiter::direct(quota)),
            slot: Mutex::new(()),
        }
    }

    /// Acquire the single in-flight slot, then wait out the spacing
    /// quota. The returned guard is held across the inner call.
    async fn permit(&self) -> MutexGuard<'_, ()> {
        let slot = self.slot.lock().await;
        self.limiter.until_ready().await;
        slot
    }
}

#[async_trait]
impl<S: ContentStore> ContentStore for Gateway<S> {
    async fn get_asset(&self, asset_id: &str) -> Result<Asset, StoreError> {
        let _slot = self.permit().await;
        self.inner.get_asset(asset_id).await
    }

    async fn create_asset_with_id(
        &self,
        asset_id: &str,
        fields: &Value,
    ) -> Result<Asset, StoreError> {
        let _slot = self.permit().await;
        self.inner.create_asset_with_id(asset_id, fields).await
    }

    async fn process_asset_for_all_locales(&self, asset: &Asset) -> Result<(), StoreError> {
        let _slot = self.permit().await;
        self.inner.process_asset_for_all_locales(asset).await
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Entry, StoreError> {
        let _slot = self.permit().await;
        self.inner.get_entry(entry_id).await
    }

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        entry_id: &str,
        data: &Value,
    ) -> Result<Entry, StoreError> {
        let _slot = self.permit().await;
        self.inner
            .create_entry_with_id(content_type_id, entry_id, data)
            .await
    }

    async fn publish_entry(&self, entry: &Entry) -> Result<Entry, StoreError> {
        let _slot = self.permit().await;
        self.inner.publish_entry(entry).await
    }
}
