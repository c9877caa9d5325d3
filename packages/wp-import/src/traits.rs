//! Capability trait for the remote content store (to allow mocking).
//!
//! Every remote mutation the pipeline performs goes through this surface.
//! Implementations must make "not found" structurally distinguishable
//! ([`StoreError::NotFound`]) from every other failure, because it drives
//! the create branch of get-or-create.

use async_trait::async_trait;
use contentful_client::{Asset, Entry};
use serde_json::Value;

use crate::error::StoreError;

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_asset(&self, asset_id: &str) -> Result<Asset, StoreError>;

    async fn create_asset_with_id(
        &self,
        asset_id: &str,
        fields: &Value,
    ) -> Result<Asset, StoreError>;

    /// Trigger media processing for every locale on the asset.
    async fn process_asset_for_all_locales(&self, asset: &Asset) -> Result<(), StoreError>;

    async fn get_entry(&self, entry_id: &str) -> Result<Entry, StoreError>;

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        entry_id: &str,
        data: &Value,
    ) -> Result<Entry, StoreError>;

    async fn publish_entry(&self, entry: &Entry) -> Result<Entry, StoreError>;
}
