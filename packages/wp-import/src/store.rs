//! Contentful-backed implementation of the content store capability.

use async_trait::async_trait;
use contentful_client::{Asset, ContentfulError, Entry, Environment};
use serde_json::Value;

use crate::error::{ObjectKind, StoreError};
use crate::traits::ContentStore;

/// Adapts a [`contentful_client::Environment`] to the [`ContentStore`]
/// capability, mapping the client's 404 answers to structural
/// [`StoreError::NotFound`] values.
pub struct ContentfulStore {
    environment: Environment,
}

impl ContentfulStore {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

fn map_err(kind: ObjectKind, id: &str, err: ContentfulError) -> StoreError {
    match err {
        ContentfulError::Api { status: 404, .. } => StoreError::NotFound {
            kind,
            id: id.to_string(),
        },
        ContentfulError::Api { status, message } => StoreError::Api { status, message },
        ContentfulError::Http(e) => StoreError::Transport(e.to_string()),
        ContentfulError::MissingVersion { id } => {
            StoreError::Invalid(format!("{kind} {id} has no version"))
        }
    }
}

#[async_trait]
impl ContentStore for ContentfulStore {
    async fn get_asset(&self, asset_id: &str) -> Result<Asset, StoreError> {
        self.environment
            .get_asset(asset_id)
            .await
            .map_err(|e| map_err(ObjectKind::Asset, asset_id, e))
    }

    async fn create_asset_with_id(
        &self,
        asset_id: &str,
        fields: &Value,
    ) -> Result<Asset, StoreError> {
        self.environment
            .create_asset_with_id(asset_id, fields)
            .await
            .map_err(|e| map_err(ObjectKind::Asset, asset_id, e))
    }

    async fn process_asset_for_all_locales(&self, asset: &Asset) -> Result<(), StoreError> {
        self.environment
            .process_asset_for_all_locales(asset)
            .await
            .map_err(|e| map_err(ObjectKind::Asset, &asset.sys.id, e))
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Entry, StoreError> {
        self.environment
            .get_entry(entry_id)
            .await
            .map_err(|e| map_err(ObjectKind::Entry, entry_id, e))
    }

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        entry_id: &str,
        data: &Value,
    ) -> Result<Entry, StoreError> {
        self.environment
            .create_entry_with_id(content_type_id, entry_id, data)
            .await
            .map_err(|e| map_err(ObjectKind::Entry, entry_id, e))
    }

    async fn publish_entry(&self, entry: &Entry) -> Result<Entry, StoreError> {
        self.environment
            .publish_entry(entry)
            .await
            .map_err(|e| map_err(ObjectKind::Entry, &entry.sys.id, e))
    }
}
