//! Test doubles for the remote content store.
//!
//! Useful for exercising the pipeline without network calls. The mock
//! records every call for assertions and supports injected failures.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use contentful_client::{Asset, Entry, Sys};
use serde_json::Value;

use crate::error::{ObjectKind, StoreError};
use crate::traits::ContentStore;

/// Record of a call made to the mock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetAsset { id: String },
    CreateAsset { id: String },
    ProcessAsset { id: String },
    GetEntry { id: String },
    CreateEntry { content_type_id: String, id: String },
    PublishEntry { id: String },
}

impl StoreCall {
    /// True for calls that mutate the remote store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::CreateAsset { .. }
                | StoreCall::ProcessAsset { .. }
                | StoreCall::CreateEntry { .. }
                | StoreCall::PublishEntry { .. }
        )
    }
}

/// In-memory [`ContentStore`] with call recording and injectable
/// failures. Clones share state, so a clone handed to a pipeline can be
/// inspected afterwards.
#[derive(Default, Clone)]
pub struct MockContentStore {
    assets: Arc<RwLock<HashMap<String, Asset>>>,
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    /// get_entry failures by ID: status code to answer with.
    get_entry_failures: Arc<RwLock<HashMap<String, u16>>>,
    /// Number of upcoming create calls to fail with a 503.
    transient_create_failures: Arc<RwLock<u32>>,
    calls: Arc<RwLock<Vec<StoreCall>>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing entry.
    pub fn with_entry(self, entry: Entry) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert(entry.sys.id.clone(), entry);
        self
    }

    /// Seed an existing asset.
    pub fn with_asset(self, asset: Asset) -> Self {
        self.assets
            .write()
            .unwrap()
            .insert(asset.sys.id.clone(), asset);
        self
    }

    /// Make `get_entry` for `id` answer with an API error of `status`.
    pub fn with_get_entry_failure(self, id: &str, status: u16) -> Self {
        self.get_entry_failures
            .write()
            .unwrap()
            .insert(id.to_string(), status);
        self
    }

    /// Fail the next `n` create calls with a 503 before succeeding.
    pub fn with_transient_create_failures(self, n: u32) -> Self {
        *self.transient_create_failures.write().unwrap() = n;
        self
    }

    /// All calls made to this mock, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().unwrap().clone()
    }

    /// Calls that mutated the store.
    pub fn mutation_calls(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(StoreCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Look up a stored entry by ID.
    pub fn entry(&self, id: &str) -> Option<Entry> {
        self.entries.read().unwrap().get(id).cloned()
    }

    /// Look up a stored asset by ID.
    pub fn asset(&self, id: &str) -> Option<Asset> {
        self.assets.read().unwrap().get(id).cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.read().unwrap().len()
    }

    fn record(&self, call: StoreCall) {
        self.calls.write().unwrap().push(call);
    }

    fn take_transient_failure(&self) -> bool {
        let mut remaining = self.transient_create_failures.write().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

fn draft_sys(id: &str, kind: &str) -> Sys {
    Sys {
        id: id.to_string(),
        kind: Some(kind.to_string()),
        version: Some(1),
        published_version: None,
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn get_asset(&self, asset_id: &str) -> Result<Asset, StoreError> {
        self.record(StoreCall::GetAsset {
            id: asset_id.to_string(),
        });
        self.assets
            .read()
            .unwrap()
            .get(asset_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: ObjectKind::Asset,
                id: asset_id.to_string(),
            })
    }

    async fn create_asset_with_id(
        &self,
        asset_id: &str,
        fields: &Value,
    ) -> Result<Asset, StoreError> {
        self.record(StoreCall::CreateAsset {
            id: asset_id.to_string(),
        });
        if self.take_transient_failure() {
            return Err(StoreError::Api {
                status: 503,
                message: "service unavailable".into(),
            });
        }

        let asset = Asset {
            sys: draft_sys(asset_id, "Asset"),
            fields: fields.clone(),
        };
        self.assets
            .write()
            .unwrap()
            .insert(asset_id.to_string(), asset.clone());
        Ok(asset)
    }

    async fn process_asset_for_all_locales(&self, asset: &Asset) -> Result<(), StoreError> {
        self.record(StoreCall::ProcessAsset {
            id: asset.sys.id.clone(),
        });
        Ok(())
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Entry, StoreError> {
        self.record(StoreCall::GetEntry {
            id: entry_id.to_string(),
        });

        if let Some(status) = self.get_entry_failures.read().unwrap().get(entry_id) {
            return Err(StoreError::Api {
                status: *status,
                message: "injected failure".into(),
            });
        }

        self.entries
            .read()
            .unwrap()
            .get(entry_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: ObjectKind::Entry,
                id: entry_id.to_string(),
            })
    }

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        entry_id: &str,
        data: &Value,
    ) -> Result<Entry, StoreError> {
        self.record(StoreCall::CreateEntry {
            content_type_id: content_type_id.to_string(),
            id: entry_id.to_string(),
        });
        if self.take_transient_failure() {
            return Err(StoreError::Api {
                status: 503,
                message: "service unavailable".into(),
            });
        }

        let entry = Entry {
            sys: draft_sys(entry_id, "Entry"),
            fields: data.get("fields").cloned().unwrap_or(Value::Null),
        };
        self.entries
            .write()
            .unwrap()
            .insert(entry_id.to_string(), entry.clone());
        Ok(entry)
    }

    async fn publish_entry(&self, entry: &Entry) -> Result<Entry, StoreError> {
        self.record(StoreCall::PublishEntry {
            id: entry.sys.id.clone(),
        });

        let mut entries = self.entries.write().unwrap();
        let stored = entries
            .get_mut(&entry.sys.id)
            .ok_or_else(|| StoreError::NotFound {
                kind: ObjectKind::Entry,
                id: entry.sys.id.clone(),
            })?;
        stored.sys.published_version = stored.sys.version;
        Ok(stored.clone())
    }
}
