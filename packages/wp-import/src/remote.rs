//! Idempotent get-or-create against the remote store.

use contentful_client::Entry;
use serde_json::Value;

use crate::error::StoreError;
use crate::retry::{retry, RetryPolicy};
use crate::traits::ContentStore;

/// Fetch an entry by its deterministic ID, or create and publish it.
///
/// A `NotFound` on the get drives creation; any other get failure
/// propagates unchanged (a 500 must never be mistaken for "absent").
/// Create and publish are individually retried under `policy`. This is
/// the sole mutation path for entries.
pub async fn get_or_create_entry<S: ContentStore + ?Sized>(
    store: &S,
    policy: RetryPolicy,
    content_type_id: &str,
    entry_id: &str,
    data: &Value,
) -> Result<Entry, StoreError> {
    match store.get_entry(entry_id).await {
        Ok(entry) => {
            tracing::debug!(entry_id, "Entry already exists, reusing");
            Ok(entry)
        }
        Err(StoreError::NotFound { .. }) => {
            let entry = retry(policy, "create entry", || {
                store.create_entry_with_id(content_type_id, entry_id, data)
            })
            .await?;
            let published = retry(policy, "publish entry", || store.publish_entry(&entry)).await?;
            tracing::info!(entry_id, content_type_id, "Created and published entry");
            Ok(published)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockContentStore, StoreCall};
    use serde_json::json;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    fn data() -> Value {
        json!({ "fields": { "title": { "en-US": "Oak Table" } } })
    }

    #[tokio::test]
    async fn not_found_creates_and_publishes() {
        let store = MockContentStore::new();
        let entry = get_or_create_entry(&store, policy(), "furniture", "abc123", &data())
            .await
            .unwrap();

        assert_eq!(entry.sys.id, "abc123");
        assert!(entry.sys.published_version.is_some());

        let calls = store.calls();
        assert!(calls.contains(&StoreCall::GetEntry { id: "abc123".into() }));
        assert!(calls.contains(&StoreCall::CreateEntry {
            content_type_id: "furniture".into(),
            id: "abc123".into()
        }));
        assert!(calls.contains(&StoreCall::PublishEntry { id: "abc123".into() }));
    }

    #[tokio::test]
    async fn existing_entry_is_reused_without_mutation() {
        let store = MockContentStore::new();
        get_or_create_entry(&store, policy(), "furniture", "abc123", &data())
            .await
            .unwrap();
        store.clear_calls();

        get_or_create_entry(&store, policy(), "furniture", "abc123", &data())
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls, vec![StoreCall::GetEntry { id: "abc123".into() }]);
    }

    #[tokio::test]
    async fn non_404_get_failure_propagates_without_create() {
        let store = MockContentStore::new().with_get_entry_failure("abc123", 500);
        let result = get_or_create_entry(&store, policy(), "furniture", "abc123", &data()).await;

        assert!(matches!(result, Err(StoreError::Api { status: 500, .. })));
        let calls = store.calls();
        assert!(!calls
            .iter()
            .any(|c| matches!(c, StoreCall::CreateEntry { .. })));
    }

    #[tokio::test]
    async fn transient_create_failures_are_retried() {
        let store = MockContentStore::new().with_transient_create_failures(2);
        let entry = get_or_create_entry(&store, policy(), "furniture", "abc123", &data())
            .await
            .unwrap();

        assert_eq!(entry.sys.id, "abc123");
        let creates = store
            .calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::CreateEntry { .. }))
            .count();
        assert_eq!(creates, 3);
    }
}
