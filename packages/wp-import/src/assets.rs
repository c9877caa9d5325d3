//! Uploads export attachments as remote assets.

use futures::future::try_join_all;
use serde_json::json;
use url::Url;

use contentful_client::Asset;

use crate::error::{ImportError, Result, StoreError};
use crate::format::FormattedItem;
use crate::ids;
use crate::retry::{retry, RetryPolicy};
use crate::traits::ContentStore;

/// An uploaded attachment paired with its remote asset. The pairing is
/// the only linkage later stages may use to resolve which asset belongs
/// to which post.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub attachment: FormattedItem,
    pub asset: Asset,
}

/// Materialize every attachment as an asset, reusing assets that already
/// exist under their deterministic ID. Any failure here aborts the run:
/// posts that link assets must not be created against a partial set.
pub async fn upload_attachments<S: ContentStore + ?Sized>(
    store: &S,
    policy: RetryPolicy,
    attachments: &[FormattedItem],
    locale: &str,
) -> Result<Vec<UploadedAsset>> {
    let uploads = attachments
        .iter()
        .map(|attachment| upload_one(store, policy, attachment, locale));
    try_join_all(uploads).await
}

async fn upload_one<S: ContentStore + ?Sized>(
    store: &S,
    policy: RetryPolicy,
    attachment: &FormattedItem,
    locale: &str,
) -> Result<UploadedAsset> {
    let title = attachment.display_title();
    let guid = attachment
        .guid
        .as_deref()
        .ok_or_else(|| ImportError::MissingField {
            title: title.clone(),
            field: "guid",
        })?;

    // Assets use the full-length digest as their ID.
    let asset_id = ids::derive_full_id(guid);

    let asset = match store.get_asset(&asset_id).await {
        Ok(asset) => {
            tracing::debug!(asset_id = %asset_id, %title, "Asset already exists, reusing");
            asset
        }
        Err(StoreError::NotFound { .. }) => {
            let upload_url =
                attachment
                    .attachment_url
                    .as_deref()
                    .ok_or_else(|| ImportError::MissingField {
                        title: title.clone(),
                        field: "attachment_url",
                    })?;

            let (content_type, extension) = file_type_for(upload_url);
            let basename = attachment.slug.as_deref().unwrap_or(&asset_id);
            let fields = json!({
                "title": { locale: title },
                "file": {
                    locale: {
                        "contentType": content_type,
                        "fileName": format!("{basename}.{extension}"),
                        "upload": upload_url,
                    }
                }
            });

            let created = retry(policy, "create asset", || {
                store.create_asset_with_id(&asset_id, &fields)
            })
            .await?;
            retry(policy, "process asset", || {
                store.process_asset_for_all_locales(&created)
            })
            .await?;

            tracing::info!(asset_id = %asset_id, %title, "Uploaded asset");
            created
        }
        Err(e) => return Err(e.into()),
    };

    Ok(UploadedAsset {
        attachment: attachment.clone(),
        asset,
    })
}

/// MIME type and file extension for an attachment URL. Unknown
/// extensions fall back to an octet stream rather than failing the run.
fn file_type_for(upload_url: &str) -> (String, String) {
    let path = Url::parse(upload_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| upload_url.to_string());

    let extension = std::path::Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension {
        Some(ext) => {
            let mime = mime_guess::from_ext(&ext).first_or_octet_stream();
            (mime.essence_str().to_string(), ext)
        }
        None => ("application/octet-stream".to_string(), "bin".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PostType;
    use crate::testing::{MockContentStore, StoreCall};
    use std::collections::HashMap;
    use std::time::Duration;

    fn attachment(guid: &str, slug: &str, url: &str, parent: &str) -> FormattedItem {
        FormattedItem {
            post_type: PostType::Attachment,
            title: Some(format!("{slug} image")),
            slug: Some(slug.to_string()),
            guid: Some(guid.to_string()),
            post_id: Some("99".to_string()),
            post_parent: Some(parent.to_string()),
            post_date: None,
            attachment_url: Some(url.to_string()),
            body: None,
            excerpt: None,
            category_slug: None,
            meta: HashMap::new(),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn creates_asset_with_mime_and_filename() {
        let store = MockContentStore::new();
        let attachments = vec![attachment(
            "https://example.com/?attachment=7",
            "oak-table",
            "https://example.com/uploads/2018/03/oak-table-front.jpg",
            "11",
        )];

        let uploaded = upload_attachments(&store, policy(), &attachments, "en-US")
            .await
            .unwrap();
        assert_eq!(uploaded.len(), 1);

        let file = &uploaded[0].asset.fields["file"]["en-US"];
        assert_eq!(file["contentType"], "image/jpeg");
        assert_eq!(file["fileName"], "oak-table.jpg");
        assert_eq!(
            file["upload"],
            "https://example.com/uploads/2018/03/oak-table-front.jpg"
        );

        let calls = store.calls();
        assert!(calls.iter().any(|c| matches!(c, StoreCall::CreateAsset { .. })));
        assert!(calls.iter().any(|c| matches!(c, StoreCall::ProcessAsset { .. })));
    }

    #[tokio::test]
    async fn second_run_resolves_by_get() {
        let store = MockContentStore::new();
        let attachments = vec![attachment(
            "https://example.com/?attachment=7",
            "oak-table",
            "https://example.com/uploads/oak-table.jpg",
            "11",
        )];

        upload_attachments(&store, policy(), &attachments, "en-US")
            .await
            .unwrap();
        store.clear_calls();

        let uploaded = upload_attachments(&store, policy(), &attachments, "en-US")
            .await
            .unwrap();
        assert_eq!(uploaded.len(), 1);
        assert!(store.mutation_calls().is_empty());
    }

    #[tokio::test]
    async fn same_guid_same_asset_id() {
        let a = ids::derive_full_id("https://example.com/?attachment=7");
        let b = ids::derive_full_id("https://example.com/?attachment=7");
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_extension_falls_back() {
        let (mime, ext) = file_type_for("https://example.com/file.weird");
        assert_eq!(mime, "application/octet-stream");
        assert_eq!(ext, "weird");

        let (mime, ext) = file_type_for("https://example.com/no-extension");
        assert_eq!(mime, "application/octet-stream");
        assert_eq!(ext, "bin");
    }

    #[tokio::test]
    async fn missing_guid_aborts_upload() {
        let store = MockContentStore::new();
        let mut bad = attachment("g", "s", "https://example.com/a.jpg", "1");
        bad.guid = None;

        let err = upload_attachments(&store, policy(), &[bad], "en-US")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingField { field: "guid", .. }));
    }
}
