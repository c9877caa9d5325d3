//! Dependency-ordered import pipeline.
//!
//! Stages run in a fixed sequence; each writes its own context fields and
//! reads only what earlier stages wrote. The ordering encodes referential
//! integrity: nothing that links an asset or category runs before that
//! dependency's stage completes.

use std::collections::HashMap;

use contentful_client::Entry;

use crate::assets::{upload_attachments, UploadedAsset};
use crate::classify::classify;
use crate::entries::{
    create_categories, create_furniture, create_pages, BuildOutcome, DEFAULT_LOCALE,
};
use crate::error::Result;
use crate::export::{ExportDocument, RawItem};
use crate::format::{format_content, FormattedItem, PostType, RichTextConverter};
use crate::retry::RetryPolicy;
use crate::traits::ContentStore;

/// Shared state threaded through the pipeline stages. Each field is
/// written by exactly one stage and read by the ones after it.
#[derive(Debug, Default)]
pub struct PipelineContext {
    /// Written by classify: raw items grouped by post type.
    pub classified: HashMap<String, Vec<RawItem>>,
    /// Written by format: normalized items per post type.
    pub content: HashMap<PostType, Vec<FormattedItem>>,
    /// Written by the asset stage: attachment/asset pairs.
    pub assets: Vec<UploadedAsset>,
    /// Written by the category stage.
    pub categories: Vec<BuildOutcome>,
    /// Written by the furniture stage (needs assets + categories).
    pub furniture: Vec<BuildOutcome>,
    /// Written by the page stage (needs assets).
    pub pages: Vec<BuildOutcome>,
}

impl PipelineContext {
    /// Entries created by the category stage.
    pub fn created_categories(&self) -> Vec<Entry> {
        self.categories
            .iter()
            .filter_map(|o| o.entry().cloned())
            .collect()
    }
}

/// The import pipeline. Owns its collaborators; the store handed in is
/// expected to already sit behind the rate-limited gateway.
pub struct Pipeline<S, R> {
    store: S,
    converter: R,
    policy: RetryPolicy,
    locale: String,
}

impl<S: ContentStore, R: RichTextConverter> Pipeline<S, R> {
    pub fn new(store: S, converter: R) -> Self {
        Self {
            store,
            converter,
            policy: RetryPolicy::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Run every stage in order. An uncontained stage failure aborts the
    /// run; whatever was committed stays committed and a rerun resumes
    /// safely through get-or-create.
    pub async fn run(&self, document: &ExportDocument) -> Result<PipelineContext> {
        let mut ctx = PipelineContext::default();
        let channel = &document.rss.channel;

        tracing::info!(items = channel.item.len(), "Splitting export items by post type");
        ctx.classified = classify(&channel.item);

        tracing::info!(post_types = ctx.classified.len(), "Formatting post data");
        ctx.content = format_content(&ctx.classified, &self.converter).await?;

        let attachments = ctx
            .content
            .get(&PostType::Attachment)
            .map(Vec::as_slice)
            .unwrap_or_default();
        tracing::info!(attachments = attachments.len(), "Uploading attachments as assets");
        ctx.assets =
            upload_attachments(&self.store, self.policy, attachments, &self.locale).await?;

        let defs = channel.category_defs();
        tracing::info!(categories = defs.len(), "Creating category entries");
        ctx.categories = create_categories(&self.store, self.policy, &defs, &self.locale).await;
        let created_categories = ctx.created_categories();

        let furniture = ctx
            .content
            .get(&PostType::Furniture)
            .map(Vec::as_slice)
            .unwrap_or_default();
        tracing::info!(items = furniture.len(), "Creating furniture entries");
        ctx.furniture = create_furniture(
            &self.store,
            self.policy,
            furniture,
            &ctx.assets,
            &created_categories,
            &self.locale,
        )
        .await;

        let pages = ctx
            .content
            .get(&PostType::Page)
            .map(Vec::as_slice)
            .unwrap_or_default();
        tracing::info!(items = pages.len(), "Creating page entries");
        ctx.pages =
            create_pages(&self.store, self.policy, pages, &ctx.assets, &self.locale).await;

        tracing::info!(
            assets = ctx.assets.len(),
            categories = ctx.categories.iter().filter(|o| o.is_created()).count(),
            furniture = ctx.furniture.iter().filter(|o| o.is_created()).count(),
            pages = ctx.pages.iter().filter(|o| o.is_created()).count(),
            "Import pipeline complete"
        );

        Ok(ctx)
    }
}
