//! WordPress export to Contentful import pipeline.
//!
//! Parses a pre-parsed WordPress export document, reformats HTML bodies
//! into rich text, uploads media as assets and creates linked entries
//! through the Contentful management API.
//!
//! The interesting part is the import discipline, not the plumbing:
//!
//! - Remote IDs are derived deterministically from stable natural keys
//!   ([`ids`]), so reruns resolve existing objects instead of creating
//!   duplicates. Get-before-create is mandatory, not an optimization.
//! - Every remote call flows through a single rate-limited [`gateway`]
//!   (one in flight, minimum spacing) because the API enforces request
//!   quotas.
//! - Creates and publishes sit behind a bounded [`retry`] that only
//!   absorbs transient failures.
//! - Stages run in dependency order ([`pipeline`]): assets before the
//!   posts that link them, categories before the furniture that links
//!   those.
//!
//! # Modules
//!
//! - [`export`] - export document types and value normalization
//! - [`classify`] - split items by post type
//! - [`format`] - typed per-post-type records + rich text conversion
//! - [`ids`] - deterministic identifier derivation
//! - [`traits`] / [`store`] - remote store capability and Contentful impl
//! - [`gateway`] - rate-limited decorator over the store
//! - [`retry`] / [`remote`] - bounded retry and get-or-create
//! - [`assets`] / [`entries`] - asset uploader and entry builders
//! - [`pipeline`] - stage orchestration
//! - [`testing`] - mock store for tests

pub mod assets;
pub mod classify;
pub mod config;
pub mod entries;
pub mod error;
pub mod export;
pub mod format;
pub mod gateway;
pub mod ids;
pub mod pipeline;
pub mod remote;
pub mod retry;
pub mod store;
pub mod testing;
pub mod traits;

pub use assets::{upload_attachments, UploadedAsset};
pub use classify::{classify, SKIP_POST_TYPES};
pub use config::Config;
pub use entries::{
    create_categories, create_furniture, create_pages, BuildOutcome, DEFAULT_LOCALE,
};
pub use error::{ImportError, ObjectKind, StoreError};
pub use export::{CategoryDef, ExportDocument, RawItem};
pub use format::{
    format_content, FormattedItem, MarkdownRichText, PostType, RichTextConverter,
};
pub use gateway::Gateway;
pub use ids::{derive_full_id, derive_id};
pub use pipeline::{Pipeline, PipelineContext};
pub use remote::get_or_create_entry;
pub use retry::{retry, RetryPolicy};
pub use store::ContentfulStore;
pub use traits::ContentStore;
