//! Builders for category, furniture and page entries.
//!
//! Builders assemble locale-wrapped field payloads, resolve links to
//! uploaded assets and created categories, and drive the get-or-create
//! primitive. A failure on one item never aborts its siblings: outcomes
//! carry the failure instead.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use serde_json::{json, Map, Value};

use contentful_client::{Entry, Link};

use crate::assets::UploadedAsset;
use crate::error::ImportError;
use crate::export::CategoryDef;
use crate::format::FormattedItem;
use crate::ids;
use crate::remote::get_or_create_entry;
use crate::retry::RetryPolicy;
use crate::traits::ContentStore;

/// Locale every entry field is written under.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Outcome of building one entry.
#[derive(Debug)]
pub enum BuildOutcome {
    Created(Entry),
    Skipped { title: String, reason: &'static str },
    Failed { title: String, error: ImportError },
}

impl BuildOutcome {
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            BuildOutcome::Created(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, BuildOutcome::Created(_))
    }
}

/// Wrap every field value in a locale map.
fn locale_wrap(fields: Map<String, Value>, locale: &str) -> Value {
    let wrapped: Map<String, Value> = fields
        .into_iter()
        .map(|(name, value)| (name, json!({ locale: value })))
        .collect();
    Value::Object(wrapped)
}

/// Entry creation timestamp from the post date's date part.
fn created_at(post_date: Option<&str>) -> Option<String> {
    let date_part = post_date?.split_whitespace().next()?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc).to_rfc3339())
}

fn entry_data(fields: Map<String, Value>, post_date: Option<&str>, locale: &str) -> Value {
    let mut data = Map::new();
    if let Some(timestamp) = created_at(post_date) {
        data.insert("sys".to_string(), json!({ "createdAt": timestamp }));
    }
    data.insert("fields".to_string(), locale_wrap(fields, locale));
    Value::Object(data)
}

/// Asset links for every uploaded attachment whose parent is this post.
fn asset_links(assets: &[UploadedAsset], post_id: Option<&str>) -> Vec<Value> {
    let Some(post_id) = post_id else {
        return Vec::new();
    };
    assets
        .iter()
        .filter(|ua| ua.attachment.post_parent.as_deref() == Some(post_id))
        .map(|ua| Link::asset(&ua.asset.sys.id).into())
        .collect()
}

/// Link to the created category entry whose slug matches, if any.
fn category_link(categories: &[Entry], slug: &str, locale: &str) -> Option<Value> {
    categories
        .iter()
        .find(|category| {
            category
                .fields
                .get("slug")
                .and_then(|s| s.get(locale))
                .and_then(Value::as_str)
                == Some(slug)
        })
        .map(|category| Link::entry(&category.sys.id).into())
}

fn parse_price(meta: &HashMap<String, String>) -> Option<f64> {
    meta.get("price").and_then(|p| p.trim().parse::<f64>().ok())
}

/// Coerce a meta flag to a boolean. Deliberately stricter than JS
/// truthiness: "0" and "false" are false.
fn parse_flag(value: Option<&String>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// Create one entry per category definition.
pub async fn create_categories<S: ContentStore + ?Sized>(
    store: &S,
    policy: RetryPolicy,
    defs: &[CategoryDef],
    locale: &str,
) -> Vec<BuildOutcome> {
    join_all(defs.iter().map(|def| async move {
        if def.slug.is_empty() {
            return BuildOutcome::Skipped {
                title: def.title.clone(),
                reason: "empty slug",
            };
        }

        let entry_id = ids::derive_id(&def.slug);
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!(def.title));
        fields.insert("slug".to_string(), json!(def.slug));
        let data = json!({ "fields": locale_wrap(fields, locale) });

        match get_or_create_entry(store, policy, "category", &entry_id, &data).await {
            Ok(entry) => BuildOutcome::Created(entry),
            Err(error) => {
                tracing::error!(
                    title = %def.title,
                    payload = %data,
                    error = %error,
                    "Failed to create category"
                );
                BuildOutcome::Failed {
                    title: def.title.clone(),
                    error: error.into(),
                }
            }
        }
    }))
    .await
}

/// Create one furniture entry per formatted item with a slug.
pub async fn create_furniture<S: ContentStore + ?Sized>(
    store: &S,
    policy: RetryPolicy,
    items: &[FormattedItem],
    assets: &[UploadedAsset],
    categories: &[Entry],
    locale: &str,
) -> Vec<BuildOutcome> {
    join_all(items.iter().map(|item| async move {
        let title = item.display_title();

        if item.slug.as_deref().unwrap_or("").is_empty() {
            return BuildOutcome::Skipped {
                title,
                reason: "empty slug",
            };
        }

        let Some(guid) = item.guid.as_deref() else {
            return BuildOutcome::Failed {
                title: title.clone(),
                error: ImportError::MissingField {
                    title,
                    field: "guid",
                },
            };
        };
        let entry_id = ids::derive_id(guid);

        let mut fields = Map::new();
        if let Some(t) = &item.title {
            fields.insert("title".to_string(), json!(t));
        }
        fields.insert("slug".to_string(), json!(item.slug));
        if let Some(body) = &item.body {
            fields.insert("body".to_string(), body.clone());
        }
        fields.insert(
            "images".to_string(),
            Value::Array(asset_links(assets, item.post_id.as_deref())),
        );
        if let Some(price) = parse_price(&item.meta) {
            fields.insert("price".to_string(), json!(price));
        }
        if let Some(dimensions) = item.meta.get("dimensions") {
            fields.insert("dimensions".to_string(), json!(dimensions));
        }
        fields.insert(
            "sold".to_string(),
            json!(parse_flag(item.meta.get("sold"))),
        );
        if let Some(link) = item
            .category_slug
            .as_deref()
            .and_then(|slug| category_link(categories, slug, locale))
        {
            fields.insert("categories".to_string(), Value::Array(vec![link]));
        }

        let data = entry_data(fields, item.post_date.as_deref(), locale);

        match get_or_create_entry(store, policy, "furniture", &entry_id, &data).await {
            Ok(entry) => BuildOutcome::Created(entry),
            Err(error) => {
                tracing::error!(
                    title = %title,
                    payload = %data,
                    error = %error,
                    "Failed to create furniture entry"
                );
                BuildOutcome::Failed {
                    title,
                    error: error.into(),
                }
            }
        }
    }))
    .await
}

/// Create one page entry per formatted item with a slug.
pub async fn create_pages<S: ContentStore + ?Sized>(
    store: &S,
    policy: RetryPolicy,
    items: &[FormattedItem],
    assets: &[UploadedAsset],
    locale: &str,
) -> Vec<BuildOutcome> {
    join_all(items.iter().map(|item| async move {
        let title = item.display_title();

        if item.slug.as_deref().unwrap_or("").is_empty() {
            return BuildOutcome::Skipped {
                title,
                reason: "empty slug",
            };
        }

        let Some(guid) = item.guid.as_deref() else {
            return BuildOutcome::Failed {
                title: title.clone(),
                error: ImportError::MissingField {
                    title,
                    field: "guid",
                },
            };
        };
        let entry_id = ids::derive_id(guid);

        let mut fields = Map::new();
        if let Some(t) = &item.title {
            fields.insert("title".to_string(), json!(t));
        }
        fields.insert("slug".to_string(), json!(item.slug));
        if let Some(body) = &item.body {
            fields.insert("body".to_string(), body.clone());
        }
        // Zero-or-one featured image: first matching attachment wins.
        if let Some(link) = asset_links(assets, item.post_id.as_deref()).into_iter().next() {
            fields.insert("featuredImage".to_string(), link);
        }

        let data = entry_data(fields, item.post_date.as_deref(), locale);

        match get_or_create_entry(store, policy, "page", &entry_id, &data).await {
            Ok(entry) => BuildOutcome::Created(entry),
            Err(error) => {
                tracing::error!(
                    title = %title,
                    payload = %data,
                    error = %error,
                    "Failed to create page entry"
                );
                BuildOutcome::Failed {
                    title,
                    error: error.into(),
                }
            }
        }
    }))
    .await
}
