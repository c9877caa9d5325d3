//! Normalizes raw export items into typed per-post-type records.
//!
//! Every known field is extracted explicitly (no reflection-driven
//! renaming): namespace unwrapping, value normalization and rich text
//! conversion happen here, once, and the result is immutable.

pub mod richtext;

pub use richtext::{MarkdownRichText, RichTextConverter};

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{ImportError, Result};
use crate::export::{text_value, RawItem};

/// Post types with a registered formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostType {
    Furniture,
    Page,
    Attachment,
}

impl PostType {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "furniture" => Ok(PostType::Furniture),
            "page" => Ok(PostType::Page),
            "attachment" => Ok(PostType::Attachment),
            other => Err(ImportError::UnsupportedType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Furniture => "furniture",
            PostType::Page => "page",
            PostType::Attachment => "attachment",
        }
    }
}

/// A normalized export item. Created once during formatting, immutable
/// thereafter.
#[derive(Debug, Clone)]
pub struct FormattedItem {
    pub post_type: PostType,
    pub title: Option<String>,
    /// The post's `post_name`, used as the entry slug and natural key
    /// filter.
    pub slug: Option<String>,
    /// Stable GUID, the idempotence key for entries and assets.
    pub guid: Option<String>,
    pub post_id: Option<String>,
    /// Parent post linkage, compared against `post_id` as normalized text.
    pub post_parent: Option<String>,
    pub post_date: Option<String>,
    /// Source media URL (attachments only).
    pub attachment_url: Option<String>,
    /// Rich text document converted from `content:encoded`.
    pub body: Option<Value>,
    /// Rich text document converted from `excerpt:encoded`.
    pub excerpt: Option<Value>,
    /// Category nicename from the item's nested category attribute.
    pub category_slug: Option<String>,
    /// Post-meta key/value pairs.
    pub meta: HashMap<String, String>,
}

impl FormattedItem {
    /// Best display name for diagnostics.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.slug.clone())
            .unwrap_or_else(|| "(untitled)".to_string())
    }
}

/// Strip the namespace prefix from a raw field name and capitalize the
/// segment after each separator: `wp:post_type` becomes `postType`.
/// Used when surfacing unrecognized raw fields in diagnostics.
pub fn normalize_field_name(name: &str) -> String {
    let stripped = name.strip_prefix("wp:").unwrap_or(name);
    let mut out = String::with_capacity(stripped.len());
    let mut upper_next = false;
    for ch in stripped.chars() {
        if ch == ':' || ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Format every classified group. Fails on the first unsupported post
/// type or rich text conversion failure.
pub async fn format_content<R: RichTextConverter + ?Sized>(
    classified: &HashMap<String, Vec<RawItem>>,
    converter: &R,
) -> Result<HashMap<PostType, Vec<FormattedItem>>> {
    let mut content = HashMap::new();

    for (name, items) in classified {
        let post_type = PostType::from_name(name)?;
        let mut formatted = Vec::with_capacity(items.len());
        for item in items {
            formatted.push(format_item(post_type, item, converter).await?);
        }
        tracing::debug!(post_type = post_type.as_str(), count = formatted.len(), "Formatted items");
        content.insert(post_type, formatted);
    }

    Ok(content)
}

/// Normalize one raw item into its typed record.
pub async fn format_item<R: RichTextConverter + ?Sized>(
    post_type: PostType,
    item: &RawItem,
    converter: &R,
) -> Result<FormattedItem> {
    let field = |name: &str| item.get(name).and_then(text_value);

    let body = convert_html(converter, field("content:encoded").as_deref()).await?;
    let excerpt = convert_html(converter, field("excerpt:encoded").as_deref()).await?;

    let category_slug = item
        .get("category")
        .and_then(|c| c.get("_attributes"))
        .and_then(|a| a.get("nicename"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(FormattedItem {
        post_type,
        title: field("title"),
        slug: field("wp:post_name"),
        guid: field("guid"),
        post_id: field("wp:post_id").map(|v| v.trim().to_string()),
        post_parent: field("wp:post_parent").map(|v| v.trim().to_string()),
        post_date: field("wp:post_date"),
        attachment_url: field("wp:attachment_url"),
        body,
        excerpt,
        category_slug,
        meta: post_meta(item),
    })
}

/// Collect post-meta key/value pairs. A single meta entry arrives as an
/// object, several as an array.
fn post_meta(item: &RawItem) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    let Some(list) = item.get("wp:postmeta") else {
        return meta;
    };

    let entries: Vec<&Value> = match list {
        Value::Array(values) => values.iter().collect(),
        other => vec![other],
    };

    for entry in entries {
        let key = entry.get("wp:meta_key").and_then(text_value);
        let value = entry.get("wp:meta_value").and_then(text_value);
        if let (Some(key), Some(value)) = (key, value) {
            meta.insert(key, value);
        }
    }

    meta
}

async fn convert_html<R: RichTextConverter + ?Sized>(
    converter: &R,
    html: Option<&str>,
) -> Result<Option<Value>> {
    match html {
        Some(html) if !html.trim().is_empty() => converter.convert(html).await,
        _ => Ok(None),
    }
}
