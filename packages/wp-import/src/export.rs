//! Types and helpers for the pre-parsed WordPress export document.
//!
//! The export is a JSON mirror of the XML export: a channel with a list
//! of items whose fields are namespaced (`wp:post_type`) and whose values
//! arrive either as plain strings, as `{"_cdata": ...}` / `{"_text": ...}`
//! wrappers, or as nested structures.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// A raw export item: namespaced field name to value, shape untouched.
pub type RawItem = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Deserialize)]
pub struct ExportDocument {
    pub rss: Rss,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rss {
    pub channel: Channel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub item: Vec<RawItem>,

    /// Category term definitions, separate from the item list.
    #[serde(rename = "wp:category", default)]
    pub category: Vec<Value>,
}

/// A category definition from the channel's term list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDef {
    pub title: String,
    pub slug: String,
}

impl Channel {
    /// Extract the channel's category definitions. Terms without a
    /// readable name or nicename are dropped.
    pub fn category_defs(&self) -> Vec<CategoryDef> {
        self.category
            .iter()
            .filter_map(|term| {
                let title = term.get("wp:cat_name").and_then(text_value)?;
                let slug = term.get("wp:category_nicename").and_then(text_value)?;
                Some(CategoryDef { title, slug })
            })
            .collect()
    }
}

lazy_static! {
    /// In-body "read more" marker plus any whitespace that follows it.
    static ref MORE_MARKER: Regex = Regex::new(r"<!--more-->\s*").expect("static pattern");
}

/// Unwrap a single export field value.
///
/// CDATA and text wrappers are unwrapped, string values normalized, and
/// empty structured values collapsed to `None`. Numbers (term IDs and the
/// like) become their decimal text form.
pub fn text_value(value: &Value) -> Option<String> {
    let unwrapped = value
        .get("_cdata")
        .or_else(|| value.get("_text"))
        .unwrap_or(value);

    match unwrapped {
        Value::String(s) => Some(normalize_text(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Strip the more-marker and normalize line endings.
pub fn normalize_text(raw: &str) -> String {
    MORE_MARKER.replace_all(raw, "").replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_cdata_and_normalizes() {
        let value = json!({ "_cdata": "Hello<!--more-->World\r\n" });
        assert_eq!(text_value(&value).as_deref(), Some("HelloWorld\n"));
    }

    #[test]
    fn unwraps_text_wrapper() {
        let value = json!({ "_text": "plain" });
        assert_eq!(text_value(&value).as_deref(), Some("plain"));
    }

    #[test]
    fn empty_object_collapses_to_none() {
        let value = json!({});
        assert_eq!(text_value(&value), None);
    }

    #[test]
    fn bare_string_and_number_pass_through() {
        assert_eq!(text_value(&json!("x")).as_deref(), Some("x"));
        assert_eq!(text_value(&json!(42)).as_deref(), Some("42"));
    }

    #[test]
    fn marker_strips_following_whitespace() {
        assert_eq!(normalize_text("a<!--more-->  \n b"), "a b");
    }

    #[test]
    fn category_defs_from_channel() {
        let channel: Channel = serde_json::from_value(json!({
            "item": [],
            "wp:category": [
                {
                    "wp:cat_name": { "_cdata": "Tables" },
                    "wp:category_nicename": { "_cdata": "tables" },
                    "wp:term_id": 3
                },
                { "wp:term_id": 4 }
            ]
        }))
        .unwrap();

        let defs = channel.category_defs();
        assert_eq!(
            defs,
            vec![CategoryDef {
                title: "Tables".into(),
                slug: "tables".into()
            }]
        );
    }
}
