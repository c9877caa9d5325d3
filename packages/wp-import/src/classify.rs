//! Splits raw export items by declared post type.

use std::collections::HashMap;

use crate::export::{text_value, RawItem};

/// Post types that never migrate.
pub const SKIP_POST_TYPES: &[&str] = &["acf", "nav_menu_item", "wpcf7_contact_form"];

/// Raw field carrying the declared post type.
pub const POST_TYPE_FIELD: &str = "wp:post_type";

/// Group items by post type. Skipped types and items with no readable
/// type are dropped silently; input order is preserved within each group.
/// Unknown types pass through and are rejected by the formatter dispatch.
pub fn classify(items: &[RawItem]) -> HashMap<String, Vec<RawItem>> {
    let mut content: HashMap<String, Vec<RawItem>> = HashMap::new();

    for item in items {
        let Some(post_type) = item.get(POST_TYPE_FIELD).and_then(text_value) else {
            continue;
        };
        if SKIP_POST_TYPES.contains(&post_type.as_str()) {
            continue;
        }
        content.entry(post_type).or_default().push(item.clone());
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(post_type: &str, id: u32) -> RawItem {
        serde_json::from_value(json!({
            "wp:post_type": { "_cdata": post_type },
            "wp:post_id": { "_text": id.to_string() }
        }))
        .unwrap()
    }

    #[test]
    fn groups_by_post_type() {
        let items = vec![item("page", 1), item("furniture", 2), item("page", 3)];
        let content = classify(&items);

        assert_eq!(content["page"].len(), 2);
        assert_eq!(content["furniture"].len(), 1);
    }

    #[test]
    fn excludes_skip_types() {
        let items = vec![item("page", 1), item("nav_menu_item", 2), item("acf", 3)];
        let content = classify(&items);

        assert_eq!(content.len(), 1);
        assert!(content.contains_key("page"));
    }

    #[test]
    fn preserves_input_order_within_group() {
        let items = vec![item("page", 1), item("page", 2), item("page", 3)];
        let content = classify(&items);

        let ids: Vec<String> = content["page"]
            .iter()
            .map(|i| text_value(&i["wp:post_id"]).unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn drops_items_without_a_type() {
        let items = vec![RawItem::new(), item("page", 1)];
        assert_eq!(classify(&items).len(), 1);
    }
}
