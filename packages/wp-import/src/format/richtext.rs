//! HTML to rich text conversion.
//!
//! The target store wants structured rich text, not raw HTML. Conversion
//! runs in two steps: HTML to Markdown (htmd), then Markdown events to
//! rich text nodes (pulldown-cmark). The converter is a trait so the
//! pipeline can be exercised without it.

use async_trait::async_trait;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};
use serde_json::{json, Value};

use crate::error::{ImportError, Result};

/// Converts an HTML fragment into a rich text document.
#[async_trait]
pub trait RichTextConverter: Send + Sync {
    /// Absent or empty input yields `None`, not an error. Conversion
    /// failures propagate; there are no retry semantics here.
    async fn convert(&self, html: &str) -> Result<Option<Value>>;
}

/// The shipped converter: HTML -> Markdown -> rich text nodes.
#[derive(Debug, Default)]
pub struct MarkdownRichText;

impl MarkdownRichText {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RichTextConverter for MarkdownRichText {
    async fn convert(&self, html: &str) -> Result<Option<Value>> {
        if html.trim().is_empty() {
            return Ok(None);
        }

        let markdown =
            htmd::convert(html).map_err(|e| ImportError::RichText(e.to_string()))?;
        if markdown.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(document_from_markdown(&markdown)))
    }
}

struct NodeFrame {
    node_type: &'static str,
    data: Value,
    content: Vec<Value>,
}

impl NodeFrame {
    fn new(node_type: &'static str, data: Value) -> Self {
        Self {
            node_type,
            data,
            content: Vec::new(),
        }
    }

    fn into_node(self) -> Value {
        json!({
            "nodeType": self.node_type,
            "data": self.data,
            "content": self.content,
        })
    }
}

/// Assemble a rich text document from Markdown events.
///
/// Inline images are dropped (their alt text included): media arrives
/// through the asset pipeline, not through body content.
fn document_from_markdown(markdown: &str) -> Value {
    let mut stack = vec![NodeFrame::new("document", json!({}))];
    let mut marks: Vec<&'static str> = Vec::new();
    let mut in_code_block = false;
    let mut image_depth: usize = 0;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Image(..)) => image_depth += 1,
            Event::End(Tag::Image(..)) => image_depth = image_depth.saturating_sub(1),
            _ if image_depth > 0 => {}

            Event::Start(tag) => match tag {
                Tag::Paragraph => stack.push(NodeFrame::new("paragraph", json!({}))),
                Tag::Heading(level, ..) => {
                    stack.push(NodeFrame::new(heading_node_type(level), json!({})))
                }
                Tag::BlockQuote => stack.push(NodeFrame::new("blockquote", json!({}))),
                Tag::CodeBlock(_) => {
                    in_code_block = true;
                    stack.push(NodeFrame::new("paragraph", json!({})));
                }
                Tag::List(Some(_)) => stack.push(NodeFrame::new("ordered-list", json!({}))),
                Tag::List(None) => stack.push(NodeFrame::new("unordered-list", json!({}))),
                Tag::Item => stack.push(NodeFrame::new("list-item", json!({}))),
                Tag::Link(_, dest, _) => {
                    stack.push(NodeFrame::new("hyperlink", json!({ "uri": dest.to_string() })))
                }
                Tag::Emphasis => marks.push("italic"),
                Tag::Strong => marks.push("bold"),
                _ => {}
            },
            Event::End(tag) => match tag {
                Tag::Paragraph
                | Tag::Heading(..)
                | Tag::BlockQuote
                | Tag::List(_)
                | Tag::Item
                | Tag::Link(..) => close_node(&mut stack),
                Tag::CodeBlock(_) => {
                    in_code_block = false;
                    close_node(&mut stack);
                }
                Tag::Emphasis | Tag::Strong => {
                    marks.pop();
                }
                _ => {}
            },
            Event::Text(text) => push_text(&mut stack, &text, &marks, in_code_block),
            Event::Code(text) => push_text(&mut stack, &text, &marks, true),
            Event::SoftBreak => push_text(&mut stack, " ", &marks, in_code_block),
            Event::HardBreak => push_text(&mut stack, "\n", &marks, in_code_block),
            Event::Rule => {
                if let Some(top) = stack.last_mut() {
                    top.content
                        .push(json!({ "nodeType": "hr", "data": {}, "content": [] }));
                }
            }
            _ => {}
        }
    }

    // Fold any unbalanced frames back into the document root.
    while stack.len() > 1 {
        close_node(&mut stack);
    }
    let root = stack.pop().expect("document root");
    root.into_node()
}

fn close_node(stack: &mut Vec<NodeFrame>) {
    if stack.len() < 2 {
        return;
    }
    let frame = stack.pop().expect("checked above");
    let node = frame.into_node();
    stack.last_mut().expect("parent frame").content.push(node);
}

fn push_text(stack: &mut [NodeFrame], text: &str, marks: &[&'static str], code: bool) {
    let Some(top) = stack.last_mut() else { return };

    let mut mark_values: Vec<Value> = marks.iter().map(|m| json!({ "type": m })).collect();
    if code {
        mark_values.push(json!({ "type": "code" }));
    }

    top.content.push(json!({
        "nodeType": "text",
        "value": text,
        "marks": mark_values,
        "data": {},
    }));
}

fn heading_node_type(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "heading-1",
        HeadingLevel::H2 => "heading-2",
        HeadingLevel::H3 => "heading-3",
        HeadingLevel::H4 => "heading-4",
        HeadingLevel::H5 => "heading-5",
        HeadingLevel::H6 => "heading-6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_yields_none() {
        let converter = MarkdownRichText::new();
        assert!(converter.convert("").await.unwrap().is_none());
        assert!(converter.convert("   \n").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn paragraph_with_bold_text() {
        let converter = MarkdownRichText::new();
        let doc = converter
            .convert("<p>Hello <strong>world</strong></p>")
            .await
            .unwrap()
            .expect("document");

        assert_eq!(doc["nodeType"], "document");
        let paragraph = &doc["content"][0];
        assert_eq!(paragraph["nodeType"], "paragraph");

        let texts = paragraph["content"].as_array().unwrap();
        assert_eq!(texts[0]["value"], "Hello ");
        assert_eq!(texts[0]["marks"].as_array().unwrap().len(), 0);
        assert_eq!(texts[1]["value"], "world");
        assert_eq!(texts[1]["marks"][0]["type"], "bold");
    }

    #[tokio::test]
    async fn headings_map_to_levels() {
        let converter = MarkdownRichText::new();
        let doc = converter
            .convert("<h2>Section</h2>")
            .await
            .unwrap()
            .expect("document");

        assert_eq!(doc["content"][0]["nodeType"], "heading-2");
    }

    #[tokio::test]
    async fn links_become_hyperlink_nodes() {
        let converter = MarkdownRichText::new();
        let doc = converter
            .convert(r#"<p><a href="https://example.com">go</a></p>"#)
            .await
            .unwrap()
            .expect("document");

        let link = &doc["content"][0]["content"][0];
        assert_eq!(link["nodeType"], "hyperlink");
        assert_eq!(link["data"]["uri"], "https://example.com");
        assert_eq!(link["content"][0]["value"], "go");
    }

    #[tokio::test]
    async fn lists_nest_items() {
        let converter = MarkdownRichText::new();
        let doc = converter
            .convert("<ul><li>one</li><li>two</li></ul>")
            .await
            .unwrap()
            .expect("document");

        let list = &doc["content"][0];
        assert_eq!(list["nodeType"], "unordered-list");
        assert_eq!(list["content"].as_array().unwrap().len(), 2);
        assert_eq!(list["content"][0]["nodeType"], "list-item");
    }
}
