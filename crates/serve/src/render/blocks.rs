//! Structured content blocks -> HTML.
//!
//! The CMS delivers rich content as an array of discriminated block objects.
//! Rendering is total: a block that fails to parse is skipped with a warning,
//! and the function always returns a string (possibly empty).

use crate::render::html::{escape_attr, escape_text};
use serde::Deserialize;
use serde_json::Value as Json;
use tracing::warn;

/// One content block, discriminated by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph {
        #[serde(default)]
        children: Vec<Inline>,
    },
    Heading {
        #[serde(default)]
        level: Option<u8>,
        #[serde(default)]
        children: Vec<Inline>,
    },
    List {
        #[serde(default)]
        format: ListFormat,
        #[serde(default)]
        children: Vec<ListItem>,
    },
    Image {
        #[serde(default)]
        image: Json,
    },
    Quote {
        #[serde(default)]
        children: Vec<Inline>,
    },
    Code {
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        children: Vec<Inline>,
    },
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub children: Vec<Inline>,
}

/// A run of inline content inside a block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text {
        #[serde(default)]
        text: String,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        italic: bool,
        #[serde(default)]
        underline: bool,
        #[serde(default)]
        strikethrough: bool,
        #[serde(default)]
        code: bool,
    },
    Link {
        #[serde(default)]
        url: String,
        #[serde(default)]
        children: Vec<Inline>,
    },
}

/// Render a slice of raw block objects to an HTML fragment.
///
/// Unknown or malformed blocks render to nothing; this never fails.
pub fn blocks_to_html(blocks: &[Json]) -> String {
    let mut out = String::new();
    for raw in blocks {
        match serde_json::from_value::<Block>(raw.clone()) {
            Ok(block) => out.push_str(&block.to_html()),
            Err(err) => {
                let kind = raw
                    .get("type")
                    .and_then(Json::as_str)
                    .unwrap_or("<missing type>");
                warn!(block_type = kind, %err, "skipping unrenderable content block");
            }
        }
    }
    out
}

impl Block {
    pub fn to_html(&self) -> String {
        match self {
            Block::Paragraph { children } => format!("<p>{}</p>", inlines_to_html(children)),
            Block::Heading { level, children } => {
                let level = level.unwrap_or(2).clamp(1, 6);
                format!("<h{level}>{}</h{level}>", inlines_to_html(children))
            }
            Block::List { format, children } => {
                let tag = match format {
                    ListFormat::Ordered => "ol",
                    ListFormat::Unordered => "ul",
                };
                let items: String = children
                    .iter()
                    .map(|item| format!("<li>{}</li>", inlines_to_html(&item.children)))
                    .collect();
                format!("<{tag}>{items}</{tag}>")
            }
            Block::Image { image } => {
                let Some(url) = image.get("url").and_then(Json::as_str) else {
                    warn!("image block without a url, skipping");
                    return String::new();
                };
                let alt = image
                    .get("alternativeText")
                    .and_then(Json::as_str)
                    .unwrap_or("");
                format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_attr(url),
                    escape_attr(alt)
                )
            }
            Block::Quote { children } => {
                format!("<blockquote>{}</blockquote>", inlines_to_html(children))
            }
            Block::Code { language, children } => {
                let text: String = children
                    .iter()
                    .map(|inline| match inline {
                        Inline::Text { text, .. } => escape_text(text),
                        Inline::Link { children, .. } => inlines_to_html(children),
                    })
                    .collect();
                match language {
                    Some(lang) if !lang.is_empty() => format!(
                        "<pre><code class=\"language-{}\">{text}</code></pre>",
                        escape_attr(lang)
                    ),
                    _ => format!("<pre><code>{text}</code></pre>"),
                }
            }
        }
    }
}

fn inlines_to_html(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::to_html).collect()
}

impl Inline {
    /// Marks nest in a fixed order, bold outermost: strong > em > u > s > code.
    /// Links wrap outside every mark.
    pub fn to_html(&self) -> String {
        match self {
            Inline::Text {
                text,
                bold,
                italic,
                underline,
                strikethrough,
                code,
            } => {
                let mut html = escape_text(text);
                if *code {
                    html = format!("<code>{html}</code>");
                }
                if *strikethrough {
                    html = format!("<s>{html}</s>");
                }
                if *underline {
                    html = format!("<u>{html}</u>");
                }
                if *italic {
                    html = format!("<em>{html}</em>");
                }
                if *bold {
                    html = format!("<strong>{html}</strong>");
                }
                html
            }
            Inline::Link { url, children } => {
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape_attr(url),
                    inlines_to_html(children)
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(blocks: Json) -> String {
        let arr = blocks.as_array().expect("test blocks are an array");
        blocks_to_html(arr)
    }

    // ─────────────────────────────────────────────────────────────
    // Block-level rendering
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn paragraph_renders_children() {
        let html = render(json!([
            { "type": "paragraph", "children": [ { "type": "text", "text": "hello" } ] }
        ]));
        assert_eq!(html, "<p>hello</p>");
    }

    #[test]
    fn heading_level_is_clamped() {
        let html = render(json!([
            { "type": "heading", "level": 9, "children": [ { "type": "text", "text": "deep" } ] },
            { "type": "heading", "children": [ { "type": "text", "text": "default" } ] }
        ]));
        assert_eq!(html, "<h6>deep</h6><h2>default</h2>");
    }

    #[test]
    fn ordered_and_unordered_lists() {
        let html = render(json!([
            { "type": "list", "format": "ordered", "children": [
                { "type": "list-item", "children": [ { "type": "text", "text": "one" } ] },
                { "type": "list-item", "children": [ { "type": "text", "text": "two" } ] }
            ]},
            { "type": "list", "children": [
                { "type": "list-item", "children": [ { "type": "text", "text": "loose" } ] }
            ]}
        ]));
        assert_eq!(
            html,
            "<ol><li>one</li><li>two</li></ol><ul><li>loose</li></ul>"
        );
    }

    #[test]
    fn image_block_renders_src_and_alt() {
        let html = render(json!([
            { "type": "image", "image": { "url": "https://cdn.example.com/a.jpg", "alternativeText": "An apple" } }
        ]));
        assert_eq!(
            html,
            "<img src=\"https://cdn.example.com/a.jpg\" alt=\"An apple\">"
        );
    }

    #[test]
    fn image_block_without_url_renders_nothing() {
        let html = render(json!([ { "type": "image", "image": {} } ]));
        assert_eq!(html, "");
    }

    #[test]
    fn code_block_escapes_and_tags_language() {
        let html = render(json!([
            { "type": "code", "language": "rust", "children": [ { "type": "text", "text": "a < b" } ] }
        ]));
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">a &lt; b</code></pre>"
        );
    }

    #[test]
    fn quote_block_renders_blockquote() {
        let html = render(json!([
            { "type": "quote", "children": [ { "type": "text", "text": "sleep more" } ] }
        ]));
        assert_eq!(html, "<blockquote>sleep more</blockquote>");
    }

    // ─────────────────────────────────────────────────────────────
    // Inline marks
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn marks_nest_in_fixed_order() {
        let html = render(json!([
            { "type": "paragraph", "children": [
                { "type": "text", "text": "x", "bold": true, "italic": true,
                  "underline": true, "strikethrough": true, "code": true }
            ]}
        ]));
        assert_eq!(
            html,
            "<p><strong><em><u><s><code>x</code></s></u></em></strong></p>"
        );
    }

    #[test]
    fn link_wraps_outside_marks() {
        let html = render(json!([
            { "type": "paragraph", "children": [
                { "type": "link", "url": "https://example.com", "children": [
                    { "type": "text", "text": "go", "bold": true }
                ]}
            ]}
        ]));
        assert_eq!(
            html,
            "<p><a href=\"https://example.com\"><strong>go</strong></a></p>"
        );
    }

    #[test]
    fn text_content_is_escaped() {
        let html = render(json!([
            { "type": "paragraph", "children": [ { "type": "text", "text": "<script>" } ] }
        ]));
        assert_eq!(html, "<p>&lt;script&gt;</p>");
    }

    // ─────────────────────────────────────────────────────────────
    // Tolerance
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn unknown_block_type_is_skipped_not_fatal() {
        let html = render(json!([
            { "type": "carousel", "children": [] },
            { "type": "paragraph", "children": [ { "type": "text", "text": "kept" } ] }
        ]));
        assert_eq!(html, "<p>kept</p>");
    }

    #[test]
    fn empty_input_renders_empty_string() {
        assert_eq!(blocks_to_html(&[]), "");
    }

    #[test]
    fn non_object_blocks_are_skipped() {
        let html = render(json!([null, 42, "text", { "type": "paragraph", "children": [] }]));
        assert_eq!(html, "<p></p>");
    }
}
