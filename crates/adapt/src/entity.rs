//! Total transforms from CMS payloads to the internal content model.
//!
//! Every function here accepts arbitrary JSON and returns a valid entity:
//! unrecognized article payloads become the error placeholder, unrecognized
//! relations become sentinels. Nothing in this module panics or errors.

use crate::envelope::Envelope;
use crate::media::extract_image_url;
use crate::relation::{self, Related};
use chrono::{DateTime, Utc};
use domain::content::{Article, Author, Category, Tag};
use serde_json::Value as Json;
use serve::render::{blocks_to_html, ensure_body_wrapper, escape_attr, escape_text};
use tracing::warn;

const PLACEHOLDER_HTML: &str = "<p>This article's content is being prepared. Check back soon.</p>";

/// CMS payload -> internal model. Holds the CMS base URL for media
/// resolution; construct once and share.
#[derive(Debug, Clone)]
pub struct Transformer {
    base_url: String,
}

impl Transformer {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Transform one article payload. Total: malformed input yields the
    /// error placeholder, never a panic.
    pub fn article(&self, raw: &Json) -> Article {
        let envelope = Envelope::parse(raw);
        let Some(fields) = envelope.fields() else {
            warn!("unrecognized article payload shape");
            return Article::error_placeholder("unrecognized article payload");
        };

        let title = str_field(fields, "title").unwrap_or("Untitled").to_string();
        let slug = str_field(fields, "slug")
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&title));

        let image = ["image", "cover"]
            .iter()
            .filter_map(|key| fields.get(key))
            .find_map(|field| extract_image_url(field, &self.base_url))
            .unwrap_or_default();

        let category = match relation::resolve(fields.get("category")) {
            Related::Entity(entity) => self.category(entity),
            Related::Name(name) => named_category(name),
            Related::Absent => Category::uncategorized(),
        };

        let author = match relation::resolve(fields.get("author")) {
            Related::Entity(entity) => self.author(entity),
            Related::Name(name) => Author {
                name: name.to_string(),
                ..Author::unknown()
            },
            Related::Absent => Author::unknown(),
        };

        let tags = relation::resolve_many(fields.get("tags"))
            .into_iter()
            .filter_map(|item| self.try_tag(item))
            .collect();

        Article {
            id: envelope.id(),
            title,
            slug,
            content: self.extract_content(fields),
            excerpt: str_field(fields, "excerpt").unwrap_or("").to_string(),
            published_at: parse_published_at(fields),
            image,
            category,
            author,
            tags,
            featured: bool_field(fields, "featured"),
        }
    }

    /// Transform a category payload; sentinel on malformed input.
    pub fn category(&self, raw: &Json) -> Category {
        let envelope = Envelope::parse(raw);
        let Some(fields) = envelope.fields() else {
            warn!("unrecognized category payload shape");
            return Category::uncategorized();
        };

        let name = str_field(fields, "name")
            .unwrap_or("Uncategorized")
            .to_string();
        let slug = str_field(fields, "slug")
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&name));

        Category {
            id: envelope.id(),
            name,
            slug,
            description: str_field(fields, "description").unwrap_or("").to_string(),
            image: fields
                .get("image")
                .and_then(|field| extract_image_url(field, &self.base_url))
                .unwrap_or_default(),
        }
    }

    /// Transform a tag payload; sentinel on malformed input.
    pub fn tag(&self, raw: &Json) -> Tag {
        self.try_tag(raw).unwrap_or_else(|| {
            warn!("unrecognized tag payload shape");
            Tag::uncategorized()
        })
    }

    /// `None` when the payload matches no known shape; collection callers
    /// drop those instead of keeping sentinels.
    pub fn try_tag(&self, raw: &Json) -> Option<Tag> {
        if let Some(name) = raw.as_str() {
            return Some(Tag {
                id: 0,
                name: name.to_string(),
                slug: slugify(name),
            });
        }

        let envelope = Envelope::parse(raw);
        let fields = envelope.fields()?;
        let name = str_field(fields, "name")?.to_string();
        let slug = str_field(fields, "slug")
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&name));

        Some(Tag {
            id: envelope.id(),
            name,
            slug,
        })
    }

    /// Transform an author payload; sentinel on malformed input.
    pub fn author(&self, raw: &Json) -> Author {
        let envelope = Envelope::parse(raw);
        let Some(fields) = envelope.fields() else {
            warn!("unrecognized author payload shape");
            return Author::unknown();
        };

        Author {
            id: envelope.id(),
            name: str_field(fields, "name").unwrap_or("Unknown").to_string(),
            bio: str_field(fields, "bio").unwrap_or("").to_string(),
            email: str_field(fields, "email").unwrap_or("").to_string(),
            avatar: fields
                .get("avatar")
                .and_then(|field| extract_image_url(field, &self.base_url))
                .unwrap_or_default(),
        }
    }

    /// Content extraction cascade, first non-empty wins:
    /// structured-block array -> pre-rendered HTML string -> lowercase
    /// alternate field -> dynamic zone -> description -> placeholder.
    /// Whatever wins ends up wrapped in the body container exactly once.
    fn extract_content(&self, fields: &Json) -> String {
        for key in ["Content", "content"] {
            match fields.get(key) {
                Some(Json::Array(blocks)) => {
                    let html = blocks_to_html(blocks);
                    if !html.trim().is_empty() {
                        return ensure_body_wrapper(&html);
                    }
                }
                Some(Json::String(html)) if !html.trim().is_empty() => {
                    return ensure_body_wrapper(html);
                }
                _ => {}
            }
        }

        if let Some(Json::Array(zone)) = fields.get("blocks") {
            let html = self.dynamic_zone_html(zone);
            if !html.trim().is_empty() {
                return ensure_body_wrapper(&html);
            }
        }

        if let Some(description) = str_field(fields, "description") {
            return ensure_body_wrapper(&format!("<p>{}</p>", escape_text(description)));
        }

        ensure_body_wrapper(PLACEHOLDER_HTML)
    }

    /// Dynamic-zone content: heterogeneous component blocks tagged with a
    /// `__component` discriminator. Unknown components are skipped.
    fn dynamic_zone_html(&self, zone: &[Json]) -> String {
        let mut out = String::new();
        for block in zone {
            let Some(component) = block.get("__component").and_then(Json::as_str) else {
                warn!("dynamic-zone block without __component, skipping");
                continue;
            };

            match component.rsplit('.').next().unwrap_or(component) {
                "rich-text" => {
                    if let Some(body) = str_field(block, "body") {
                        out.push_str(body);
                    }
                }
                "quote" => {
                    out.push_str("<blockquote>");
                    if let Some(body) = str_field(block, "body") {
                        out.push_str(&format!("<p>{}</p>", escape_text(body)));
                    }
                    if let Some(title) = str_field(block, "title") {
                        out.push_str(&format!("<cite>{}</cite>", escape_text(title)));
                    }
                    out.push_str("</blockquote>");
                }
                "media" => {
                    if let Some(url) = block
                        .get("file")
                        .and_then(|file| extract_image_url(file, &self.base_url))
                    {
                        out.push_str(&format!("<img src=\"{}\">", escape_attr(&url)));
                    }
                }
                "slider" => {
                    for file in relation::resolve_many(block.get("files")) {
                        if let Some(url) = extract_image_url(file, &self.base_url) {
                            out.push_str(&format!("<img src=\"{}\">", escape_attr(&url)));
                        }
                    }
                }
                other => warn!(component = other, "unknown dynamic-zone component, skipping"),
            }
        }
        out
    }
}

fn named_category(name: &str) -> Category {
    Category {
        id: 0,
        name: name.to_string(),
        slug: slugify(name),
        description: String::new(),
        image: String::new(),
    }
}

/// Non-empty trimmed string field, or `None`.
fn str_field<'a>(fields: &'a Json, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Json::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Booleans arrive as `true`, `1`, or `"true"` depending on the schema
/// generation.
fn bool_field(fields: &Json, key: &str) -> bool {
    match fields.get(key) {
        Some(Json::Bool(b)) => *b,
        Some(Json::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Json::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn parse_published_at(fields: &Json) -> DateTime<Utc> {
    ["publishedAt", "published_at"]
        .iter()
        .filter_map(|key| fields.get(key))
        .filter_map(Json::as_str)
        .find_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Lowercased, hyphen-separated routing key derived from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::content::BODY_CONTAINER_CLASS;
    use serde_json::json;

    fn transformer() -> Transformer {
        Transformer::new("https://cms.example.com/")
    }

    // ─────────────────────────────────────────────────────────────
    // Envelope tolerance
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn attributes_envelope_transforms() {
        let raw = json!({
            "id": 5,
            "attributes": {
                "title": "Sleep and Longevity",
                "slug": "sleep-longevity",
                "publishedAt": "2024-01-01T00:00:00Z"
            }
        });
        let article = transformer().article(&raw);
        assert_eq!(article.id, 5);
        assert_eq!(article.title, "Sleep and Longevity");
        assert_eq!(article.slug, "sleep-longevity");
        assert_eq!(article.category, Category::uncategorized());
        assert_eq!(article.author, Author::unknown());
        assert_eq!(article.image, "");
        assert_eq!(
            article.published_at.to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn flat_document_envelope_transforms() {
        let raw = json!({
            "id": 7,
            "documentId": "doc-xyz",
            "title": "Zone 2 Training",
            "slug": "zone-2-training"
        });
        let article = transformer().article(&raw);
        assert_eq!(article.id, 7);
        assert_eq!(article.title, "Zone 2 Training");
        assert!(!article.is_error());
    }

    #[test]
    fn minimal_flat_envelope_transforms() {
        let raw = json!({ "_id": "11", "title": "Fasting Windows" });
        let article = transformer().article(&raw);
        assert_eq!(article.id, 11);
        assert_eq!(article.title, "Fasting Windows");
        // No slug in the payload: derived from the title.
        assert_eq!(article.slug, "fasting-windows");
    }

    #[test]
    fn malformed_payload_yields_error_placeholder() {
        for raw in [json!(null), json!("nope"), json!({ "no": "id" }), json!(3)] {
            let article = transformer().article(&raw);
            assert_eq!(article.id, 0, "payload {raw}");
            assert!(article.title.starts_with("Error:"), "payload {raw}");
        }
    }

    #[test]
    fn missing_title_defaults_to_untitled() {
        let raw = json!({ "id": 1, "attributes": {} });
        let article = transformer().article(&raw);
        assert_eq!(article.title, "Untitled");
    }

    // ─────────────────────────────────────────────────────────────
    // Content cascade
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn structured_blocks_win_the_cascade() {
        let raw = json!({
            "id": 1,
            "attributes": {
                "Content": [
                    { "type": "paragraph", "children": [ { "type": "text", "text": "from blocks" } ] }
                ],
                "content": "<p>from string</p>",
                "description": "from description"
            }
        });
        let article = transformer().article(&raw);
        assert!(article.content.contains("from blocks"));
        assert!(!article.content.contains("from string"));
    }

    #[test]
    fn prerendered_html_is_wrapped_once() {
        let raw = json!({
            "id": 1,
            "attributes": { "Content": "<p>already html</p>" }
        });
        let article = transformer().article(&raw);
        assert!(article.content.contains("<p>already html</p>"));
        assert_eq!(article.content.matches(BODY_CONTAINER_CLASS).count(), 1);
    }

    #[test]
    fn wrapping_does_not_double_on_pre_wrapped_input() {
        let wrapped = format!("<div class=\"{BODY_CONTAINER_CLASS}\"><p>x</p></div>");
        let raw = json!({ "id": 1, "attributes": { "content": wrapped } });
        let article = transformer().article(&raw);
        assert_eq!(article.content.matches(BODY_CONTAINER_CLASS).count(), 1);
    }

    #[test]
    fn lowercase_content_field_is_accepted() {
        let raw = json!({ "id": 1, "attributes": { "content": "<p>lower</p>" } });
        let article = transformer().article(&raw);
        assert!(article.content.contains("<p>lower</p>"));
    }

    #[test]
    fn dynamic_zone_components_render() {
        let raw = json!({
            "id": 1,
            "attributes": {
                "blocks": [
                    { "__component": "shared.rich-text", "body": "<p>rich</p>" },
                    { "__component": "shared.quote", "title": "Dr. A", "body": "walk daily" },
                    { "__component": "shared.media", "file": { "url": "/uploads/m.jpg" } },
                    { "__component": "shared.slider", "files": [ { "url": "/uploads/s1.jpg" }, { "url": "/uploads/s2.jpg" } ] },
                    { "__component": "shared.unknown-widget" }
                ]
            }
        });
        let article = transformer().article(&raw);
        assert!(article.content.contains("<p>rich</p>"));
        assert!(article.content.contains("<blockquote><p>walk daily</p><cite>Dr. A</cite></blockquote>"));
        assert!(article
            .content
            .contains("<img src=\"https://cms.example.com/uploads/m.jpg\">"));
        assert!(article.content.contains("s1.jpg") && article.content.contains("s2.jpg"));
    }

    #[test]
    fn description_is_the_last_real_fallback() {
        let raw = json!({ "id": 1, "attributes": { "description": "just a summary" } });
        let article = transformer().article(&raw);
        assert!(article.content.contains("just a summary"));
        assert!(article.content.starts_with("<div class=\"article-body\">"));
    }

    #[test]
    fn empty_content_synthesizes_placeholder() {
        let raw = json!({ "id": 1, "attributes": { "title": "Bare" } });
        let article = transformer().article(&raw);
        assert!(article.content.contains("being prepared"));
        assert_eq!(article.content.matches(BODY_CONTAINER_CLASS).count(), 1);
    }

    // ─────────────────────────────────────────────────────────────
    // Relations
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn category_relation_variants() {
        let t = transformer();

        let wrapped = json!({
            "id": 1,
            "attributes": {
                "category": { "data": { "id": 3, "attributes": { "name": "Sleep", "slug": "sleep" } } }
            }
        });
        assert_eq!(t.article(&wrapped).category.name, "Sleep");

        let inline = json!({ "id": 1, "attributes": { "category": { "id": 4, "name": "Nutrition" } } });
        let category = t.article(&inline).category;
        assert_eq!(category.id, 4);
        assert_eq!(category.slug, "nutrition");

        let named = json!({ "id": 1, "attributes": { "category": "Healthy Aging" } });
        let category = t.article(&named).category;
        assert_eq!(category.name, "Healthy Aging");
        assert_eq!(category.slug, "healthy-aging");

        let absent = json!({ "id": 1, "attributes": {} });
        assert_eq!(t.article(&absent).category, Category::uncategorized());
    }

    #[test]
    fn author_avatar_is_resolved() {
        let raw = json!({
            "id": 1,
            "attributes": {
                "author": {
                    "data": {
                        "id": 2,
                        "attributes": { "name": "Ada", "avatar": { "url": "/uploads/ada.png" } }
                    }
                }
            }
        });
        let author = transformer().article(&raw).author;
        assert_eq!(author.name, "Ada");
        assert_eq!(author.avatar, "https://cms.example.com/uploads/ada.png");
    }

    #[test]
    fn tags_preserve_order_and_drop_malformed() {
        let raw = json!({
            "id": 1,
            "attributes": {
                "tags": { "data": [
                    { "id": 1, "attributes": { "name": "sleep", "slug": "sleep" } },
                    { "bogus": true },
                    { "id": 2, "attributes": { "name": "recovery" } }
                ]}
            }
        });
        let tags = transformer().article(&raw).tags;
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "sleep");
        assert_eq!(tags[1].name, "recovery");
        assert_eq!(tags[1].slug, "recovery");
    }

    #[test]
    fn string_tags_are_accepted() {
        let raw = json!({ "id": 1, "attributes": { "tags": ["Deep Sleep"] } });
        let tags = transformer().article(&raw).tags;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].slug, "deep-sleep");
    }

    // ─────────────────────────────────────────────────────────────
    // Field coercion
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn featured_flag_coerces_across_generations() {
        let t = transformer();
        for (value, expected) in [
            (json!(true), true),
            (json!(1), true),
            (json!("true"), true),
            (json!(false), false),
            (json!(0), false),
            (json!("no"), false),
        ] {
            let raw = json!({ "id": 1, "attributes": { "featured": value } });
            assert_eq!(t.article(&raw).featured, expected);
        }
    }

    #[test]
    fn unparseable_published_at_defaults_to_now() {
        let before = Utc::now();
        let raw = json!({ "id": 1, "attributes": { "publishedAt": "not a date" } });
        let article = transformer().article(&raw);
        assert!(article.published_at >= before);
    }

    #[test]
    fn slugify_normalizes_names() {
        assert_eq!(slugify("Healthy Aging"), "healthy-aging");
        assert_eq!(slugify("  VO2 Max!  "), "vo2-max");
        assert_eq!(slugify("éclair"), "clair");
        assert_eq!(slugify(""), "");
    }
}
