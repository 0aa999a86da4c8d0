//! Internal content model, independent of any CMS payload shape.
//!
//! Everything the pipeline hands to callers is one of these types. Absent or
//! malformed upstream data is represented by sentinel values (never `None`
//! fields), so page-level consumers do not null-check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CSS class of the container every article body is wrapped in.
///
/// The wrap is idempotent: transforming the same markup twice still yields
/// exactly one container.
pub const BODY_CONTAINER_CLASS: &str = "article-body";

/// Prefix carried by the title of an error-placeholder [`Article`].
pub const ERROR_TITLE_PREFIX: &str = "Error:";

/// A published article, fully normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Entity id; `0` is reserved for the error placeholder.
    pub id: i64,
    pub title: String,
    /// Routing key, unique per locale.
    pub slug: String,
    /// HTML body, wrapped exactly once in the [`BODY_CONTAINER_CLASS`] container.
    pub content: String,
    pub excerpt: String,
    pub published_at: DateTime<Utc>,
    /// Absolute media URL, or empty when the article has no image.
    pub image: String,
    pub category: Category,
    pub author: Author,
    pub tags: Vec<Tag>,
    pub featured: bool,
}

impl Article {
    /// Placeholder produced when a payload matches no known shape.
    ///
    /// Identified by `id == 0` and a title starting with [`ERROR_TITLE_PREFIX`].
    pub fn error_placeholder(detail: &str) -> Self {
        Self {
            id: 0,
            title: format!("{ERROR_TITLE_PREFIX} {detail}"),
            slug: String::new(),
            content: String::new(),
            excerpt: String::new(),
            published_at: Utc::now(),
            image: String::new(),
            category: Category::uncategorized(),
            author: Author::unknown(),
            tags: Vec::new(),
            featured: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.id == 0 && self.title.starts_with(ERROR_TITLE_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
}

impl Category {
    /// Sentinel used when an article carries no (usable) category relation.
    pub fn uncategorized() -> Self {
        Self {
            id: 0,
            name: "Uncategorized".to_string(),
            slug: "uncategorized".to_string(),
            description: String::new(),
            image: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn uncategorized() -> Self {
        Self {
            id: 0,
            name: "Uncategorized".to_string(),
            slug: "uncategorized".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub email: String,
    /// Resolved avatar media URL, or empty.
    pub avatar: String,
}

impl Author {
    pub fn unknown() -> Self {
        Self {
            id: 0,
            name: "Unknown".to_string(),
            bio: String::new(),
            email: String::new(),
            avatar: String::new(),
        }
    }
}

/// Collection metadata. Always present on collection results; synthesized
/// from the surviving item count when the source omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u32,
}

impl Pagination {
    pub fn zero() -> Self {
        Self {
            page: 0,
            page_size: 0,
            page_count: 0,
            total: 0,
        }
    }

    /// Single-page metadata covering exactly `len` items.
    pub fn for_len(len: usize) -> Self {
        if len == 0 {
            return Self::zero();
        }
        let len = len as u32;
        Self {
            page: 1,
            page_size: len,
            page_count: 1,
            total: len,
        }
    }
}

/// One page of a collection read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::zero(),
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_placeholder_has_reserved_id_and_prefix() {
        let article = Article::error_placeholder("unrecognized payload");
        assert_eq!(article.id, 0);
        assert!(article.title.starts_with("Error:"));
        assert!(article.is_error());
        assert_eq!(article.category, Category::uncategorized());
        assert_eq!(article.author, Author::unknown());
    }

    #[test]
    fn sentinels_use_well_known_values() {
        assert_eq!(Category::uncategorized().slug, "uncategorized");
        assert_eq!(Tag::uncategorized().name, "Uncategorized");
        assert_eq!(Author::unknown().name, "Unknown");
        assert_eq!(Author::unknown().id, 0);
    }

    #[test]
    fn pagination_for_len_covers_all_items() {
        let p = Pagination::for_len(7);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 7);
        assert_eq!(p.page_count, 1);
        assert_eq!(p.total, 7);

        assert_eq!(Pagination::for_len(0), Pagination::zero());
    }

    #[test]
    fn empty_page_has_zero_pagination() {
        let page: Page<Article> = Page::empty();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination, Pagination::zero());
    }
}
