//! Collection transforms with a partial-success policy.
//!
//! A collection response is useful even when individual items are mangled:
//! malformed items are dropped from the output list instead of failing the
//! page, and pagination metadata is synthesized when the source omits it.

use crate::entity::Transformer;
use crate::envelope::{self, Envelope};
use domain::content::{Article, Category, Page, Pagination, Tag};
use serde_json::Value as Json;
use tracing::warn;

pub fn articles_page(transformer: &Transformer, raw: &Json) -> Page<Article> {
    let Some(collection) = envelope::parse_collection(raw, "articles") else {
        warn!("unrecognized articles collection payload");
        return Page::empty();
    };

    let items: Vec<Article> = collection
        .items
        .iter()
        .filter(|item| !matches!(Envelope::parse(item), Envelope::Unknown))
        .map(|item| transformer.article(item))
        .collect();

    let dropped = collection.items.len() - items.len();
    if dropped > 0 {
        warn!(dropped, "dropped malformed items from articles collection");
    }

    let pagination = resolve_pagination(collection.pagination, items.len());
    Page { items, pagination }
}

pub fn categories_page(transformer: &Transformer, raw: &Json) -> Page<Category> {
    let Some(collection) = envelope::parse_collection(raw, "categories") else {
        warn!("unrecognized categories collection payload");
        return Page::empty();
    };

    let items: Vec<Category> = collection
        .items
        .iter()
        .filter(|item| !matches!(Envelope::parse(item), Envelope::Unknown))
        .map(|item| transformer.category(item))
        .collect();

    let dropped = collection.items.len() - items.len();
    if dropped > 0 {
        warn!(dropped, "dropped malformed items from categories collection");
    }

    let pagination = resolve_pagination(collection.pagination, items.len());
    Page { items, pagination }
}

/// Tags are small enough that callers get a plain list; malformed entries
/// are dropped.
pub fn tags_list(transformer: &Transformer, raw: &Json) -> Vec<Tag> {
    let Some(collection) = envelope::parse_collection(raw, "tags") else {
        warn!("unrecognized tags collection payload");
        return Vec::new();
    };

    collection
        .items
        .iter()
        .filter_map(|item| transformer.try_tag(item))
        .collect()
}

/// Parse `meta.pagination` when present; otherwise synthesize single-page
/// metadata from the surviving item count. A meta block that under-reports
/// the page we actually hold is corrected upward.
fn resolve_pagination(meta: Option<&Json>, len: usize) -> Pagination {
    let Some(meta) = meta else {
        return Pagination::for_len(len);
    };

    let mut pagination = Pagination {
        page: num_field(meta, &["page"]),
        page_size: num_field(meta, &["pageSize", "page_size"]),
        page_count: num_field(meta, &["pageCount", "page_count"]),
        total: num_field(meta, &["total"]),
    };

    if (pagination.page_size as usize) < len {
        pagination.page_size = len as u32;
    }
    if (pagination.total as usize) < len {
        pagination.total = len as u32;
    }

    pagination
}

fn num_field(meta: &Json, keys: &[&str]) -> u32 {
    keys.iter()
        .filter_map(|key| meta.get(key))
        .find_map(Json::as_u64)
        .unwrap_or(0) as u32
}
