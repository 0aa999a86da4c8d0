//! Read façade over the CMS pipeline.
//!
//! Composes the fetch client, the TTL cache, and the transformers behind
//! stable operation names. Every public operation is total: internal
//! failures are logged and collapsed to an empty collection or `None`, so
//! the page layer renders an empty state instead of an error. The fallible
//! `try_*` twins keep that collapse decision visible and testable.

use crate::cache::TtlCache;
use crate::collection;
use crate::entity::Transformer;
use crate::envelope;
use crate::http::ContentFetch;
use crate::Result;
use domain::content::{Article, Category, Page, Tag};
use domain::setting::CacheSettings;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// Per-operation cache lifetimes.
#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub articles: Duration,
    pub categories: Duration,
    pub tags: Duration,
    pub search: Duration,
}

impl From<&CacheSettings> for CacheTtls {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            articles: Duration::from_secs(settings.articles_ttl_secs),
            categories: Duration::from_secs(settings.categories_ttl_secs),
            tags: Duration::from_secs(settings.tags_ttl_secs),
            search: Duration::from_secs(settings.search_ttl_secs),
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

pub struct ContentService<F: ContentFetch> {
    fetch: F,
    cache: TtlCache,
    transformer: Transformer,
    ttls: CacheTtls,
    default_locale: String,
}

impl<F: ContentFetch> ContentService<F> {
    pub fn new(
        fetch: F,
        cache: TtlCache,
        transformer: Transformer,
        ttls: CacheTtls,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            fetch,
            cache,
            transformer,
            ttls,
            default_locale: default_locale.into(),
        }
    }

    fn locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|locale| !locale.is_empty())
            .unwrap_or(&self.default_locale)
    }

    // ─────────────────────────────────────────────────────────────
    // Articles
    // ─────────────────────────────────────────────────────────────

    pub async fn articles(&self, locale: Option<&str>, page: u32, page_size: u32) -> Page<Article> {
        self.try_articles(locale, page, page_size)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "article listing failed, serving empty page");
                Page::empty()
            })
    }

    async fn try_articles(
        &self,
        locale: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Article>> {
        let locale = self.locale(locale);
        let key = format!("articles_{locale}_{page}_{page_size}");
        self.cache
            .get_or_set(&key, self.ttls.articles, || async {
                let query = json!({
                    "populate": "*",
                    "locale": locale,
                    "sort": "publishedAt:desc",
                    "pagination": { "page": page, "pageSize": page_size },
                });
                let raw = self.fetch.get_json("/api/articles", &query).await?;
                Ok(collection::articles_page(&self.transformer, &raw))
            })
            .await
    }

    pub async fn article(&self, slug: &str, locale: Option<&str>) -> Option<Article> {
        match self.try_article(slug, locale).await {
            Ok(article) => article,
            Err(err) => {
                warn!(%err, slug, "article fetch failed");
                None
            }
        }
    }

    async fn try_article(&self, slug: &str, locale: Option<&str>) -> Result<Option<Article>> {
        let locale = self.locale(locale);
        let key = format!("article_{locale}_{slug}");
        self.cache
            .get_or_set(&key, self.ttls.articles, || async {
                let query = json!({
                    "populate": "*",
                    "locale": locale,
                    "filters": { "slug": { "$eq": slug } },
                });
                let raw = self.fetch.get_json("/api/articles", &query).await?;
                // Single reads arrive as filtered collections, but a
                // single-entity envelope is tolerated too.
                let article = match envelope::parse_collection(&raw, "articles") {
                    Some(col) => col.items.first().map(|item| self.transformer.article(item)),
                    None => {
                        envelope::parse_single(&raw).map(|item| self.transformer.article(item))
                    }
                };
                Ok(article.filter(|a| !a.is_error()))
            })
            .await
    }

    pub async fn category_articles(
        &self,
        slug: &str,
        locale: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Page<Article> {
        self.filtered_articles(
            "category_articles",
            json!({ "category": { "slug": { "$eq": slug } } }),
            slug,
            locale,
            page,
            page_size,
        )
        .await
    }

    pub async fn tag_articles(
        &self,
        slug: &str,
        locale: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Page<Article> {
        self.filtered_articles(
            "tag_articles",
            json!({ "tags": { "slug": { "$eq": slug } } }),
            slug,
            locale,
            page,
            page_size,
        )
        .await
    }

    async fn filtered_articles(
        &self,
        operation: &str,
        filters: serde_json::Value,
        discriminator: &str,
        locale: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Page<Article> {
        let locale = self.locale(locale);
        let key = format!("{operation}_{locale}_{discriminator}_{page}_{page_size}");
        let result: Result<Page<Article>> = self
            .cache
            .get_or_set(&key, self.ttls.articles, || async {
                let query = json!({
                    "populate": "*",
                    "locale": locale,
                    "sort": "publishedAt:desc",
                    "filters": filters,
                    "pagination": { "page": page, "pageSize": page_size },
                });
                let raw = self.fetch.get_json("/api/articles", &query).await?;
                Ok(collection::articles_page(&self.transformer, &raw))
            })
            .await;

        result.unwrap_or_else(|err| {
            warn!(%err, operation, discriminator, "filtered article listing failed");
            Page::empty()
        })
    }

    pub async fn search(
        &self,
        query: &str,
        locale: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Page<Article> {
        let needle = query.trim();
        if needle.is_empty() {
            return Page::empty();
        }

        let locale = self.locale(locale);
        let key = format!("search_{locale}_{page}_{page_size}_{needle}");
        let result: Result<Page<Article>> = self
            .cache
            .get_or_set(&key, self.ttls.search, || async {
                let query = json!({
                    "populate": "*",
                    "locale": locale,
                    "filters": { "$or": [
                        { "title": { "$containsi": needle } },
                        { "excerpt": { "$containsi": needle } },
                    ]},
                    "pagination": { "page": page, "pageSize": page_size },
                });
                let raw = self.fetch.get_json("/api/articles", &query).await?;
                Ok(collection::articles_page(&self.transformer, &raw))
            })
            .await;

        result.unwrap_or_else(|err| {
            warn!(%err, needle, "search failed, serving empty page");
            Page::empty()
        })
    }

    pub async fn featured(&self, locale: Option<&str>, limit: u32) -> Vec<Article> {
        let locale = self.locale(locale);
        let key = format!("featured_{locale}_{limit}");
        let result: Result<Vec<Article>> = self
            .cache
            .get_or_set(&key, self.ttls.articles, || async {
                let query = json!({
                    "populate": "*",
                    "locale": locale,
                    "sort": "publishedAt:desc",
                    "filters": { "featured": { "$eq": true } },
                    "pagination": { "page": 1, "pageSize": limit },
                });
                let raw = self.fetch.get_json("/api/articles", &query).await?;
                Ok(collection::articles_page(&self.transformer, &raw).items)
            })
            .await;

        result.unwrap_or_else(|err| {
            warn!(%err, "featured listing failed, serving empty list");
            Vec::new()
        })
    }

    /// Featured articles that actually carry an image; hero slots have
    /// nothing to render otherwise.
    pub async fn featured_with_images(&self, locale: Option<&str>, limit: u32) -> Vec<Article> {
        self.featured(locale, limit)
            .await
            .into_iter()
            .filter(|article| !article.image.is_empty())
            .collect()
    }

    /// Articles from the same category, the article itself excluded,
    /// newest first.
    pub async fn related(
        &self,
        article: &Article,
        locale: Option<&str>,
        limit: u32,
    ) -> Vec<Article> {
        let mut related: Vec<Article> = self
            .category_articles(&article.category.slug, locale, 1, limit + 1)
            .await
            .items
            .into_iter()
            .filter(|candidate| candidate.id != article.id)
            .collect();
        related.truncate(limit as usize);
        related
    }

    // ─────────────────────────────────────────────────────────────
    // Taxonomies
    // ─────────────────────────────────────────────────────────────

    pub async fn categories(&self, locale: Option<&str>) -> Page<Category> {
        self.try_categories(locale).await.unwrap_or_else(|err| {
            warn!(%err, "category listing failed, serving empty page");
            Page::empty()
        })
    }

    async fn try_categories(&self, locale: Option<&str>) -> Result<Page<Category>> {
        let locale = self.locale(locale);
        let key = format!("categories_{locale}");
        self.cache
            .get_or_set(&key, self.ttls.categories, || async {
                let query = json!({ "populate": "image", "locale": locale });
                let raw = self.fetch.get_json("/api/categories", &query).await?;
                Ok(collection::categories_page(&self.transformer, &raw))
            })
            .await
    }

    pub async fn category(&self, slug: &str, locale: Option<&str>) -> Option<Category> {
        self.categories(locale)
            .await
            .items
            .into_iter()
            .find(|category| category.slug == slug)
    }

    pub async fn tags(&self, locale: Option<&str>) -> Vec<Tag> {
        let locale = self.locale(locale);
        let key = format!("tags_{locale}");
        let result: Result<Vec<Tag>> = self
            .cache
            .get_or_set(&key, self.ttls.tags, || async {
                let query = json!({ "locale": locale });
                let raw = self.fetch.get_json("/api/tags", &query).await?;
                Ok(collection::tags_list(&self.transformer, &raw))
            })
            .await;

        result.unwrap_or_else(|err| {
            warn!(%err, "tag listing failed, serving empty list");
            Vec::new()
        })
    }

    pub async fn tag(&self, slug: &str, locale: Option<&str>) -> Option<Tag> {
        self.tags(locale)
            .await
            .into_iter()
            .find(|tag| tag.slug == slug)
    }
}
