// crates/edge/src/router.rs

use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;

/// Preview mode is a marker cookie; it carries no secret.
const PREVIEW_COOKIE: &str = "everwell_preview=1; Max-Age=3600; Path=/; HttpOnly; SameSite=Lax";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/articles", get(list_articles))
        .route("/api/articles/{slug}", get(get_article))
        .route("/api/articles/{slug}/related", get(related_articles))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{slug}/articles", get(category_articles))
        .route("/api/tags", get(list_tags))
        .route("/api/tags/{slug}/articles", get(tag_articles))
        .route("/api/search", get(search))
        .route("/api/featured", get(featured))
        .route("/api/preview", get(preview))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    locale: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl ListParams {
    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(10).clamp(1, 100)
    }
}

#[derive(Debug, Deserialize)]
struct LocaleParams {
    locale: Option<String>,
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let page = state
        .service
        .articles(params.locale(), params.page(), params.page_size())
        .await;
    Json(page)
}

async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<LocaleParams>,
) -> Response {
    match state.service.article(&slug, params.locale.as_deref()).await {
        Some(article) => Json(article).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn related_articles(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<LocaleParams>,
) -> Response {
    let locale = params.locale.as_deref();
    match state.service.article(&slug, locale).await {
        Some(article) => {
            let related = state.service.related(&article, locale, 4).await;
            Json(related).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    Json(state.service.categories(params.locale.as_deref()).await)
}

async fn category_articles(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let page = state
        .service
        .category_articles(&slug, params.locale(), params.page(), params.page_size())
        .await;
    Json(page)
}

async fn list_tags(
    State(state): State<AppState>,
    Query(params): Query<LocaleParams>,
) -> impl IntoResponse {
    Json(state.service.tags(params.locale.as_deref()).await)
}

async fn tag_articles(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let page = state
        .service
        .tag_articles(&slug, params.locale(), params.page(), params.page_size())
        .await;
    Json(page)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    locale: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let page = state
        .service
        .search(
            params.q.as_deref().unwrap_or(""),
            params.locale.as_deref(),
            params.page.unwrap_or(1).max(1),
            params.page_size.unwrap_or(10).clamp(1, 100),
        )
        .await;
    Json(page)
}

#[derive(Debug, Deserialize)]
struct FeaturedParams {
    locale: Option<String>,
    limit: Option<u32>,
    /// Only articles that can actually fill a hero slot.
    with_images: Option<bool>,
}

async fn featured(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> impl IntoResponse {
    let locale = params.locale.as_deref();
    let limit = params.limit.unwrap_or(6).clamp(1, 24);
    let articles = if params.with_images.unwrap_or(false) {
        state.service.featured_with_images(locale, limit).await
    } else {
        state.service.featured(locale, limit).await
    };
    Json(articles)
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    secret: Option<String>,
    slug: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    locale: Option<String>,
}

/// Preview-mode activation: validates the static shared secret, sets a
/// short-lived cookie, and redirects to the content-type-specific path.
async fn preview(State(state): State<AppState>, Query(params): Query<PreviewParams>) -> Response {
    let Some(expected) = state.preview_secret.as_deref() else {
        return (StatusCode::NOT_FOUND, "preview mode is not configured").into_response();
    };

    if params.secret.as_deref() != Some(expected) {
        debug!("preview activation rejected");
        return (StatusCode::UNAUTHORIZED, "invalid preview secret").into_response();
    }

    let slug = params.slug.unwrap_or_default();
    let path = if slug.is_empty() {
        "/".to_string()
    } else {
        match params.kind.as_deref() {
            Some("category") => format!("/categories/{slug}"),
            _ => format!("/articles/{slug}"),
        }
    };
    let target = match params.locale.as_deref() {
        Some(locale) if !locale.is_empty() => format!("/{locale}{path}"),
        _ => path,
    };

    let mut response = Redirect::temporary(&target).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_static(PREVIEW_COOKIE));
    response
}
