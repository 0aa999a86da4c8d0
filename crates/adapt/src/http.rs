//! HTTP access to the CMS REST API.
//!
//! Nested query parameters are flattened into the CMS's bracketed key
//! convention before encoding, a bearer token is attached when configured,
//! and every request carries a client-side timeout. There is no retry
//! policy: callers convert a failed fetch into an empty result.

use async_trait::async_trait;
use domain::setting::CmsSettings;
use serde_json::Value as Json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid JSON from CMS: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Seam between the content service and the network. The service is generic
/// over this, so tests drive it with a mock instead of a live CMS.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentFetch: Send + Sync {
    /// GET `path` with `query` flattened to bracketed parameters; the parsed
    /// JSON body on any 2xx response.
    async fn get_json(&self, path: &str, query: &Json) -> Result<Json, FetchError>;
}

/// reqwest-backed CMS client.
pub struct CmsClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CmsClient {
    pub fn new(settings: &CmsSettings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ContentFetch for CmsClient {
    async fn get_json(&self, path: &str, query: &Json) -> Result<Json, FetchError> {
        let mut url = format!("{}{}", self.base_url, path);
        let encoded = encode_query(query);
        if !encoded.is_empty() {
            url.push('?');
            url.push_str(&encoded);
        }

        debug!(%url, "GET cms");
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "cms request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Flatten a nested JSON object into bracketed query pairs:
/// `{"a": {"b": {"c": "v"}}}` becomes `a[b][c]=v`, arrays index as
/// `a[0]`, `a[1]`, … Nulls are dropped.
pub fn flatten_query(params: &Json) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Some(obj) = params.as_object() {
        for (key, value) in obj {
            flatten_into(key.clone(), value, &mut pairs);
        }
    }
    pairs
}

fn flatten_into(key: String, value: &Json, out: &mut Vec<(String, String)>) {
    match value {
        Json::Object(map) => {
            for (k, v) in map {
                flatten_into(format!("{key}[{k}]"), v, out);
            }
        }
        Json::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                flatten_into(format!("{key}[{i}]"), v, out);
            }
        }
        Json::Null => {}
        Json::String(s) => out.push((key, s.clone())),
        other => out.push((key, other.to_string())),
    }
}

fn encode_query(params: &Json) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in flatten_query(params) {
        serializer.append_pair(&key, &value);
    }
    serializer.finish()
}
