use serde::Deserialize;
use std::net::IpAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct CmsSettings {
    /// Base URL of the CMS REST API, e.g. `https://cms.example.com`.
    pub base_url: String,

    /// Bearer token sent as `Authorization` when present.
    pub api_token: Option<String>,

    /// Client-side request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_locale() -> String {
    "en".to_string()
}

/// Per-operation cache lifetimes, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_articles_ttl")]
    pub articles_ttl_secs: u64,

    #[serde(default = "default_taxonomy_ttl")]
    pub categories_ttl_secs: u64,

    #[serde(default = "default_taxonomy_ttl")]
    pub tags_ttl_secs: u64,

    /// Search results go stale quickly; keep this short.
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            articles_ttl_secs: default_articles_ttl(),
            categories_ttl_secs: default_taxonomy_ttl(),
            tags_ttl_secs: default_taxonomy_ttl(),
            search_ttl_secs: default_search_ttl(),
        }
    }
}

fn default_articles_ttl() -> u64 {
    600
}

fn default_taxonomy_ttl() -> u64 {
    1800
}

fn default_search_ttl() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// IP address to bind the content API listener
    pub ip: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewSettings {
    /// Static shared secret required to activate preview mode.
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub cms: CmsSettings,
    pub http: HttpSettings,
    pub cache: Option<CacheSettings>,
    pub preview: Option<PreviewSettings>,
}
