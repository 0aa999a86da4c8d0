use adapt::http::CmsClient;
use adapt::service::ContentService;
use std::sync::Arc;

/// Shared handles for the content API handlers.
///
/// The service (and the cache inside it) is constructed once at startup;
/// handlers clone the `Arc`, never the service.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContentService<CmsClient>>,
    /// Static shared secret for preview-mode activation; `None` disables
    /// the preview endpoint.
    pub preview_secret: Option<String>,
}
