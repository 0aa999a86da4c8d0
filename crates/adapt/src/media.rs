//! Media URL resolution across the CMS's media payload shapes.

use serde_json::Value as Json;

/// Extract a usable image URL from a media field.
///
/// Tries, in order: relation wrapper, direct `url`, `formats.large.url`,
/// first element of an array, a bare media object (`id` + `mime`, URL
/// reconstructed from `hash`/`ext`), and a plain string. Relative results
/// are prefixed with `base_url`; absolute URLs pass through unchanged.
/// Returns `None` only when no recognizable shape is found.
pub fn extract_image_url(field: &Json, base_url: &str) -> Option<String> {
    match field {
        Json::Object(obj) => {
            if let Some(data) = obj.get("data") {
                if data.is_null() {
                    return None;
                }
                return extract_image_url(data, base_url);
            }
            if let Some(attributes) = obj.get("attributes").filter(|a| a.is_object()) {
                return extract_image_url(attributes, base_url);
            }
            if let Some(url) = obj.get("url").and_then(Json::as_str) {
                return Some(absolutize(url, base_url));
            }
            if let Some(url) = obj
                .get("formats")
                .and_then(|f| f.get("large"))
                .and_then(|l| l.get("url"))
                .and_then(Json::as_str)
            {
                return Some(absolutize(url, base_url));
            }
            // Bare media object: no url field, but enough to rebuild the
            // upload path.
            if obj.contains_key("id") && obj.contains_key("mime") {
                let hash = obj.get("hash").and_then(Json::as_str)?;
                let ext = obj.get("ext").and_then(Json::as_str).unwrap_or("");
                return Some(absolutize(&format!("/uploads/{hash}{ext}"), base_url));
            }
            None
        }
        Json::Array(arr) => arr
            .iter()
            .find_map(|item| extract_image_url(item, base_url)),
        Json::String(url) if !url.is_empty() => Some(absolutize(url, base_url)),
        _ => None,
    }
}

/// Prefix a leading-slash path with the CMS base URL; leave absolute URLs
/// untouched.
pub fn absolutize(url: &str, base_url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}
