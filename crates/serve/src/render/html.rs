//! HTML escaping and the article-body container wrapper.

use domain::content::BODY_CONTAINER_CLASS;

/// Escape text for element content.
pub fn escape_text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).into_owned()
}

/// Opening tag of the article-body container.
pub fn body_wrapper_open() -> String {
    format!("<div class=\"{BODY_CONTAINER_CLASS}\">")
}

/// Wrap `html` in the article-body container unless the marker is already
/// present anywhere in the markup. Running this any number of times yields
/// exactly one container.
pub fn ensure_body_wrapper(html: &str) -> String {
    let trimmed = html.trim();
    if trimmed.contains(BODY_CONTAINER_CLASS) {
        return trimmed.to_string();
    }
    format!("{}{}</div>", body_wrapper_open(), trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_bare_markup_once() {
        let out = ensure_body_wrapper("<p>hello</p>");
        assert_eq!(out, "<div class=\"article-body\"><p>hello</p></div>");
        assert_eq!(out.matches(BODY_CONTAINER_CLASS).count(), 1);
    }

    #[test]
    fn wrapping_is_idempotent() {
        let once = ensure_body_wrapper("<p>hello</p>");
        let twice = ensure_body_wrapper(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.matches(BODY_CONTAINER_CLASS).count(), 1);
    }

    #[test]
    fn pre_wrapped_input_is_preserved() {
        let input = "<div class=\"article-body\"><p>already</p></div>";
        assert_eq!(ensure_body_wrapper(input), input);
    }

    #[test]
    fn escapes_markup_sensitive_characters() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("x\"y"), "x&quot;y");
    }
}
