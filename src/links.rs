//! Link validation and normalization shared by the mediation API and the
//! bot front end.

use url::Url;

/// Sentinel stored when a topic has no image.
pub const NO_IMAGE: &str = "-";

/// Check whether a string parses as an absolute `http`/`https` URL.
#[must_use]
pub fn is_absolute_http_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Normalize free-text link input from a command option.
///
/// Bare domains (no scheme) are coerced to `https://`; everything else is
/// passed through trimmed. Returns an empty string for blank input.
#[must_use]
pub fn normalize_link(input: &str) -> String {
    let raw = input.trim();
    if raw.is_empty() {
        return String::new();
    }
    let lower = raw.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// Normalize image input from a command option.
///
/// The `-` sentinel means "no image" and bypasses URL coercion entirely.
#[must_use]
pub fn normalize_image_link(input: &str) -> String {
    let raw = input.trim();
    if raw == NO_IMAGE {
        return NO_IMAGE.to_string();
    }
    normalize_link(raw)
}

/// Coerce an image URL to the stored form.
///
/// Anything that is not a valid absolute http(s) URL degrades to the `-`
/// sentinel. A bad image never rejects the topic; a bad primary URL does.
#[must_use]
pub fn sanitize_image_url(input: Option<&str>) -> String {
    match input {
        Some(s) if s != NO_IMAGE && is_absolute_http_url(s) => s.to_string(),
        _ => NO_IMAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_http_url() {
        assert!(is_absolute_http_url("https://example.com/readme"));
        assert!(is_absolute_http_url("http://example.com"));
        assert!(!is_absolute_http_url("example.com/readme"));
        assert!(!is_absolute_http_url("ftp://example.com"));
        assert!(!is_absolute_http_url("not a url"));
        assert!(!is_absolute_http_url(""));
    }

    #[test]
    fn test_normalize_link_adds_scheme() {
        assert_eq!(
            normalize_link("example.com/readme"),
            "https://example.com/readme"
        );
        assert_eq!(
            normalize_link("  https://example.com  "),
            "https://example.com"
        );
        assert_eq!(
            normalize_link("HTTP://example.com"),
            "HTTP://example.com"
        );
        assert_eq!(normalize_link("   "), "");
    }

    #[test]
    fn test_normalize_image_link_sentinel() {
        assert_eq!(normalize_image_link("-"), "-");
        assert_eq!(normalize_image_link(" - "), "-");
        assert_eq!(
            normalize_image_link("cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_sanitize_image_url() {
        assert_eq!(sanitize_image_url(None), "-");
        assert_eq!(sanitize_image_url(Some("-")), "-");
        assert_eq!(sanitize_image_url(Some("not a url")), "-");
        assert_eq!(
            sanitize_image_url(Some("https://cdn.example.com/a.png")),
            "https://cdn.example.com/a.png"
        );
    }
}
