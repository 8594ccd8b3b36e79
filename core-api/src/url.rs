//! URL assembly for the request engine.
//!
//! Resolves the configured origin into a normalized base (trailing slash
//! stripped, API prefix appended once), joins relative paths under it, and
//! encodes the surviving query entries.

/// Fixed prefix all relative API paths live under.
pub const API_PREFIX: &str = "/api";

/// Normalize a configured origin: strip the trailing slash and append the
/// API prefix unless the origin already ends in it.
pub fn normalize_base(origin: &str) -> String {
    let trimmed = origin.trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}

/// Whether a descriptor path is already a full URL to use verbatim.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Encode query entries as URL-encoded `key=value` pairs.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the final URL from a normalized base, a descriptor path, and the
/// filtered query entries.
pub fn build_url(base: &str, path: &str, query: &[(String, String)]) -> String {
    let mut url = if is_absolute(path) {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    };

    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&encode_query(query));
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn base_normalization_strips_slash_and_appends_prefix() {
        assert_eq!(normalize_base("https://api.example.com"), "https://api.example.com/api");
        assert_eq!(normalize_base("https://api.example.com/"), "https://api.example.com/api");
        assert_eq!(normalize_base("https://api.example.com/api"), "https://api.example.com/api");
        assert_eq!(normalize_base("https://api.example.com/api/"), "https://api.example.com/api");
    }

    #[test]
    fn relative_paths_get_a_leading_slash() {
        let base = normalize_base("https://api.example.com");
        assert_eq!(build_url(&base, "services", &[]), "https://api.example.com/api/services");
        assert_eq!(build_url(&base, "/services", &[]), "https://api.example.com/api/services");
    }

    #[test]
    fn absolute_paths_are_used_verbatim() {
        let base = normalize_base("https://api.example.com");
        assert_eq!(
            build_url(&base, "https://storage.example.net/bucket/key", &[]),
            "https://storage.example.net/bucket/key"
        );
    }

    #[test]
    fn query_separator_respects_existing_component() {
        let base = normalize_base("https://api.example.com");
        assert_eq!(
            build_url(&base, "/services?sort=recent", &pairs(&[("page", "2")])),
            "https://api.example.com/api/services?sort=recent&page=2"
        );
        assert_eq!(
            build_url(&base, "/services", &pairs(&[("page", "2")])),
            "https://api.example.com/api/services?page=2"
        );
    }

    #[test]
    fn query_values_are_url_encoded() {
        let base = normalize_base("https://api.example.com");
        assert_eq!(
            build_url(&base, "/services", &pairs(&[("search", "lawn care & more")])),
            "https://api.example.com/api/services?search=lawn%20care%20%26%20more"
        );
    }

    #[test]
    fn surviving_entries_serialize_in_order() {
        assert_eq!(
            encode_query(&pairs(&[("a", "1"), ("d", "x")])),
            "a=1&d=x"
        );
    }
}
