//! Filename extraction from URL path.

/// Extracts the last non-empty path segment from a URL for use as a filename hint.
///
/// The segment is returned as it appears in the URL (still percent-encoded).
/// Query and fragment are not part of the path. Returns `None` for the site
/// root. Input that does not parse as a URL falls back to the text after the
/// last `/`.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)?,
        Err(_) => {
            let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
            without_suffix.rsplit('/').next()?.to_string()
        }
    };
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Query string of a URL without the leading `?`, or `None` if absent or empty.
///
/// Unparseable input falls back to the text between the first `?` and any `#`.
pub fn query_from_url(url: &str) -> Option<String> {
    let query = match url::Url::parse(url) {
        Ok(parsed) => parsed.query()?.to_string(),
        Err(_) => {
            let without_fragment = url.split('#').next().unwrap_or(url);
            without_fragment.split_once('?')?.1.to_string()
        }
    };
    (!query.is_empty()).then_some(query)
}
