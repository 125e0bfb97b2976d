//! Reference resolution against the page URL.

use url::Url;

/// Resolves a reference found in a page into a canonical absolute URL.
///
/// - Empty references and `data:` URIs are returned unchanged.
/// - References that already start with `http://` or `https://` are returned unchanged.
/// - Anything else is joined against `base_url` (`../x`, `/x`, `//host/x`, `?q`).
///
/// Never fails: if the base does not parse or the join is rejected, the
/// reference comes back unchanged and [`is_downloadable`] will say no.
pub fn resolve(reference: &str, base_url: &str) -> String {
    if reference.is_empty() || has_scheme_prefix(reference, "data:") {
        return reference.to_string();
    }
    if has_scheme_prefix(reference, "http://") || has_scheme_prefix(reference, "https://") {
        return reference.to_string();
    }

    match Url::parse(base_url).and_then(|base| base.join(reference)) {
        Ok(joined) => joined.to_string(),
        Err(e) => {
            tracing::debug!(reference, base_url, "could not resolve reference: {}", e);
            reference.to_string()
        }
    }
}

/// True for absolute `http`/`https` URLs with a host; everything else is passed through untouched.
pub fn is_downloadable(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

fn has_scheme_prefix(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}
