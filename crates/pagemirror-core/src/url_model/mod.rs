//! URL modeling and filename derivation.
//!
//! Resolves references found in a page into canonical absolute URLs, and
//! derives safe local filenames from a URL path plus the response
//! `Content-Type`.

mod extension;
mod path;
mod resolve;
mod sanitize;

pub use extension::extension_for_content_type;
pub use path::{filename_from_url_path, query_from_url};
pub use resolve::{is_downloadable, resolve};
pub use sanitize::sanitize_filename;

/// Stem used when the URL path is the site root or sanitizes to nothing usable.
const DEFAULT_STEM: &str = "index";

/// Extension used when the content type is missing or unknown.
const FALLBACK_EXTENSION: &str = ".txt";

/// Derives a local filename for a downloaded resource.
///
/// Takes the last path segment of `url`, replaces every character outside
/// `[A-Za-z0-9_.-]` with `_`, and appends an extension inferred from
/// `content_type` when the name has none (`.txt` if the type is unknown).
/// A query string is kept in the stem (dots included, as `_`), so
/// `thumb?id=1` and `thumb?id=2` land in different files.
///
/// Distinct URLs can still derive the same name; callers do not disambiguate.
///
/// # Examples
///
/// - `derive_filename("https://example.com/img/logo.png", None)` → `"logo.png"`
/// - `derive_filename("https://example.com/api/pixel", Some("image/png"))` → `"pixel.png"`
/// - `derive_filename("https://example.com/thumb?id=1", Some("image/png"))` → `"thumb_id_1.png"`
/// - `derive_filename("https://example.com/style.css?v=3", None)` → `"style_v_3.css"`
pub fn derive_filename(url: &str, content_type: Option<&str>) -> String {
    let raw = filename_from_url_path(url).unwrap_or_else(|| DEFAULT_STEM.to_string());

    let mut name = sanitize_filename(&raw);
    if name.is_empty() || name == "." || name == ".." {
        name = DEFAULT_STEM.to_string();
    }

    if let Some(query) = query_from_url(url) {
        let suffix = sanitize_filename(&query).replace('.', "_");
        name = match name.rfind('.').filter(|_| has_extension(&name)) {
            Some(dot) => format!("{}_{}{}", &name[..dot], suffix, &name[dot..]),
            None => format!("{}_{}", name, suffix),
        };
    }

    if !has_extension(&name) {
        let ext = content_type
            .and_then(extension_for_content_type)
            .unwrap_or(FALLBACK_EXTENSION);
        name.push_str(ext);
    }
    name
}

/// True if `name` has a non-empty extension after a non-leading dot.
fn has_extension(name: &str) -> bool {
    match name.rfind('.') {
        Some(0) | None => false,
        Some(i) => i + 1 < name.len(),
    }
}
