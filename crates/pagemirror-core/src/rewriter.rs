//! Point every asset reference in a parsed page at its local copy.
//!
//! Four kinds of references are followed, one level deep:
//! `<img src>`, `<link rel="stylesheet" href>`, `<script src>`, and CSS
//! `url(...)` inside inline `<style>` blocks. Everything else in the
//! document is left alone. Download failures never surface here; the store
//! hands back the remote URL and that is what gets written.

use kuchiki::NodeRef;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::asset_store::{AssetCategory, AssetOutcome, AssetStore};
use crate::url_model::resolve;

/// Elements whose attribute holds a single asset reference.
const ATTRIBUTE_TARGETS: [(&str, &str, AssetCategory); 3] = [
    ("img[src]", "src", AssetCategory::Image),
    ("link[rel~=stylesheet][href]", "href", AssetCategory::Stylesheet),
    ("script[src]", "src", AssetCategory::Script),
];

fn css_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Double-quoted, single-quoted, or bare; quoted forms may contain `)`.
        Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]+))\s*\)"#)
            .expect("css url() pattern is valid")
    })
}

/// Rewrite `document` in place and return it.
///
/// References are resolved against `base_url` (the page URL) and sent through
/// `store`, which downloads each canonical URL at most once.
pub fn rewrite<'d>(
    document: &'d NodeRef,
    store: &mut AssetStore<'_>,
    base_url: &str,
) -> &'d NodeRef {
    for (selector, attr, category) in ATTRIBUTE_TARGETS {
        let n = rewrite_attribute(document, selector, attr, category, store, base_url);
        tracing::debug!(selector, count = n, "rewrote attribute references");
    }
    let n = rewrite_style_blocks(document, store, base_url);
    tracing::debug!(count = n, "rewrote inline style blocks");
    document
}

fn rewrite_attribute(
    document: &NodeRef,
    selector: &str,
    attr: &str,
    category: AssetCategory,
    store: &mut AssetStore<'_>,
    base_url: &str,
) -> usize {
    // Collect first: attributes are mutated while we walk.
    let elements: Vec<_> = match document.select(selector) {
        Ok(matches) => matches.collect(),
        Err(()) => {
            tracing::warn!(selector, "invalid selector");
            return 0;
        }
    };

    let mut rewritten = 0;
    for element in elements {
        let reference = match element.attributes.borrow().get(attr) {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => continue,
        };
        let canonical = resolve(&reference, base_url);
        let outcome = store.fetch_or_get_cached(&canonical, category);
        element
            .attributes
            .borrow_mut()
            .insert(attr, outcome.reference().to_string());
        rewritten += 1;
    }
    rewritten
}

fn rewrite_style_blocks(document: &NodeRef, store: &mut AssetStore<'_>, base_url: &str) -> usize {
    let styles: Vec<_> = match document.select("style") {
        Ok(matches) => matches.collect(),
        Err(()) => return 0,
    };

    let mut changed = 0;
    for style in styles {
        for child in style.as_node().children() {
            let Some(text) = child.as_text() else {
                continue;
            };
            let original = text.borrow().clone();
            let rewritten = rewrite_css_urls(&original, |reference| {
                let canonical = resolve(reference, base_url);
                match store.fetch_or_get_cached(&canonical, AssetCategory::InlineAsset) {
                    AssetOutcome::PassThrough(_) => None,
                    outcome => Some(outcome.reference().to_string()),
                }
            });
            if rewritten != original {
                *text.borrow_mut() = rewritten;
                changed += 1;
            }
        }
    }
    changed
}

/// Replace every CSS `url(...)` in `css`, quoted or not, with `url(<new>)`.
///
/// `replace` gets the trimmed reference and returns the new one, or `None`
/// to keep that occurrence exactly as written. All other text is untouched.
pub fn rewrite_css_urls<F>(css: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    css_url_regex()
        .replace_all(css, |caps: &Captures| {
            let reference = (1..=3)
                .find_map(|i| caps.get(i))
                .map_or("", |m| m.as_str().trim());
            if reference.is_empty() {
                return caps[0].to_string();
            }
            match replace(reference) {
                Some(new_ref) => format!("url({})", new_ref),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
