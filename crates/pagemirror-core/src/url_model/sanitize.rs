//! Filesystem-safe filename sanitization.

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// One `_` per replaced character; runs are not collapsed, so the output has
/// the same number of characters as the input.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
