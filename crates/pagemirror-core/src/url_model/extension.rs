//! File extension inference from a `Content-Type` header value.

/// Known media types and the extension written for them.
const EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/pjpeg", ".jpg"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/avif", ".avif"),
    ("image/bmp", ".bmp"),
    ("image/svg+xml", ".svg"),
    ("image/x-icon", ".ico"),
    ("image/vnd.microsoft.icon", ".ico"),
    ("text/css", ".css"),
    ("text/javascript", ".js"),
    ("application/javascript", ".js"),
    ("application/x-javascript", ".js"),
    ("application/ecmascript", ".js"),
    ("text/html", ".html"),
    ("text/plain", ".txt"),
    ("text/xml", ".xml"),
    ("application/xml", ".xml"),
    ("application/json", ".json"),
    ("application/pdf", ".pdf"),
    ("font/woff", ".woff"),
    ("font/woff2", ".woff2"),
    ("font/ttf", ".ttf"),
    ("font/otf", ".otf"),
    ("application/font-woff", ".woff"),
    ("application/vnd.ms-fontobject", ".eot"),
    ("audio/mpeg", ".mp3"),
    ("video/mp4", ".mp4"),
    ("video/webm", ".webm"),
];

/// Returns the extension (with leading dot) for a `Content-Type` value.
///
/// Parameters such as `; charset=utf-8` are ignored and the comparison is
/// case-insensitive. Unknown or empty types yield `None`.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    if essence.is_empty() {
        return None;
    }
    EXTENSIONS
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}
