//! Text decoding for fetched bodies.

use encoding_rs::{Encoding, UTF_8};

/// `charset` parameter of a `Content-Type` value, unquoted.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then_some(value)
    })
}

/// Decode `body` using the declared charset, UTF-8 when absent or unknown.
///
/// A byte-order mark wins over the declared charset. Malformed sequences
/// become U+FFFD.
pub fn decode_text(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "body had malformed sequences");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_parameter() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_from_content_type("text/html;Charset=\"utf-8\""),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
        assert_eq!(charset_from_content_type("text/html; charset="), None);
    }

    #[test]
    fn latin1_body() {
        let body = b"<p>caf\xe9</p>";
        assert_eq!(
            decode_text(body, Some("text/html; charset=iso-8859-1")),
            "<p>café</p>"
        );
    }

    #[test]
    fn windows_1252_quotes() {
        assert_eq!(
            decode_text(b"\x93hi\x94", Some("text/html; charset=windows-1252")),
            "\u{201c}hi\u{201d}"
        );
    }

    #[test]
    fn defaults_to_utf8() {
        assert_eq!(decode_text("café".as_bytes(), None), "café");
        assert_eq!(
            decode_text("café".as_bytes(), Some("text/html; charset=bogus")),
            "café"
        );
        assert_eq!(decode_text(b"caf\xe9", Some("text/html")), "caf\u{fffd}");
    }

    #[test]
    fn bom_overrides_header() {
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice("café".as_bytes());
        assert_eq!(
            decode_text(&body, Some("text/html; charset=iso-8859-1")),
            "café"
        );
    }
}
