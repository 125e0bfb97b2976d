//! Parse collected HTTP response header lines into a ResponseHead.

use super::ResponseHead;

/// Parse header lines collected by curl's header callback.
///
/// When redirects are followed, lines from every response in the chain are
/// present; only the block starting at the last status line counts.
/// Returns `None` if no status line was seen.
pub fn parse_head(lines: &[String]) -> Option<ResponseHead> {
    let start = lines.iter().rposition(|l| l.trim_start().starts_with("HTTP/"))?;
    let status = parse_status_line(&lines[start])?;

    let mut content_type = None;
    for line in &lines[start + 1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                let value = value.trim();
                if !value.is_empty() {
                    content_type = Some(value.to_string());
                }
            }
        }
    }

    Some(ResponseHead {
        status,
        content_type,
    })
}

/// `HTTP/1.1 404 Not Found` → 404.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
