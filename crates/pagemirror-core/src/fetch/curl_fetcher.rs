//! libcurl-backed [`Fetcher`]: one `Easy` handle per GET, body streamed to the sink.

use super::{is_success, parse_head, BodySink, FetchError, Fetcher, ResponseHead};
use crate::config::MirrorConfig;
use curl::easy::Easy;
use std::cell::RefCell;
use std::io;
use std::str;
use std::time::Duration;

/// Per-request transfer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-request deadline.
    pub timeout: Duration,
    pub max_redirections: u32,
    pub user_agent: String,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        MirrorConfig::default().curl_options()
    }
}

/// Blocking GET through libcurl. Follows redirects, accepts compressed bodies.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: CurlOptions,
}

impl CurlFetcher {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CurlOptions {
        &self.options
    }

    fn configure(&self, easy: &mut Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.options.max_redirections)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.timeout(self.options.timeout)?;
        easy.low_speed_limit(self.options.low_speed_limit)?;
        easy.low_speed_time(self.options.low_speed_time)?;
        easy.useragent(&self.options.user_agent)?;
        // Empty string = every encoding libcurl was built with; bodies arrive decoded.
        easy.accept_encoding("")?;
        Ok(())
    }
}

/// Shared between the header and write callbacks of one transfer.
struct TransferState<'s> {
    header_lines: Vec<String>,
    /// Set on the first body chunk, once the final headers are complete.
    head: Option<ResponseHead>,
    /// Non-2xx body: swallow it without touching the sink.
    discard: bool,
    sink: &'s mut dyn BodySink,
    sink_error: Option<io::Error>,
}

impl TransferState<'_> {
    /// Returns the number of bytes consumed; anything short of `data.len()` aborts the transfer.
    fn on_chunk(&mut self, data: &[u8]) -> usize {
        if self.head.is_none() {
            // No status line at all (HTTP/0.9 style): curl only hands us a body
            // for a response it accepted, so treat it as success.
            let head = parse_head(&self.header_lines).unwrap_or(ResponseHead {
                status: 200,
                content_type: None,
            });
            self.discard = !head.is_success();
            let began = if self.discard {
                Ok(())
            } else {
                self.sink.begin(&head)
            };
            self.head = Some(head);
            if let Err(e) = began {
                self.sink_error = Some(e);
                return 0;
            }
        }

        if self.discard {
            return data.len();
        }
        match self.sink.write_chunk(data) {
            Ok(()) => data.len(),
            Err(e) => {
                tracing::warn!("body write failed: {}", e);
                self.sink_error = Some(e);
                0
            }
        }
    }
}

impl Fetcher for CurlFetcher {
    fn get(&self, url: &str, sink: &mut dyn BodySink) -> Result<ResponseHead, FetchError> {
        let mut easy = Easy::new();
        self.configure(&mut easy, url)?;

        let state = RefCell::new(TransferState {
            header_lines: Vec::new(),
            head: None,
            discard: false,
            sink,
            sink_error: None,
        });

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    state.borrow_mut().header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| Ok(state.borrow_mut().on_chunk(data)))?;
            transfer.perform()
        };

        let mut state = state.into_inner();
        if let Some(e) = state.sink_error.take() {
            return Err(FetchError::Storage(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !is_success(code) {
            return Err(FetchError::Http(code));
        }

        match state.head.take() {
            Some(mut head) => {
                head.status = code;
                Ok(head)
            }
            None => {
                // Empty body: the sink has not seen this response yet.
                let content_type = parse_head(&state.header_lines).and_then(|h| h.content_type);
                let head = ResponseHead {
                    status: code,
                    content_type,
                };
                state.sink.begin(&head).map_err(FetchError::Storage)?;
                Ok(head)
            }
        }
    }
}
