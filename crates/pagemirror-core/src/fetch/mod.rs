//! HTTP GET with streamed bodies.
//!
//! The rest of the crate only sees the [`Fetcher`] trait: one blocking GET
//! whose body is pushed chunk by chunk into a [`BodySink`]. [`CurlFetcher`]
//! is the libcurl-backed implementation used by the CLI.

mod charset;
mod curl_fetcher;
mod parse;
#[cfg(test)]
pub(crate) mod scripted;

pub use charset::{charset_from_content_type, decode_text};
pub use curl_fetcher::{CurlFetcher, CurlOptions};
pub use parse::parse_head;

use std::io;

/// Status line and the headers we care about from the final response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u32,
    /// Raw `Content-Type` value, if the server sent one.
    pub content_type: Option<String>,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }
}

pub(crate) fn is_success(status: u32) -> bool {
    (200..300).contains(&status)
}

/// Error from a single GET.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status; the body was discarded.
    #[error("HTTP {0}")]
    Http(u32),
    /// The sink could not store the body (disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[source] io::Error),
}

/// Receives a successful response body as it streams in.
pub trait BodySink {
    /// Called once, after the final response headers are known and before any chunk.
    /// Also called for an empty body.
    fn begin(&mut self, head: &ResponseHead) -> io::Result<()>;

    /// Called for each body chunk, in order.
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// Blocking HTTP GET capability.
///
/// Implementations follow redirects and report the final response. For a
/// non-2xx status they return [`FetchError::Http`] without touching the sink.
pub trait Fetcher {
    fn get(&self, url: &str, sink: &mut dyn BodySink) -> Result<ResponseHead, FetchError>;
}

/// Buffers the whole body in memory. Used for the page itself.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub head: Option<ResponseHead>,
    pub body: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body decoded with the response charset (UTF-8 if none was declared).
    pub fn text(&self) -> String {
        let content_type = self.head.as_ref().and_then(|h| h.content_type.as_deref());
        decode_text(&self.body, content_type)
    }
}

impl BodySink for MemorySink {
    fn begin(&mut self, head: &ResponseHead) -> io::Result<()> {
        self.head = Some(head.clone());
        self.body.clear();
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(chunk);
        Ok(())
    }
}
