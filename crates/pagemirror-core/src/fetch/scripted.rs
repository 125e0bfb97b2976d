//! In-memory [`Fetcher`] for unit tests: canned responses, recorded requests.

use super::{is_success, BodySink, FetchError, Fetcher, ResponseHead};
use std::cell::RefCell;
use std::collections::HashMap;

enum Scripted {
    Response {
        status: u32,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    /// Simulates a transport failure (curl "couldn't connect").
    Unreachable,
}

#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    responses: HashMap<String, Scripted>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(
        mut self,
        url: &str,
        status: u32,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Self {
        self.responses.insert(
            url.to_string(),
            Scripted::Response {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_vec(),
            },
        );
        self
    }

    pub(crate) fn unreachable(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Scripted::Unreachable);
        self
    }

    /// Every URL requested so far, in order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub(crate) fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

impl Fetcher for ScriptedFetcher {
    fn get(&self, url: &str, sink: &mut dyn BodySink) -> Result<ResponseHead, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            None => Err(FetchError::Http(404)),
            // CURLE_COULDNT_CONNECT
            Some(Scripted::Unreachable) => Err(FetchError::Curl(curl::Error::new(7))),
            Some(Scripted::Response {
                status,
                content_type,
                body,
            }) => {
                if !is_success(*status) {
                    return Err(FetchError::Http(*status));
                }
                let head = ResponseHead {
                    status: *status,
                    content_type: content_type.clone(),
                };
                sink.begin(&head).map_err(FetchError::Storage)?;
                // Two chunks so sinks see a streamed body.
                let mid = body.len() / 2;
                for chunk in [&body[..mid], &body[mid..]] {
                    if !chunk.is_empty() {
                        sink.write_chunk(chunk).map_err(FetchError::Storage)?;
                    }
                }
                Ok(head)
            }
        }
    }
}
