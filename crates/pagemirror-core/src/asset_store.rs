//! Per-clone asset cache: canonical URL → local path, download at most once.
//!
//! An [`AssetStore`] belongs to one clone operation. It downloads a URL the
//! first time it is asked for it and answers later requests for the same URL
//! from its cache. Failed downloads are not cached, so a later reference to
//! the same URL tries again.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::fetch::{BodySink, FetchError, Fetcher, ResponseHead};
use crate::storage::AssetFileWriter;
use crate::url_model::{derive_filename, is_downloadable};

/// Kind of reference an asset was discovered through; decides its subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Image,
    Stylesheet,
    Script,
    /// Referenced from a `url(...)` inside an inline `<style>` block.
    InlineAsset,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::Image,
        AssetCategory::Stylesheet,
        AssetCategory::Script,
        AssetCategory::InlineAsset,
    ];

    /// Subdirectory of the output directory that holds this category.
    pub fn subdir(self) -> &'static str {
        match self {
            AssetCategory::Image => "images",
            AssetCategory::Stylesheet => "css",
            AssetCategory::Script => "js",
            AssetCategory::InlineAsset => "assets",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetCategory::Image => "image",
            AssetCategory::Stylesheet => "stylesheet",
            AssetCategory::Script => "script",
            AssetCategory::InlineAsset => "inline-asset",
        };
        f.write_str(name)
    }
}

/// One successfully downloaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub canonical_url: String,
    /// Relative to the output directory, `/`-separated (e.g. `images/logo.png`).
    pub local_path: String,
    pub category: AssetCategory,
}

/// An asset whose download failed; its reference stays remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedAsset {
    pub url: String,
    pub category: AssetCategory,
    pub reason: String,
}

/// What the store did with one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Downloaded now; value is the local path.
    Downloaded(String),
    /// Already downloaded earlier in this run; value is the local path.
    Cached(String),
    /// Not an http(s) URL (data URI, unresolvable reference); left as is.
    PassThrough(String),
    /// Download failed; the reference keeps pointing at `url`.
    Degraded { url: String, reason: String },
}

impl AssetOutcome {
    /// The value to write back into the document.
    pub fn reference(&self) -> &str {
        match self {
            AssetOutcome::Downloaded(path) | AssetOutcome::Cached(path) => path,
            AssetOutcome::PassThrough(reference) => reference,
            AssetOutcome::Degraded { url, .. } => url,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, AssetOutcome::Downloaded(_) | AssetOutcome::Cached(_))
    }
}

/// Streams a response body into `<dir>/<derived filename>`.
///
/// The filename needs the response `Content-Type`, so the file is only
/// opened in [`BodySink::begin`].
struct AssetFileSink<'a> {
    dir: &'a Path,
    url: &'a str,
    writer: Option<AssetFileWriter>,
    filename: Option<String>,
}

impl<'a> AssetFileSink<'a> {
    fn new(dir: &'a Path, url: &'a str) -> Self {
        Self {
            dir,
            url,
            writer: None,
            filename: None,
        }
    }

    /// Move the completed file into place and return its filename.
    fn finish(self) -> io::Result<String> {
        match (self.writer, self.filename) {
            (Some(writer), Some(filename)) => {
                writer.finalize()?;
                Ok(filename)
            }
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "response finished without a body",
            )),
        }
    }

    fn abandon(self) {
        if let Some(writer) = self.writer {
            writer.discard();
        }
    }
}

impl BodySink for AssetFileSink<'_> {
    fn begin(&mut self, head: &ResponseHead) -> io::Result<()> {
        let filename = derive_filename(self.url, head.content_type.as_deref());
        self.writer = Some(AssetFileWriter::create(&self.dir.join(&filename))?);
        self.filename = Some(filename);
        Ok(())
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_chunk(chunk),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "body chunk before response head",
            )),
        }
    }
}

/// Download-once asset cache for one clone operation.
pub struct AssetStore<'f> {
    fetcher: &'f dyn Fetcher,
    output_dir: PathBuf,
    cache: HashMap<String, AssetRecord>,
    /// Insertion order of `cache`, for reporting.
    order: Vec<String>,
    degraded: Vec<DegradedAsset>,
}

impl<'f> AssetStore<'f> {
    pub fn new(fetcher: &'f dyn Fetcher, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            output_dir: output_dir.into(),
            cache: HashMap::new(),
            order: Vec::new(),
            degraded: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the local path for `canonical_url`, downloading it on first sight.
    ///
    /// Non-http(s) input is passed through without network access. A failed
    /// download returns [`AssetOutcome::Degraded`] and caches nothing.
    pub fn fetch_or_get_cached(
        &mut self,
        canonical_url: &str,
        category: AssetCategory,
    ) -> AssetOutcome {
        if !is_downloadable(canonical_url) {
            return AssetOutcome::PassThrough(canonical_url.to_string());
        }

        if let Some(record) = self.cache.get(canonical_url) {
            tracing::debug!(url = canonical_url, path = %record.local_path, "asset cache hit");
            return AssetOutcome::Cached(record.local_path.clone());
        }

        match self.download(canonical_url, category) {
            Ok(record) => {
                tracing::debug!(
                    url = canonical_url,
                    path = %record.local_path,
                    %category,
                    "asset downloaded"
                );
                let local_path = record.local_path.clone();
                self.order.push(canonical_url.to_string());
                self.cache.insert(canonical_url.to_string(), record);
                AssetOutcome::Downloaded(local_path)
            }
            Err(e) => {
                tracing::warn!(url = canonical_url, %category, "asset download failed: {}", e);
                let reason = e.to_string();
                self.degraded.push(DegradedAsset {
                    url: canonical_url.to_string(),
                    category,
                    reason: reason.clone(),
                });
                AssetOutcome::Degraded {
                    url: canonical_url.to_string(),
                    reason,
                }
            }
        }
    }

    fn download(&self, url: &str, category: AssetCategory) -> Result<AssetRecord, FetchError> {
        let dir = self.output_dir.join(category.subdir());
        let mut sink = AssetFileSink::new(&dir, url);
        match self.fetcher.get(url, &mut sink) {
            Ok(_) => {
                let filename = sink.finish().map_err(FetchError::Storage)?;
                Ok(AssetRecord {
                    canonical_url: url.to_string(),
                    local_path: format!("{}/{}", category.subdir(), filename),
                    category,
                })
            }
            Err(e) => {
                sink.abandon();
                Err(e)
            }
        }
    }

    /// Cached local path for `canonical_url`, without downloading.
    pub fn local_path(&self, canonical_url: &str) -> Option<&str> {
        self.cache.get(canonical_url).map(|r| r.local_path.as_str())
    }

    /// Downloaded assets in download order.
    pub fn records(&self) -> impl Iterator<Item = &AssetRecord> {
        self.order.iter().filter_map(|url| self.cache.get(url))
    }

    /// Every failed download attempt, in order (a URL can appear more than once).
    pub fn degraded(&self) -> &[DegradedAsset] {
        &self.degraded
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Consume the store, returning downloaded records and failures.
    pub fn into_records(mut self) -> (Vec<AssetRecord>, Vec<DegradedAsset>) {
        let records = self
            .order
            .iter()
            .filter_map(|url| self.cache.remove(url))
            .collect();
        (records, self.degraded)
    }
}
