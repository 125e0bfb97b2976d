//! The clone operation: fetch one page, localize its assets, write `index.html`.

use kuchiki::traits::TendrilSink;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

use crate::asset_store::{AssetRecord, AssetStore, DegradedAsset};
use crate::config::MirrorConfig;
use crate::fetch::{CurlFetcher, FetchError, Fetcher, MemorySink};
use crate::rewriter;

/// Name of the rewritten page inside the output directory.
pub const INDEX_FILE: &str = "index.html";

/// Failures that abort a clone. Per-asset failures never end up here.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("invalid page URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme { scheme: String },
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("cannot write {}: {source}", .path.display())]
    WriteIndex {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one successful clone.
#[derive(Debug, Clone)]
pub struct CloneReport {
    pub page_url: String,
    pub index_path: PathBuf,
    /// Downloaded assets, in download order.
    pub assets: Vec<AssetRecord>,
    /// Assets left pointing at their remote URL.
    pub degraded: Vec<DegradedAsset>,
}

impl CloneReport {
    pub fn downloaded(&self) -> usize {
        self.assets.len()
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }
}

/// Clones pages with a given fetcher. Each call to [`PageCloner::clone_page`]
/// gets its own asset cache, so one cloner can mirror many pages.
pub struct PageCloner<F: Fetcher> {
    fetcher: F,
}

impl PageCloner<CurlFetcher> {
    /// Cloner backed by libcurl with the configured timeouts.
    pub fn from_config(cfg: &MirrorConfig) -> Self {
        Self::new(CurlFetcher::new(cfg.curl_options()))
    }
}

impl<F: Fetcher> PageCloner<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Mirror `page_url` into `output_dir`.
    ///
    /// Fails only on setup problems (bad URL, unwritable output directory) or
    /// when the page itself cannot be fetched or saved. Asset download
    /// failures leave the remote reference in place and are listed in the report.
    pub fn clone_page(&self, page_url: &str, output_dir: &Path) -> Result<CloneReport, CloneError> {
        let parsed = Url::parse(page_url).map_err(|source| CloneError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CloneError::UnsupportedScheme {
                scheme: parsed.scheme().to_string(),
            });
        }

        fs::create_dir_all(output_dir).map_err(|source| CloneError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        tracing::info!(url = page_url, output = %output_dir.display(), "fetching page");
        let mut page = MemorySink::new();
        self.fetcher
            .get(page_url, &mut page)
            .map_err(|source| CloneError::PageFetch {
                url: page_url.to_string(),
                source,
            })?;

        let document = kuchiki::parse_html().one(page.text());

        let mut store = AssetStore::new(&self.fetcher, output_dir);
        rewriter::rewrite(&document, &mut store, page_url);
        let (assets, degraded) = store.into_records();

        let index_path = output_dir.join(INDEX_FILE);
        let mut html = Vec::new();
        document
            .serialize(&mut html)
            .and_then(|()| fs::write(&index_path, &html))
            .map_err(|source| CloneError::WriteIndex {
                path: index_path.clone(),
                source,
            })?;

        tracing::info!(
            url = page_url,
            downloaded = assets.len(),
            degraded = degraded.len(),
            "page cloned to {}",
            output_dir.display()
        );

        Ok(CloneReport {
            page_url: page_url.to_string(),
            index_path,
            assets,
            degraded,
        })
    }
}
