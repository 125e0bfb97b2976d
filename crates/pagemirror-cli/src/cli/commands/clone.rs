//! `pagemirror clone <url>` – mirror one page into a directory.

use anyhow::{Context, Result};
use pagemirror_core::cloner::PageCloner;
use pagemirror_core::config::MirrorConfig;
use std::path::Path;

pub fn run_clone(cfg: &MirrorConfig, url: &str, output: &Path) -> Result<()> {
    let cloner = PageCloner::from_config(cfg);
    let report = cloner
        .clone_page(url, output)
        .with_context(|| format!("cloning {url}"))?;

    println!(
        "Cloned {} to {}: {} downloaded, {} left remote",
        report.page_url,
        output.display(),
        report.downloaded(),
        report.degraded_count()
    );
    for d in &report.degraded {
        println!("  remote {:<12} {} ({})", d.category, d.url, d.reason);
    }
    Ok(())
}
