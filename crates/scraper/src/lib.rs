//! Catalog scraper.
//!
//! A run walks the paginated index ([`traversal`]), fetches every detail page
//! ([`extract`]), normalizes the collected set into typed records
//! ([`normalize`]) and writes the result to a dated CSV file ([`output`]).
//! Everything is sequential and fail-fast: the first network, markup or
//! parse failure aborts the run and nothing partial is returned.

use std::path::{Path, PathBuf};

use reqwest::Url;
use time::Date;

pub mod error;
pub mod extract;
mod html;
pub mod normalize;
pub mod output;
pub mod record;
pub mod source;
pub mod traversal;

pub use error::{Result, ScrapeError};
pub use extract::RawBook;
pub use record::BookRecord;
pub use source::{HttpPageSource, MemoryPageSource, PageSource};

/// Default catalog root.
pub const DEFAULT_BASE_URL: &str = "https://books.toscrape.com/catalogue/";

/// Default number of index pages to walk.
pub const DEFAULT_PAGES: u32 = 50;

/// Result of a completed run.
#[derive(Debug)]
pub struct ScrapeOutput {
    pub records: Vec<BookRecord>,
    pub output_path: PathBuf,
}

/// Scrape pipeline bound to a page source, a catalog root and an output
/// directory.
pub struct Scraper<S> {
    source: S,
    base_url: Url,
    output_dir: PathBuf,
}

impl<S: PageSource> Scraper<S> {
    pub fn new(source: S, base_url: &str, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            source,
            base_url,
            output_dir: output_dir.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Traverse, extract and normalize `pages` index pages without writing
    /// anything.
    pub async fn scrape(&self, pages: u32) -> Result<Vec<BookRecord>> {
        let links = traversal::collect_links(&self.source, &self.base_url, pages).await?;
        let raw = extract::extract_all(&self.source, &self.base_url, &links).await?;
        normalize::normalize(raw)
    }

    /// Full run dated by [`output::run_date`].
    pub async fn run(&self, pages: u32) -> Result<ScrapeOutput> {
        self.run_dated(pages, output::run_date()).await
    }

    /// Full run whose audit file is named after `date`.
    pub async fn run_dated(&self, pages: u32, date: Date) -> Result<ScrapeOutput> {
        tracing::info!(pages, base_url = %self.base_url, "starting scrape");

        let records = self.scrape(pages).await?;
        let output_path = output::write_records(&self.output_dir, date, &records)?;

        tracing::info!(
            records = records.len(),
            path = %output_path.display(),
            "scrape complete"
        );

        Ok(ScrapeOutput {
            records,
            output_path,
        })
    }
}
