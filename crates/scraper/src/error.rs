//! Error taxonomy for a scrape run. Every variant aborts the run.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("{url}: expected markup not found: {element}")]
    Markup { url: String, element: &'static str },

    #[error("{url}: missing field '{field}'")]
    MissingField { url: String, field: &'static str },

    #[error("{url}: cannot parse {field} from {value:?}: {reason}")]
    Parse {
        url: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid CSS selector '{0}'")]
    Selector(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ScrapeError {
    pub(crate) fn parse(
        url: &str,
        field: &'static str,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        Self::Parse {
            url: url.to_string(),
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
