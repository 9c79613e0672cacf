use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure taxonomy of one crawl run.
///
/// Only `Auth` is fatal: it aborts the run before any search is dispatched.
/// The other variants are contained at their stage; the affected keyword or
/// item is skipped and the run carries on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("search walk for {keyword:?} ended early: {reason}")]
    SearchPage { keyword: String, reason: String },

    #[error("could not resolve sample {id} ({keyword:?}): {reason}")]
    Resolve {
        id: String,
        keyword: String,
        reason: String,
    },

    #[error("asset download failed for {url}: {reason}")]
    Asset { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
