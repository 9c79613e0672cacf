use std::path::PathBuf;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Account used for the login handshake.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// HTTP client tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_concurrent_downloads")]
    pub concurrent_downloads: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            concurrent_downloads: default_concurrent_downloads(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    String::from("soundscrape")
}

fn default_concurrent_downloads() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

/// Addresses of the crawled site, all derived from one base URL.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    base: Url,
}

impl SiteConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("base URL {base_url:?} has no host")));
        }
        Ok(Self { base })
    }

    pub fn login_url(&self) -> Result<Url> {
        self.join("/home/login/")
    }

    pub fn search_url(&self, keyword: &str) -> Result<Url> {
        let mut url = self.join("/search/")?;
        url.query_pairs_mut().append_pair("q", keyword);
        Ok(url)
    }

    /// Resolves a site-relative href (as found in page markup) against the
    /// base URL.
    pub fn join(&self, href: &str) -> Result<Url> {
        self.base
            .join(href)
            .map_err(|e| Error::Config(format!("cannot join {href:?} onto {}: {e}", self.base)))
    }
}

/// Everything one run needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub keywords: Vec<String>,
    /// Per-keyword sample cap, see [`crate::search`] for the exact boundary.
    pub limit: usize,
    pub out_root: PathBuf,
    pub site: SiteConfig,
    pub fetch: FetchConfig,
}

/// Splits the comma-separated `--queries` value into keywords.
pub fn parse_keywords(queries: &str) -> Result<Vec<String>> {
    let keywords: Vec<String> = queries
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        return Err(Error::Config(format!(
            "no keywords found in queries {queries:?}"
        )));
    }
    Ok(keywords)
}
