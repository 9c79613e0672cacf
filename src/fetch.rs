use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{REFERER, USER_AGENT};
use reqwest::Url;
use tokio::sync::Semaphore;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// HTTP front door for every stage of the pipeline.
///
/// One instance per run: the cookie store carries the authenticated session
/// across all subsequent fetches, and the semaphore caps how many requests
/// are in flight at once. Each response reports its final URL so callers can
/// resolve relative links and redirected download paths.
pub struct Fetcher {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    user_agent: String,
}

impl Fetcher {
    pub fn new(conf: &FetchConfig) -> Result<Self> {
        if conf.concurrent_downloads == 0 {
            // Semaphore::new(0) would make every fetch wait forever.
            return Err(Error::Config(
                "concurrent downloads must be at least 1".to_string(),
            ));
        }
        let client = reqwest::ClientBuilder::new()
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(conf.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(conf.concurrent_downloads)),
            user_agent: conf.user_agent.clone(),
        })
    }

    /// GET a page, returning the final URL after redirects and the body.
    pub async fn get_text(&self, url: Url) -> Result<(Url, String)> {
        let _permit = self.permits.acquire().await.expect("semaphore is never closed");
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;
        let final_url = resp.url().clone();
        let body = resp.text().await?;
        Ok((final_url, body))
    }

    /// GET a binary resource, returning the final URL and the raw payload.
    pub async fn get_bytes(&self, url: Url) -> Result<(Url, Vec<u8>)> {
        let _permit = self.permits.acquire().await.expect("semaphore is never closed");
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;
        let final_url = resp.url().clone();
        let body = resp.bytes().await?;
        Ok((final_url, body.to_vec()))
    }

    /// Submits an urlencoded form, returning the final URL and the body.
    pub async fn post_form(
        &self,
        url: Url,
        referer: &Url,
        form: &[(&str, &str)],
    ) -> Result<(Url, String)> {
        let _permit = self.permits.acquire().await.expect("semaphore is never closed");
        let resp = self
            .client
            .post(url)
            .header(USER_AGENT, &self.user_agent)
            .header(REFERER, referer.as_str())
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        let final_url = resp.url().clone();
        let body = resp.text().await?;
        Ok((final_url, body))
    }
}
