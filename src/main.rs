use std::env;
use std::path::PathBuf;

use structopt::StructOpt;
use tokio::runtime;

use soundscrape::{
    crawl, parse_keywords, Credentials, FetchConfig, RunConfig, SiteConfig,
};

/// Crawl a sound library and download samples matching keyword searches
#[derive(Debug, StructOpt)]
pub struct Opts {
    /// Comma-separated list of search keywords
    #[structopt(long, short)]
    pub queries: String,

    /// Maximum number of samples to collect per keyword
    #[structopt(long, short, default_value = "10")]
    pub limit: usize,

    /// Directory where per-keyword metadata and samples are written
    #[structopt(long, short, parse(from_os_str), default_value = "data")]
    pub output: PathBuf,

    /// Account username
    #[structopt(long, env = "SOUNDSCRAPE_USERNAME")]
    pub username: String,

    /// Account password
    #[structopt(long, env = "SOUNDSCRAPE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Base URL of the crawled site
    #[structopt(long, default_value = "https://freesound.org")]
    pub base_url: String,

    /// Maximum number of concurrent downloads
    #[structopt(long)]
    pub concurrent_downloads: Option<usize>,

    /// Per-request timeout in seconds
    #[structopt(long)]
    pub timeout_secs: Option<u64>,

    /// Override the crawler's user agent
    #[structopt(long)]
    pub user_agent: Option<String>,

    /// When quiet no logs are outputted
    #[structopt(long)]
    pub quiet: bool,
}

impl Opts {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let mut fetch = FetchConfig::default();
        if let Some(concurrent_downloads) = self.concurrent_downloads {
            fetch.concurrent_downloads = concurrent_downloads;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            fetch.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = self.user_agent {
            fetch.user_agent = user_agent;
        }
        Ok(RunConfig {
            credentials: Credentials {
                username: self.username,
                password: self.password,
            },
            keywords: parse_keywords(&self.queries)?,
            limit: self.limit,
            out_root: self.output,
            site: SiteConfig::new(&self.base_url)?,
            fetch,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::from_args();
    if !opts.quiet {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "soundscrape=info");
        }
        env_logger::init();
    }

    let config = opts.into_config()?;
    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(crawl(&config))?;
    Ok(())
}
