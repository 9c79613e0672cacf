//! Run lifecycle controller. One run moves through Init, Authenticating,
//! Searching, Draining and Exporting in order; authentication is the only
//! stage whose failure aborts the run.

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use reqwest::Url;

use crate::config::RunConfig;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::search::ItemRef;
use crate::table::Accumulator;
use crate::{assets, auth, resolve, search};

/// One unit of pipeline work. Every job may fan out into follow-up jobs:
/// a search page yields resolve jobs plus at most one continuation page,
/// a resolve yields at most one asset fetch, an asset fetch yields nothing.
enum Job {
    Search {
        keyword: String,
        url: Url,
        count: usize,
    },
    Resolve(ItemRef),
    Asset {
        keyword: String,
        url: Url,
    },
}

/// Drives a whole crawl run to completion.
///
/// Dispatched work lives in a single `FuturesUnordered`; each finished job
/// pushes its follow-ups back in, so "drained" is simply the set running
/// empty. Per-job failures are logged and contained, they never abort the
/// run. The accumulated metadata is exported exactly once, after the drain.
pub async fn crawl(config: &RunConfig) -> Result<()> {
    // Init
    let fetcher = Fetcher::new(&config.fetch)?;
    let table = Accumulator::new(config.keywords.iter().cloned());
    for keyword in &config.keywords {
        tokio::fs::create_dir_all(config.out_root.join(keyword)).await?;
    }

    // Authenticating: fatal on failure, nothing has been dispatched yet
    // and nothing gets exported.
    auth::login(&fetcher, &config.site, &config.credentials).await?;

    // Searching: one independent walk per keyword.
    let mut in_flight = FuturesUnordered::new();
    for keyword in &config.keywords {
        let url = config.site.search_url(keyword)?;
        log::info!("searching {keyword:?} (limit {})", config.limit);
        in_flight.push(run_job(
            Job::Search {
                keyword: keyword.clone(),
                url,
                count: 0,
            },
            &fetcher,
            config,
            &table,
        ));
    }

    // Draining
    while let Some(follow_ups) = in_flight.next().await {
        for job in follow_ups {
            in_flight.push(run_job(job, &fetcher, config, &table));
        }
    }

    // Exporting
    table.export(&config.out_root)?;
    Ok(())
}

async fn run_job(
    job: Job,
    fetcher: &Fetcher,
    config: &RunConfig,
    table: &Accumulator,
) -> Vec<Job> {
    match job {
        Job::Search {
            keyword,
            url,
            count,
        } => {
            match search::walk_page(fetcher, &config.site, &keyword, url, count, config.limit)
                .await
            {
                Ok(outcome) => {
                    let mut follow_ups: Vec<Job> =
                        outcome.items.into_iter().map(Job::Resolve).collect();
                    if let Some((url, count)) = outcome.next {
                        follow_ups.push(Job::Search {
                            keyword,
                            url,
                            count,
                        });
                    }
                    follow_ups
                }
                Err(e) => {
                    log::warn!("{e}");
                    vec![]
                }
            }
        }
        Job::Resolve(item) => {
            let keyword = item.keyword.clone();
            match resolve::resolve(fetcher, &config.site, table, &item).await {
                Ok(url) => vec![Job::Asset { keyword, url }],
                Err(e) => {
                    log::warn!("{e}");
                    vec![]
                }
            }
        }
        Job::Asset { keyword, url } => {
            if let Err(e) = assets::download(fetcher, &config.out_root, &keyword, url).await {
                log::warn!("{e}");
            }
            vec![]
        }
    }
}
