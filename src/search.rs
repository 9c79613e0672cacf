use reqwest::Url;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::extract::{self, SearchPage};
use crate::fetch::Fetcher;

/// One discovered sample, ready for resolution. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    /// 0-based position within the keyword's result sequence, assigned
    /// monotonically at discovery time. The stable accumulator key.
    pub rank: usize,
    pub id: String,
    pub keyword: String,
    pub tags: Vec<String>,
    pub detail_url: Url,
}

/// What one results page contributed to the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub items: Vec<ItemRef>,
    /// Next page to walk with the carried counter, when the budget allows.
    pub next: Option<(Url, usize)>,
}

/// Fetches one results page of a keyword's walk and plans its follow-ups.
///
/// `count` is the number of ranks assigned so far for this keyword; the
/// returned continuation carries it forward. A fetch failure ends only this
/// keyword's walk (items from earlier pages are already in flight).
pub async fn walk_page(
    fetcher: &Fetcher,
    site: &SiteConfig,
    keyword: &str,
    url: Url,
    count: usize,
    limit: usize,
) -> Result<PageOutcome> {
    let (page_url, body) = fetcher
        .get_text(url)
        .await
        .map_err(|e| Error::SearchPage {
            keyword: keyword.to_string(),
            reason: e.to_string(),
        })?;
    Ok(plan_page(
        extract::search_page(&body),
        site,
        &page_url,
        keyword,
        count,
        limit,
    ))
}

/// Admission and pagination policy, split out from the fetch for testing.
///
/// The admission boundary is inclusive: an entry is admitted while
/// `count <= limit`, so up to `limit + 1` items can be dispatched per
/// keyword. `limit` is a soft cap. Pagination continues only while
/// `count < limit` after the page, so a page that fills the budget also
/// ends the walk.
pub fn plan_page(
    page: SearchPage,
    site: &SiteConfig,
    page_url: &Url,
    keyword: &str,
    count: usize,
    limit: usize,
) -> PageOutcome {
    let mut cur = count;
    let mut items = Vec::new();

    for entry in page.entries {
        if cur > limit {
            break;
        }
        let rank = cur;
        cur += 1;
        let detail_url = match site.join(&entry.detail_href) {
            Ok(url) => url,
            Err(e) => {
                // Rank stays consumed: assignment happens at discovery.
                log::warn!("skipping entry {} for {keyword:?}: {e}", entry.id);
                continue;
            }
        };
        items.push(ItemRef {
            rank,
            id: entry.id,
            keyword: keyword.to_string(),
            tags: entry.tags,
            detail_url,
        });
    }

    let next = if cur < limit {
        match page.next_href {
            Some(href) => match page_url.join(&href) {
                Ok(url) => Some((url, cur)),
                Err(e) => {
                    log::warn!("bad next-page link {href:?} for {keyword:?}: {e}");
                    None
                }
            },
            None => {
                log::debug!("search for {keyword:?} exhausted after {cur} items");
                None
            }
        }
    } else {
        None
    };

    PageOutcome { items, next }
}
