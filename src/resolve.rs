use reqwest::Url;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::extract;
use crate::fetch::Fetcher;
use crate::search::ItemRef;
use crate::table::{Accumulator, MetadataRow};

/// Resolves one discovered sample: fetches its detail page, records its
/// metadata row at the item's rank and returns the download URL for the
/// asset stage.
///
/// A missing download link or an empty description block fails this item
/// only; nothing is recorded for its rank and no asset fetch follows.
pub async fn resolve(
    fetcher: &Fetcher,
    site: &SiteConfig,
    table: &Accumulator,
    item: &ItemRef,
) -> Result<Url> {
    let fail = |reason: String| Error::Resolve {
        id: item.id.clone(),
        keyword: item.keyword.clone(),
        reason,
    };

    let (_, body) = fetcher
        .get_text(item.detail_url.clone())
        .await
        .map_err(|e| fail(e.to_string()))?;

    let detail = extract::detail_page(&body);
    let href = detail
        .download_href
        .ok_or_else(|| fail("no download link on the detail page".to_string()))?;
    if detail.info.is_empty() {
        return Err(fail("no sound information block".to_string()));
    }
    let asset_url = site.join(&href).map_err(|e| fail(e.to_string()))?;

    let row = MetadataRow::new(&item.id, &item.keyword, &item.tags, detail.info);
    table.put(&item.keyword, item.rank, row);
    log::debug!(
        "resolved {} ({:?}, rank {})",
        item.id,
        item.keyword,
        item.rank
    );

    Ok(asset_url)
}
