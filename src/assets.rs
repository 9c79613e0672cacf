use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::{Error, Result};
use crate::extract;
use crate::fetch::Fetcher;

/// Downloads one binary asset to `<out_root>/<keyword>/<id>.<ext>`.
///
/// The id and extension come from the response's final URL (after
/// redirects) via [`extract::asset_path_parts`]. The path is deterministic
/// per item, and an existing file is overwritten silently. A failure here
/// never touches the metadata row already recorded for the item.
pub async fn download(
    fetcher: &Fetcher,
    out_root: &Path,
    keyword: &str,
    url: Url,
) -> Result<PathBuf> {
    let fail = |url: &Url, reason: String| Error::Asset {
        url: url.to_string(),
        reason,
    };

    let (final_url, payload) = fetcher
        .get_bytes(url.clone())
        .await
        .map_err(|e| fail(&url, e.to_string()))?;

    let (id, ext) = extract::asset_path_parts(&final_url).ok_or_else(|| {
        fail(
            &final_url,
            "URL does not follow the <id>/download/<name>.<ext> convention".to_string(),
        )
    })?;

    let path = out_root.join(keyword).join(format!("{id}.{ext}"));
    tokio::fs::write(&path, &payload)
        .await
        .map_err(|e| fail(&final_url, e.to_string()))?;

    log::info!("saved {} ({} bytes)", path.display(), payload.len());
    Ok(path)
}
