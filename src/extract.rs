//! Pure field extraction over fetched documents. No state, no I/O: every
//! function parses the given markup and pulls out the handful of values the
//! pipeline needs, so each one can be unit tested against fixture pages.

use reqwest::Url;
use select::document::Document;
use select::predicate::{Attr, Class, Name, Predicate};

/// One result entry on a search page, before a rank is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub id: String,
    pub tags: Vec<String>,
    pub detail_href: String,
}

/// Everything the walker needs from one search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub entries: Vec<SearchEntry>,
    pub next_href: Option<String>,
}

/// Everything the resolver needs from one sample detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub download_href: Option<String>,
    /// Description values in document order: type, duration, filesize,
    /// samplerate, bitdepth, channels on freesound.org.
    pub info: Vec<String>,
}

/// Anti-forgery token embedded in the login form.
pub fn csrf_token(html: &str) -> Option<String> {
    let doc = Document::from(html);
    doc.find(Attr("name", "csrfmiddlewaretoken"))
        .filter_map(|input| input.attr("value"))
        .map(str::to_string)
        .next()
}

/// Parses a search results page into its entries and "next page" link.
/// Entries missing an id or a detail link are dropped.
pub fn search_page(html: &str) -> SearchPage {
    let doc = Document::from(html);

    let entries = doc
        .find(Class("sample_player_small"))
        .filter_map(|sample| {
            let id = sample.attr("id")?.to_string();
            let detail_href = sample
                .find(
                    Class("sound_title")
                        .descendant(Class("sound_filename"))
                        .descendant(Name("a").and(Class("title"))),
                )
                .filter_map(|a| a.attr("href"))
                .next()?
                .to_string();
            let tags = sample
                .find(
                    Class("sound_tags")
                        .descendant(Class("tags"))
                        .descendant(Name("li").descendant(Name("a"))),
                )
                .map(|a| a.text().trim().to_string())
                .collect();
            Some(SearchEntry {
                id,
                tags,
                detail_href,
            })
        })
        .collect();

    let next_href = doc
        .find(
            Class("search_paginator")
                .descendant(Class("pagination"))
                .descendant(Class("next-page").descendant(Name("a"))),
        )
        .filter_map(|a| a.attr("href"))
        .map(str::to_string)
        .next();

    SearchPage { entries, next_href }
}

/// Parses a sample detail page into its download link and description block.
pub fn detail_page(html: &str) -> DetailPage {
    let doc = Document::from(html);

    let download_href = doc
        .find(Attr("id", "download").descendant(Name("a")))
        .filter_map(|a| a.attr("href"))
        .map(str::to_string)
        .next();

    let info = doc
        .find(Attr("id", "sound_information_box").descendant(Name("dd")))
        .map(|dd| dd.text().trim().to_string())
        .collect();

    DetailPage {
        download_href,
        info,
    }
}

/// Derives `(sample id, file extension)` from a download URL.
///
/// This leans on the site's download URL convention
/// `.../sounds/<id>/download/<name>.<ext>`: the id is the third-from-last
/// path segment and the extension is taken from the last one. Returns `None`
/// when the path has fewer than three segments or the last segment carries
/// no extension, so callers can surface the convention break instead of
/// writing to a bogus path.
pub fn asset_path_parts(url: &Url) -> Option<(String, String)> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    if segments.len() < 3 {
        return None;
    }
    let id = segments[segments.len() - 3];
    if id.is_empty() {
        return None;
    }
    let (stem, ext) = segments[segments.len() - 1].rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some((id.to_string(), ext.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><body>
          <form method="post" action="/home/login/">
            <input type="hidden" name="csrfmiddlewaretoken" value="t0k3n"/>
            <input type="text" name="username"/>
            <input type="password" name="password"/>
          </form>
        </body></html>"#;

    fn sample_div(id: &str, href: &str, tags: &[&str]) -> String {
        let tags = tags
            .iter()
            .map(|t| format!("<li><a href=\"/tag/{t}/\">{t}</a></li>"))
            .collect::<String>();
        format!(
            r#"<div class="sample_player_small" id="{id}">
                 <div class="sound_title">
                   <div class="sound_filename">
                     <a class="title" href="{href}">some sound</a>
                   </div>
                 </div>
                 <div class="sound_tags"><ul class="tags">{tags}</ul></div>
               </div>"#
        )
    }

    fn search_fixture(with_next: bool) -> String {
        let next = if with_next {
            r#"<div class="search_paginator">
                 <ul class="pagination">
                   <li class="next-page"><a href="?q=rain&amp;page=2">next</a></li>
                 </ul>
               </div>"#
        } else {
            ""
        };
        format!(
            "<html><body>{}{}{}{next}</body></html>",
            sample_div("sound_1", "/people/a/sounds/1/", &["rain", "storm"]),
            sample_div("sound_2", "/people/b/sounds/2/", &[]),
            sample_div("sound_3", "/people/c/sounds/3/", &["wet"]),
        )
    }

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <div id="download">
            <a href="/people/a/sounds/1/download/1__a__rain.wav">Download</a>
          </div>
          <div id="sound_information_box">
            <dl>
              <dt>Type</dt><dd>wav</dd>
              <dt>Duration</dt><dd>12.5</dd>
              <dt>Filesize</dt><dd>2.1 MB</dd>
              <dt>Samplerate</dt><dd>44100</dd>
              <dt>Bitdepth</dt><dd>16</dd>
              <dt>Channels</dt><dd>2</dd>
            </dl>
          </div>
        </body></html>"#;

    #[test]
    fn token_is_extracted_from_login_form() {
        assert_eq!(csrf_token(LOGIN_PAGE).as_deref(), Some("t0k3n"));
        assert_eq!(csrf_token("<html><body></body></html>"), None);
    }

    #[test]
    fn search_page_yields_entries_in_document_order() {
        let page = search_page(&search_fixture(true));
        assert_eq!(page.entries.len(), 3);
        assert_eq!(page.entries[0].id, "sound_1");
        assert_eq!(page.entries[0].tags, vec!["rain", "storm"]);
        assert_eq!(page.entries[0].detail_href, "/people/a/sounds/1/");
        assert!(page.entries[1].tags.is_empty());
        assert_eq!(page.next_href.as_deref(), Some("?q=rain&page=2"));
    }

    #[test]
    fn missing_paginator_means_no_next_page() {
        let page = search_page(&search_fixture(false));
        assert_eq!(page.entries.len(), 3);
        assert_eq!(page.next_href, None);
    }

    #[test]
    fn entry_without_title_link_is_dropped() {
        let html = format!(
            r#"<html><body>
                 <div class="sample_player_small" id="sound_9"></div>
                 {}
               </body></html>"#,
            sample_div("sound_10", "/people/z/sounds/10/", &["ok"])
        );
        let page = search_page(&html);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].id, "sound_10");
    }

    #[test]
    fn detail_page_yields_link_and_ordered_info() {
        let detail = detail_page(DETAIL_PAGE);
        assert_eq!(
            detail.download_href.as_deref(),
            Some("/people/a/sounds/1/download/1__a__rain.wav")
        );
        assert_eq!(
            detail.info,
            vec!["wav", "12.5", "2.1 MB", "44100", "16", "2"]
        );
    }

    #[test]
    fn detail_page_without_download_link() {
        let detail = detail_page("<html><body><div id='download'></div></body></html>");
        assert_eq!(detail.download_href, None);
        assert!(detail.info.is_empty());
    }

    #[test]
    fn asset_parts_follow_the_url_convention() {
        let url = Url::parse("https://freesound.org/people/a/sounds/403529/download/x.wav")
            .unwrap();
        assert_eq!(
            asset_path_parts(&url),
            Some(("403529".into(), "wav".into()))
        );
    }

    #[test]
    fn asset_parts_reject_short_or_extensionless_paths() {
        let short = Url::parse("https://freesound.org/x.wav").unwrap();
        assert_eq!(asset_path_parts(&short), None);

        let no_ext = Url::parse("https://freesound.org/sounds/1/download/file").unwrap();
        assert_eq!(asset_path_parts(&no_ext), None);

        let dotfile = Url::parse("https://freesound.org/sounds/1/download/.wav").unwrap();
        assert_eq!(asset_path_parts(&dotfile), None);
    }
}
