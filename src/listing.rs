use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::model::RawEntry;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.row").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".topictitle").unwrap());
static POSTED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".topic-poster time").unwrap());
static AUTHOR_COLOURED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".topic-poster a.username-coloured").unwrap());
static AUTHOR_PLAIN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".topic-poster a.username").unwrap());
static PAGE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".pagination a[href]").unwrap());

/// One forum listing page, reduced to the rows and pagination we care about.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub url: Url,
    pub entries: Vec<RawEntry>,
    pub page_links: Vec<Url>,
}

/// Extract thread rows and pagination links from a phpBB `viewforum` page.
/// Relative links are resolved against `base`.
pub fn parse_listing(html: &str, base: &Url) -> ListingPage {
    let doc = Html::parse_document(html);

    let entries = doc
        .select(&ROW)
        .filter_map(|row| parse_row(row, base))
        .collect();

    let mut seen = HashSet::new();
    let page_links = doc
        .select(&PAGE_LINK)
        .filter_map(|a| resolve(base, a.value().attr("href")?))
        .filter(|u| seen.insert(u.to_string()))
        .collect();

    ListingPage {
        url: base.clone(),
        entries,
        page_links,
    }
}

fn parse_row(row: ElementRef, base: &Url) -> Option<RawEntry> {
    let link = row.select(&TITLE).next()?;
    let title = link.text().collect::<String>().trim().to_string();
    if title.is_empty() {
        debug!("Skipping row with empty title");
        return None;
    }
    let Some(url) = link.value().attr("href").and_then(|h| resolve(base, h)) else {
        debug!(title = %title, "Skipping row without a usable link");
        return None;
    };

    let posted_iso = row
        .select(&POSTED)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .map(|s| s.trim().to_string());

    let author = row
        .select(&AUTHOR_COLOURED)
        .next()
        .or_else(|| row.select(&AUTHOR_PLAIN).next())
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    Some(RawEntry {
        title,
        url: url.to_string(),
        posted_iso,
        author,
    })
}

/// Resolve `href` against `base` and drop the phpBB session id and fragment.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href.trim()).ok()?;
    url.set_fragment(None);
    strip_session(&mut url);
    Some(url)
}

fn strip_session(url: &mut Url) {
    if !url.query_pairs().any(|(k, _)| k == "sid") {
        return;
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "sid")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}
