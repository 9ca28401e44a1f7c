use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};
use url::Url;

use crate::error::FetchError;
use crate::listing::{self, ListingPage};

/// GET a page and return its body. Non-2xx responses are errors.
pub async fn fetch_html(client: &reqwest::Client, url: &Url) -> Result<String, FetchError> {
    debug!(url = %url, "GET");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|source| FetchError::Url {
        url: raw.to_string(),
        source,
    })
}

/// Listing pages of one forum, fetched on demand.
///
/// Starts at the forum's first page and follows every pagination link that
/// stays within the same forum, visiting each page once.
pub struct ForumPages {
    client: reqwest::Client,
    forum: Url,
    queue: VecDeque<Url>,
    seen: HashSet<String>,
}

impl ForumPages {
    pub fn new(client: reqwest::Client, forum: Url) -> Self {
        let start = listing::resolve(&forum, forum.as_str()).unwrap_or_else(|| forum.clone());
        let mut seen = HashSet::new();
        seen.insert(start.to_string());
        Self {
            client,
            forum: start.clone(),
            queue: VecDeque::from([start]),
            seen,
        }
    }

    /// Fetch the next page, or `None` once every discovered page is done.
    pub async fn next_page(&mut self) -> Result<Option<ListingPage>, FetchError> {
        let Some(url) = self.queue.pop_front() else {
            return Ok(None);
        };

        let html = fetch_html(&self.client, &url).await?;
        let page = listing::parse_listing(&html, &url);

        let mut queued = 0;
        for link in &page.page_links {
            if same_forum(&self.forum, link) && self.seen.insert(link.to_string()) {
                self.queue.push_back(link.clone());
                queued += 1;
            }
        }
        info!(
            url = %url,
            threads = page.entries.len(),
            queued,
            "Fetched listing page"
        );

        Ok(Some(page))
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Same host and script, and the same `f` (forum id) parameter.
fn same_forum(forum: &Url, link: &Url) -> bool {
    let forum_id = |u: &Url| {
        u.query_pairs()
            .find(|(k, _)| k == "f")
            .map(|(_, v)| v.into_owned())
    };
    link.host_str() == forum.host_str()
        && link.port_or_known_default() == forum.port_or_known_default()
        && link.path() == forum.path()
        && forum_id(link) == forum_id(forum)
}
