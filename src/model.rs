use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// One thread row as it appears in the forum listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub url: String,
    pub posted_iso: Option<String>,
    pub author: Option<String>,
}

/// Structured case metadata derived from a thread title.
///
/// `None` fields render as `N/A`.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadRecord {
    pub docket: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub statuses: Vec<String>,
    pub posted_date: Option<String>,
    pub posted_iso: Option<String>,
    #[serde(skip)]
    pub posted_at: Option<DateTime<FixedOffset>>,
    pub author: Option<String>,
    pub url: String,
}
