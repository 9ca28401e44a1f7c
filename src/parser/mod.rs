pub mod title;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::model::{RawEntry, ThreadRecord};

/// Turn one listing row into a record, or drop it if the title carries no
/// docket, subject, or status.
pub fn process_entry(entry: &RawEntry) -> Option<ThreadRecord> {
    let parts = title::parse_title(&entry.title);
    if !parts.is_meaningful() {
        debug!(title = %entry.title, "Skipping thread with no case fields");
        return None;
    }

    let posted_at = entry.posted_iso.as_deref().and_then(parse_timestamp);

    Some(ThreadRecord {
        docket: parts.docket,
        subject: parts.subject,
        kind: parts.kind,
        statuses: parts.statuses,
        posted_date: posted_at.as_ref().map(format_date),
        posted_iso: entry.posted_iso.clone(),
        posted_at,
        author: entry.author.clone(),
        url: entry.url.clone(),
    })
}

/// Lenient ISO-8601: RFC 3339 first, then a naive timestamp taken as UTC.
pub fn parse_timestamp(iso: &str) -> Option<DateTime<FixedOffset>> {
    let iso = iso.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(dt);
    }
    let naive = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S").ok().or_else(|| {
        NaiveDate::parse_from_str(iso, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    });
    if naive.is_none() {
        debug!(value = %iso, "Unparseable thread timestamp");
    }
    naive.map(|n| n.and_utc().fixed_offset())
}

/// "05 Mar 2024", in UTC.
pub fn format_date(dt: &DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc).format("%d %b %Y").to_string()
}
