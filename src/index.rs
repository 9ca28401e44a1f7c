use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::debug;

use crate::error::SpliceError;
use crate::legend::StatusColors;
use crate::listing::ListingPage;
use crate::model::ThreadRecord;
use crate::parser;

pub const TABLE_OPEN: &str = "[table=left,0,0,auto]";
pub const TABLE_CLOSE: &str = "[/table]";
pub const COLUMNS: [&str; 7] = [
    "Docket No.",
    "Subject",
    "Type(s)",
    "Current Status",
    "Date Created",
    "Last Updated",
    "Assigned Deputy",
];
const NA: &str = "N/A";

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[table=left,0,0,auto\][\s\S]*?\[/table\]").unwrap());

/// Rendered master index.
#[derive(Debug, Clone)]
pub struct MasterIndex {
    pub bbcode: String,
    pub count: usize,
}

/// Accumulates records page by page, in listing order.
#[derive(Debug, Default)]
pub struct Collector {
    records: Vec<ThreadRecord>,
    pages: usize,
    seen: usize,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&mut self, page: &ListingPage) {
        let before = self.records.len();
        self.pages += 1;
        self.seen += page.entries.len();
        self.records
            .extend(page.entries.iter().filter_map(parser::process_entry));
        debug!(
            url = %page.url,
            threads = page.entries.len(),
            kept = self.records.len() - before,
            "Collected listing page"
        );
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Listing rows looked at, kept or not.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Records sorted newest first.
    pub fn finish(self) -> Vec<ThreadRecord> {
        let mut records = self.records;
        sort_records(&mut records);
        records
    }
}

/// Newest first. Missing timestamps sort last; ties keep input order.
pub fn sort_records(records: &mut [ThreadRecord]) {
    records.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
}

/// BBCode table, one row per record in the given order.
pub fn render(records: &[ThreadRecord], colors: &StatusColors) -> MasterIndex {
    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(header());
    lines.extend(records.iter().map(|r| render_row(r, colors)));
    lines.push(TABLE_CLOSE.to_string());

    MasterIndex {
        bbcode: lines.join("\n"),
        count: records.len(),
    }
}

fn header() -> String {
    let cells: String = COLUMNS
        .iter()
        .map(|c| format!("[td][b]{}[/b][/td]", c))
        .collect();
    format!("{}\n[tr]{}[/tr]", TABLE_OPEN, cells)
}

fn render_row(r: &ThreadRecord, colors: &StatusColors) -> String {
    let statuses = r
        .statuses
        .iter()
        .map(|s| format!("[color={}][b]{}[/b][/color]", colors.color_for(s), s))
        .collect::<Vec<_>>()
        .join(", ");
    let date = or_na(&r.posted_date);

    let cells = [
        format!("[url={}]{}[/url]", r.url, or_na(&r.docket)),
        or_na(&r.subject).to_string(),
        or_na(&r.kind).to_string(),
        statuses,
        date.to_string(),
        date.to_string(),
        or_na(&r.author).to_string(),
    ];
    let cells: String = cells.iter().map(|c| format!("[td]{}[/td]", c)).collect();
    format!("[tr]{}[/tr]", cells)
}

fn or_na(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(NA)
}

/// Replace the first generated table in a post body with `table`.
pub fn splice(post: &str, table: &str) -> Result<String, SpliceError> {
    if !TABLE_RE.is_match(post) {
        return Err(SpliceError::TableNotFound);
    }
    Ok(TABLE_RE.replace(post, NoExpand(table)).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawEntry;
    use url::Url;

    fn record(title: &str, posted: Option<&str>) -> ThreadRecord {
        parser::process_entry(&RawEntry {
            title: title.to_string(),
            url: "https://lssd.gta.world/viewtopic.php?t=1".to_string(),
            posted_iso: posted.map(str::to_string),
            author: None,
        })
        .unwrap()
    }

    fn header_line() -> String {
        let cells: Vec<String> = COLUMNS.iter().map(|c| format!("[td][b]{}[/b][/td]", c)).collect();
        format!("[tr]{}[/tr]", cells.join(""))
    }

    #[test]
    fn newest_first_missing_last_stable() {
        let mut records = vec![
            record("[A] first null - x", None),
            record("[B] january - x", Some("2024-01-01T00:00:00Z")),
            record("[C] second null - x", None),
            record("[D] june - x", Some("2024-06-01T00:00:00Z")),
        ];
        sort_records(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.statuses[0].as_str()).collect();
        assert_eq!(order, vec!["D", "B", "A", "C"]);
    }

    #[test]
    fn unparseable_timestamp_sorts_with_missing() {
        let mut records = vec![
            record("[A] bad - x", Some("not a date")),
            record("[B] ok - x", Some("2020-01-01T00:00:00Z")),
            record("[C] none - x", None),
        ];
        sort_records(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.statuses[0].as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn equal_timestamps_keep_order() {
        let ts = Some("2024-02-02T00:00:00Z");
        let mut records = vec![record("[A] x - y", ts), record("[B] x - y", ts)];
        sort_records(&mut records);
        assert_eq!(records[0].statuses[0], "A");
        assert_eq!(records[1].statuses[0], "B");
    }

    #[test]
    fn empty_table_has_header_and_footer() {
        let idx = render(&[], &StatusColors::default());
        assert_eq!(idx.count, 0);
        assert_eq!(
            idx.bbcode,
            format!("{}\n{}\n{}", TABLE_OPEN, header_line(), TABLE_CLOSE)
        );
    }

    #[test]
    fn header_labels_in_order() {
        let records = vec![record("[AB-12345] [SERVED] Warrant - John Doe", None)];
        let idx = render(&records, &StatusColors::default());
        let second = idx.bbcode.lines().nth(1).unwrap();
        assert_eq!(second, header_line());
        let mut pos = 0;
        for col in COLUMNS {
            let at = second[pos..].find(col).unwrap();
            pos += at + col.len();
        }
    }

    #[test]
    fn row_markup() {
        let mut r = record(
            "[AB-12345] [OUTSTANDING] [Warrant Filed] Warrant - John Doe",
            Some("2024-03-05T10:00:00+00:00"),
        );
        r.author = Some("Jane Deputy".to_string());
        let idx = render(&[r], &StatusColors::default());
        let row = idx.bbcode.lines().nth(2).unwrap();
        assert_eq!(
            row,
            "[tr][td][url=https://lssd.gta.world/viewtopic.php?t=1]AB-12345[/url][/td]\
             [td]John Doe[/td][td]Warrant[/td]\
             [td][color=red][b]OUTSTANDING[/b][/color], [color=darkblue][b]Warrant Filed[/b][/color][/td]\
             [td]05 Mar 2024[/td][td]05 Mar 2024[/td][td]Jane Deputy[/td][/tr]"
        );
        assert_eq!(idx.count, 1);
    }

    #[test]
    fn missing_fields_render_na() {
        let r = record("[OUTSTANDING] Notice", None);
        let idx = render(&[r], &StatusColors::default());
        let row = idx.bbcode.lines().nth(2).unwrap();
        assert!(row.starts_with("[tr][td][url=https://lssd.gta.world/viewtopic.php?t=1]N/A[/url][/td][td]N/A[/td][td]Notice[/td]"));
        assert!(row.ends_with("[td]N/A[/td][td]N/A[/td][td]N/A[/td][/tr]"));
    }

    #[test]
    fn unknown_status_fallback_color() {
        let r = record("[AB-12345] [Mystery] Warrant - X", None);
        let idx = render(&[r], &StatusColors::with_fallback("black"));
        assert!(idx.bbcode.contains("[color=black][b]Mystery[/b][/color]"));
    }

    #[test]
    fn record_without_statuses_has_empty_status_cell() {
        let r = record("[AB-12345] Warrant - X", None);
        let idx = render(&[r], &StatusColors::default());
        assert!(idx.bbcode.contains("[td]Warrant[/td][td][/td][td]N/A[/td]"));
    }

    #[test]
    fn collector_over_fixture_pages() {
        let base = Url::parse("https://lssd.gta.world/viewforum.php?f=1026").unwrap();
        let p1 = std::fs::read_to_string("tests/fixtures/forum_page1.html").unwrap();
        let p2 = std::fs::read_to_string("tests/fixtures/forum_page2.html").unwrap();

        let mut c = Collector::new();
        c.push_page(&crate::listing::parse_listing(&p1, &base));
        c.push_page(&crate::listing::parse_listing(&p2, &base));
        assert_eq!(c.pages(), 2);
        assert_eq!(c.seen(), 6);

        let records = c.finish();
        let dockets: Vec<Option<&str>> = records.iter().map(|r| r.docket.as_deref()).collect();
        // "Posting Guidelines" carries no case fields; the rest sort newest first.
        assert_eq!(
            dockets,
            vec![None, Some("AB-12345"), None, Some("24LSSD00042"), Some("CD-54321")]
        );
        assert_eq!(records[0].kind.as_deref(), Some("FSW"));
        assert_eq!(records[2].kind.as_deref(), Some("Off"));
        assert_eq!(records[2].subject.as_deref(), Some("topic chatter"));
        assert_eq!(records[3].statuses, vec!["PENDING LEGAL", "Custom Tag"]);
        assert_eq!(records[4].posted_date, None);
    }

    #[test]
    fn blank_title_segments_render_empty_cells() {
        let r = record("Warrant -", None);
        let idx = render(&[r], &StatusColors::default());
        assert!(idx.bbcode.contains("[/url][/td][td][/td][td]Warrant[/td][td][/td]"));

        let r = record("[OUTSTANDING] - Jane", None);
        let idx = render(&[r], &StatusColors::default());
        assert!(idx.bbcode.contains("[td]Jane[/td][td][/td][td][color=red]"));
    }

    #[test]
    fn splice_replaces_first_table_only() {
        let post = "Intro\n[table=left,0,0,auto]\nold\nrows\n[/table]\nOutro\n[table=left,0,0,auto]\nkeep\n[/table]";
        let out = splice(post, "[table=left,0,0,auto]\nnew $1\n[/table]").unwrap();
        assert_eq!(
            out,
            "Intro\n[table=left,0,0,auto]\nnew $1\n[/table]\nOutro\n[table=left,0,0,auto]\nkeep\n[/table]"
        );
    }

    #[test]
    fn splice_without_table() {
        let err = splice("no table here", "[table=left,0,0,auto][/table]").unwrap_err();
        assert!(matches!(err, SpliceError::TableNotFound));
    }
}
