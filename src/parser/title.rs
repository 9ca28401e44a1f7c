use std::sync::LazyLock;

use regex::Regex;

static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());
static DOCKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[A-Z]{2,}-\d{5}(?:/[A-Z]{2,}-\d{5})*|\d{2}[A-Z]{4}\d{5})$").unwrap()
});
static FSW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^financial(?: services?)? warrant$").unwrap());

/// Canonical label for every spelling of a financial services warrant.
pub const FSW: &str = "FSW";

/// Fields pulled out of a thread title, before validity is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub docket: Option<String>,
    pub statuses: Vec<String>,
    pub kind: Option<String>,
    pub subject: Option<String>,
}

impl TitleParts {
    /// A title is worth a row if it names a case, a subject, or a status.
    pub fn is_meaningful(&self) -> bool {
        self.docket.is_some() || self.subject.is_some() || !self.statuses.is_empty()
    }
}

pub fn parse_title(title: &str) -> TitleParts {
    let mut groups = bracket_groups(title);

    // Only the first group can be a docket; everything else is a status.
    let docket = if groups.first().is_some_and(|g| is_docket(g)) {
        Some(groups.remove(0))
    } else {
        None
    };

    let remainder = BRACKET_RE.replace_all(title, "");
    let (kind, subject) = split_kind_subject(remainder.trim());

    TitleParts {
        docket,
        statuses: groups,
        kind: kind.map(|k| normalize_kind(&k)),
        subject,
    }
}

/// All `[...]` groups, left to right, trimmed.
pub fn bracket_groups(title: &str) -> Vec<String> {
    BRACKET_RE
        .captures_iter(title)
        .map(|c| c[1].trim().to_string())
        .collect()
}

pub fn is_docket(group: &str) -> bool {
    DOCKET_RE.is_match(group)
}

/// "Type - Subject": everything before the last hyphen is the type. Once a
/// hyphen is present both sides are kept, even when blank.
fn split_kind_subject(remainder: &str) -> (Option<String>, Option<String>) {
    if remainder.is_empty() {
        return (None, None);
    }
    let (kind, subject) = match remainder.rsplit_once('-') {
        Some((head, last)) => (head.trim(), Some(last.trim().to_string())),
        None => (remainder, None),
    };
    let kind = kind.trim_start_matches(|c: char| c == '-' || c.is_whitespace());
    (Some(kind.to_string()), subject)
}

fn normalize_kind(kind: &str) -> String {
    if FSW_RE.is_match(kind) {
        FSW.to_string()
    } else {
        kind.to_string()
    }
}
