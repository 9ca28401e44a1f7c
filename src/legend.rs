use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

/// Legend block in the reference post: "Status tags:" up to the closing div.
static LEGEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)Status tags:(.*?)</div>").unwrap());
static COLOR_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|;)\s*color\s*:\s*([^;]+)").unwrap());
static COLORED_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[style*='color']").unwrap());

pub const DEFAULT_FALLBACK: &str = "red";

const DEFAULT_COLORS: &[(&str, &str)] = &[
    ("OUTSTANDING", "red"),
    ("PENDING LEGAL", "chocolate"),
    ("WARRANT FILED", "darkblue"),
    ("ARREST", "crimson"),
    ("ON-GOING", "blue"),
    ("FOLLOW-UP", "teal"),
    ("SEIZED", "saddlebrown"),
    ("TO AUCTION", "gold"),
    ("IN AUCTION", "orange"),
    ("SERVED", "green"),
    ("UNABLE TO SERVE", "purple"),
    ("CLOSED", "gray"),
];

/// Status label (uppercased) to BBCode colour.
#[derive(Debug, Clone)]
pub struct StatusColors {
    colors: BTreeMap<String, String>,
    fallback: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self::with_fallback(DEFAULT_FALLBACK)
    }
}

impl StatusColors {
    /// Built-in table.
    pub fn with_fallback(fallback: &str) -> Self {
        let colors = DEFAULT_COLORS
            .iter()
            .map(|(s, c)| (s.to_string(), c.to_string()))
            .collect();
        Self {
            colors,
            fallback: fallback.to_string(),
        }
    }

    /// Read the "Status tags:" legend out of a reference page. Falls back to
    /// the built-in table when the legend is missing or has no coloured tags.
    pub fn from_legend_html(html: &str, fallback: &str) -> Self {
        match parse_legend(html) {
            Some(colors) => {
                info!("Loaded {} status colours from legend", colors.len());
                Self {
                    colors,
                    fallback: fallback.to_string(),
                }
            }
            None => {
                debug!("No status legend found, using built-in colours");
                Self::with_fallback(fallback)
            }
        }
    }

    pub fn color_for(&self, status: &str) -> &str {
        self.colors
            .get(&status.trim().to_uppercase())
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }
}

fn parse_legend(html: &str) -> Option<BTreeMap<String, String>> {
    let block = LEGEND_RE.captures(html)?.get(1)?.as_str();
    let fragment = Html::parse_fragment(block);

    let colors: BTreeMap<String, String> = fragment
        .select(&COLORED_SPAN)
        .filter_map(|span| {
            let style = span.value().attr("style")?;
            let color = COLOR_DECL_RE.captures(style)?[1].trim().to_string();
            let label = span.text().collect::<String>().trim().to_uppercase();
            if label.is_empty() || color.is_empty() {
                None
            } else {
                Some((label, color))
            }
        })
        .collect();

    if colors.is_empty() {
        None
    } else {
        Some(colors)
    }
}
