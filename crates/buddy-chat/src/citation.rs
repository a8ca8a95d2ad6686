//! Citation badges for assistant answers.

use reqwest::Url;
use tracing::debug;

use crate::formatter::escape;

/// A citation URL with its display label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Citation {
    pub url: String,
    pub label: String,
}

impl Citation {
    /// Build a badge for `source`, or `None` if it is not an absolute URL
    /// with a host.
    pub fn parse(source: &str) -> Option<Self> {
        Some(Self {
            url: source.to_string(),
            label: badge_label(source)?,
        })
    }

    /// Anchor markup for the badge.
    pub fn to_html(&self) -> String {
        format!(
            "<a href=\"{}\" target=\"_blank\" class=\"source-badge\">{}</a>",
            escape(&self.url),
            escape(&self.label)
        )
    }
}

/// Badge label for a URL: its host, leading `www.` stripped, uppercased.
pub fn badge_label(source: &str) -> Option<String> {
    let url = Url::parse(source).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some(host.to_uppercase())
}

/// Badges for every source that parses; the rest are dropped.
pub fn citation_badges(sources: &[String]) -> Vec<Citation> {
    sources
        .iter()
        .filter_map(|source| {
            let citation = Citation::parse(source);
            if citation.is_none() {
                debug!(source = %source, "Skipping invalid source URL");
            }
            citation
        })
        .collect()
}
