use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Canonical tweet identifier: a non-empty string of decimal digits.
/// Every outbound fetch request is keyed by one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetId(String);

impl TweetId {
    /// Build an identifier from text the user typed directly.
    /// Rejects anything that is not all decimal digits.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(raw))
        } else {
            Err(anyhow!("tweet id must be decimal digits, got {:?}", raw))
        }
    }

    /// Build an identifier from a URL path segment. The segment is taken
    /// as-is (no digit check) but must be non-empty, so a URL ending in a
    /// bare `/` never produces an empty identifier.
    pub fn from_url_segment(segment: &str) -> Option<Self> {
        if segment.is_empty() {
            None
        } else {
            Some(Self(segment.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single tweet's structured data as the fetch API returns it.
/// Field names follow the wire schema; unknown fields (e.g. `media`)
/// are ignored on deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub text: String,
    pub public_metrics: PublicMetrics,
    pub author: Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMetrics {
    pub retweet_count: u64,
    pub like_count: u64,
    pub reply_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub username: String,
    pub verified: bool,
    #[serde(rename = "profileImageURI", default, skip_serializing_if = "Option::is_none")]
    pub profile_image_uri: Option<String>,
}

/// Format an engagement count the way the web card does: counts above
/// a thousand collapse to one decimal with a K suffix.
pub fn format_count(count: u64) -> String {
    if count > 1000 {
        format!("{:.1}K", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}
