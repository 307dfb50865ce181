//! Disclosure feed entries and the client that fetches them.
//!
//! The feed is third-party JSON we do not control, so deserialization is
//! deliberately tolerant: every field optional, unknown fields ignored, and
//! the `claim_gang` field accepted in all the shapes it actually arrives in
//! (absent, the literal `false`, or a group name).

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::FetchError;

/// The recent-disclosures endpoint this tool was built against.
pub const RECENT_DISCLOSURES_URL: &str = "https://api.ransomware.live/v2/recentcyberattacks";

/// Maximum characters of response body carried inside a fetch error.
const BODY_PREVIEW_CHARS: usize = 500;

/// The group claim attached to a feed entry.
///
/// The feed encodes "claim denied" as a literal JSON `false`; anything else
/// that is not a non-empty string carries no usable claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupClaim {
    /// No usable claim: field absent, empty, or some other JSON shape.
    Unknown,
    /// The feed explicitly denied the claim (`false`).
    Denied,
    /// A named claiming group.
    Named(String),
}

impl GroupClaim {
    /// The display label used in alert snapshots.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Unknown => "Unknown".to_string(),
            Self::Denied => "N/A".to_string(),
            Self::Named(name) => name.clone(),
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(false) => Self::Denied,
            Value::String(s) if !s.is_empty() => Self::Named(s.clone()),
            _ => Self::Unknown,
        }
    }
}

impl Default for GroupClaim {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<'de> Deserialize<'de> for GroupClaim {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// One entry of the recent-disclosures feed.
///
/// Fields the matcher and snapshot care about; everything else the feed
/// sends is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEntry {
    /// Victim organization name.
    pub victim: Option<String>,
    /// Entry title.
    pub title: Option<String>,
    /// Victim domain.
    pub domain: Option<String>,
    /// Reported date, nominally `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Group claim in whatever shape the feed sent it.
    #[serde(default)]
    pub claim_gang: GroupClaim,
    /// Source article URL.
    pub url: Option<String>,
    /// The entry's own link, used as its identity when present.
    pub link: Option<String>,
    /// Summary text.
    pub summary: Option<String>,
}

impl FeedEntry {
    /// The raw reported date, treating absent, empty and `"N/A"` as missing.
    #[must_use]
    pub fn reported_date_raw(&self) -> Option<&str> {
        match self.date.as_deref() {
            None | Some("") | Some("N/A") => None,
            Some(raw) => Some(raw),
        }
    }
}

/// Blocking HTTP client for the disclosure feed.
///
/// One GET per fetch, bounded by the configured timeout. No retries; a
/// failed fetch surfaces a [`FetchError`] and the operator tries again.
pub struct FeedClient {
    http: reqwest::blocking::Client,
    url: String,
    timeout_secs: u64,
}

impl FeedClient {
    /// Creates a client for the given endpoint with a request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            url: url.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Fetches the full recent-disclosures list.
    pub fn fetch_recent(&self) -> Result<Vec<FeedEntry>, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.classify(&e))?;

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                body_preview: preview(&body),
            });
        }

        let entries: Vec<FeedEntry> = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "feed body failed to decode");
            FetchError::Decode {
                body_preview: preview(&body),
            }
        })?;

        info!(count = entries.len(), url = %self.url, "fetched recent disclosures");
        Ok(entries)
    }

    fn classify(&self, error: &reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            FetchError::Transport {
                message: error.to_string(),
            }
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
