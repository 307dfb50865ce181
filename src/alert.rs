//! Alert records for matched disclosures.
//!
//! Alerts are explicit triage objects, not log lines. When a keyword matches
//! a feed entry, we materialize an Alert that snapshots the entry as it
//! looked at detection time and then tracks triage from Open onward. The
//! snapshot never changes afterwards, even if the feed rewrites history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::company::{Company, CompanyId};
use crate::error::ValidationError;
use crate::feed::FeedEntry;

/// Unique identifier for an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(Uuid);

impl AlertId {
    /// Creates a new random alert ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an alert ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Triage status of an alert.
///
/// Serialized with the exact strings older data files use (`"Open"`,
/// `"In Progress"`, `"Complete"`, `"False Positive"`). Any other literal
/// found in a data file is preserved as [`AlertStatus::Other`]: it sorts
/// last, never matches a defined status filter, and round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertStatus {
    /// Newly created, nobody has looked at it yet.
    Open,
    /// Somebody is working the alert.
    InProgress,
    /// Triage finished, disclosure confirmed relevant.
    Complete,
    /// Triage finished, match was noise.
    FalsePositive,
    /// A status literal this version does not define.
    Other(String),
}

impl AlertStatus {
    /// Sort rank for triage views: Open first, unknown literals last.
    #[must_use]
    pub fn sort_rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::InProgress => 1,
            Self::Complete => 2,
            Self::FalsePositive => 3,
            Self::Other(_) => 99,
        }
    }

    /// The four statuses operator input may name.
    pub const DEFINED: [Self; 4] = [
        Self::Open,
        Self::InProgress,
        Self::Complete,
        Self::FalsePositive,
    ];
}

impl Default for AlertStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl From<String> for AlertStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Open" => Self::Open,
            "In Progress" => Self::InProgress,
            "Complete" => Self::Complete,
            "False Positive" => Self::FalsePositive,
            _ => Self::Other(value),
        }
    }
}

impl From<AlertStatus> for String {
    fn from(value: AlertStatus) -> Self {
        match value {
            AlertStatus::Open => "Open".to_string(),
            AlertStatus::InProgress => "In Progress".to_string(),
            AlertStatus::Complete => "Complete".to_string(),
            AlertStatus::FalsePositive => "False Positive".to_string(),
            AlertStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Complete => write!(f, "Complete"),
            Self::FalsePositive => write!(f, "False Positive"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

impl FromStr for AlertStatus {
    type Err = ValidationError;

    /// Parses operator input: case-insensitive, hyphens count as spaces.
    /// Only the four defined statuses are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_lowercase().replace('-', " ");
        match folded.as_str() {
            "open" => Ok(Self::Open),
            "in progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            "false positive" => Ok(Self::FalsePositive),
            _ => Err(ValidationError::UnknownStatus { raw: s.to_string() }),
        }
    }
}

/// Immutable capture of a feed entry at detection time.
///
/// Absent feed fields become `"N/A"` so the record renders without holes;
/// a field that was present but empty stays empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySnapshot {
    /// Victim organization as reported by the feed.
    pub victim: String,
    /// Entry title.
    pub title: String,
    /// Victim domain.
    pub domain: String,
    /// Best display label: victim, else title, else `"N/A"`.
    pub display_name: String,
    /// Raw reported date string as it appeared in the feed.
    pub reported_date: String,
    /// Claiming group: `"N/A"` when the claim was denied, `"Unknown"` when
    /// the feed carried no usable claim, otherwise the group name.
    pub group: String,
    /// Source article URL.
    pub source_url: String,
    /// The feed entry's own link.
    pub feed_link: String,
    /// Entry summary text.
    pub summary: String,
}

impl EntrySnapshot {
    /// Captures a feed entry into an immutable snapshot.
    #[must_use]
    pub fn capture(entry: &FeedEntry) -> Self {
        Self {
            victim: fill(entry.victim.as_ref()),
            title: fill(entry.title.as_ref()),
            domain: fill(entry.domain.as_ref()),
            display_name: entry
                .victim
                .as_deref()
                .filter(|v| !v.is_empty())
                .or_else(|| entry.title.as_deref().filter(|t| !t.is_empty()))
                .unwrap_or("N/A")
                .to_string(),
            reported_date: fill(entry.date.as_ref()),
            group: entry.claim_gang.label(),
            source_url: fill(entry.url.as_ref()),
            feed_link: fill(entry.link.as_ref()),
            summary: fill(entry.summary.as_ref()),
        }
    }
}

fn fill(field: Option<&String>) -> String {
    field.map_or_else(|| "N/A".to_string(), Clone::clone)
}

/// A keyword match against one feed entry for one company.
///
/// Created only by the scan pipeline. The identity triple
/// `(company_id, matched_keyword, entry_id)` is unique across the whole
/// alert collection; the pipeline enforces that before constructing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier for this alert.
    pub id: AlertId,

    /// The company whose keyword matched. Dangling after a cascade delete
    /// never happens; removal drops the company's alerts with it.
    pub company_id: CompanyId,

    /// Company name at detection time. Not updated on rename.
    pub company_name: String,

    /// The normalized keyword that matched.
    pub matched_keyword: String,

    /// Feed identity used for deduplication: the entry's link when it has
    /// one, otherwise a freshly generated UUID string.
    pub entry_id: String,

    /// What the feed entry looked like when the match fired.
    pub snapshot: EntrySnapshot,

    /// Current triage status.
    pub status: AlertStatus,

    /// When the match was detected.
    pub detected_at: DateTime<Utc>,
}

impl Alert {
    /// Creates a new Open alert for a company/keyword/entry match.
    #[must_use]
    pub fn new(
        company: &Company,
        matched_keyword: impl Into<String>,
        entry_id: impl Into<String>,
        snapshot: EntrySnapshot,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            company_id: company.id,
            company_name: company.name.clone(),
            matched_keyword: matched_keyword.into(),
            entry_id: entry_id.into(),
            snapshot,
            status: AlertStatus::Open,
            detected_at,
        }
    }

    /// The identity triple that blocks duplicate alerts.
    #[must_use]
    pub fn dedup_key(&self) -> (CompanyId, String, String) {
        (
            self.company_id,
            self.matched_keyword.clone(),
            self.entry_id.clone(),
        )
    }

    /// Returns true if the alert is still Open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == AlertStatus::Open
    }
}

impl PartialEq for Alert {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Alert {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::GroupClaim;

    fn sample_company() -> Company {
        Company::new("Acme Corp", "", vec!["acme".to_string()])
    }

    fn sample_entry() -> FeedEntry {
        FeedEntry {
            victim: Some("Acme Corp".to_string()),
            title: Some("Acme Corp breached".to_string()),
            domain: Some("acme.example".to_string()),
            date: Some("2026-08-01".to_string()),
            claim_gang: GroupClaim::Named("darkrift".to_string()),
            url: Some("https://news.example/acme".to_string()),
            link: Some("https://feed.example/entry/1".to_string()),
            summary: Some("Claimed by darkrift.".to_string()),
        }
    }

    #[test]
    fn test_alert_id_creation() {
        let id1 = AlertId::new();
        let id2 = AlertId::new();
        assert_ne!(id1, id2);
        assert!(format!("{id1}").contains('-'));
    }

    #[test]
    fn test_status_wire_strings() {
        let json = serde_json::to_value(AlertStatus::InProgress).unwrap();
        assert_eq!(json, serde_json::Value::String("In Progress".to_string()));

        let parsed: AlertStatus = serde_json::from_str("\"False Positive\"").unwrap();
        assert_eq!(parsed, AlertStatus::FalsePositive);
    }

    #[test]
    fn test_status_unknown_literal_roundtrips() {
        let parsed: AlertStatus = serde_json::from_str("\"Escalated\"").unwrap();
        assert_eq!(parsed, AlertStatus::Other("Escalated".to_string()));

        let back = serde_json::to_string(&parsed).unwrap();
        assert_eq!(back, "\"Escalated\"");
    }

    #[test]
    fn test_status_from_str_operator_input() {
        assert_eq!("open".parse::<AlertStatus>().unwrap(), AlertStatus::Open);
        assert_eq!(
            "in-progress".parse::<AlertStatus>().unwrap(),
            AlertStatus::InProgress
        );
        assert_eq!(
            " False Positive ".parse::<AlertStatus>().unwrap(),
            AlertStatus::FalsePositive
        );
        assert!("escalated".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_status_sort_rank_order() {
        let ranks: Vec<u8> = AlertStatus::DEFINED.iter().map(AlertStatus::sort_rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert_eq!(AlertStatus::Other("x".to_string()).sort_rank(), 99);
    }

    #[test]
    fn test_snapshot_captures_fields() {
        let snapshot = EntrySnapshot::capture(&sample_entry());
        assert_eq!(snapshot.victim, "Acme Corp");
        assert_eq!(snapshot.display_name, "Acme Corp");
        assert_eq!(snapshot.group, "darkrift");
        assert_eq!(snapshot.reported_date, "2026-08-01");
    }

    #[test]
    fn test_snapshot_fills_absent_fields() {
        let entry = FeedEntry {
            victim: None,
            title: Some("Unattributed breach".to_string()),
            claim_gang: GroupClaim::Unknown,
            ..FeedEntry::default()
        };
        let snapshot = EntrySnapshot::capture(&entry);
        assert_eq!(snapshot.victim, "N/A");
        assert_eq!(snapshot.display_name, "Unattributed breach");
        assert_eq!(snapshot.group, "Unknown");
        assert_eq!(snapshot.domain, "N/A");
        assert_eq!(snapshot.feed_link, "N/A");
    }

    #[test]
    fn test_snapshot_denied_claim() {
        let entry = FeedEntry {
            claim_gang: GroupClaim::Denied,
            ..FeedEntry::default()
        };
        let snapshot = EntrySnapshot::capture(&entry);
        assert_eq!(snapshot.group, "N/A");
        assert_eq!(snapshot.display_name, "N/A");
    }

    #[test]
    fn test_snapshot_keeps_present_empty_fields() {
        let entry = FeedEntry {
            victim: Some(String::new()),
            title: Some("t".to_string()),
            ..FeedEntry::default()
        };
        let snapshot = EntrySnapshot::capture(&entry);
        assert_eq!(snapshot.victim, "");
        // Empty victim falls through to the title for display.
        assert_eq!(snapshot.display_name, "t");
    }

    #[test]
    fn test_alert_new_denormalizes_company() {
        let company = sample_company();
        let alert = Alert::new(
            &company,
            "acme",
            "https://feed.example/entry/1",
            EntrySnapshot::capture(&sample_entry()),
            Utc::now(),
        );
        assert_eq!(alert.company_id, company.id);
        assert_eq!(alert.company_name, "Acme Corp");
        assert!(alert.is_open());
    }

    #[test]
    fn test_alert_dedup_key() {
        let company = sample_company();
        let alert = Alert::new(
            &company,
            "acme",
            "L1",
            EntrySnapshot::capture(&sample_entry()),
            Utc::now(),
        );
        let (cid, keyword, entry) = alert.dedup_key();
        assert_eq!(cid, company.id);
        assert_eq!(keyword, "acme");
        assert_eq!(entry, "L1");
    }

    #[test]
    fn test_alert_serialization() {
        let company = sample_company();
        let alert = Alert::new(
            &company,
            "acme",
            "L1",
            EntrySnapshot::capture(&sample_entry()),
            Utc::now(),
        );
        let json = serde_json::to_string(&alert).unwrap();
        let decoded: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, alert);
        assert_eq!(decoded.status, AlertStatus::Open);
    }
}
