//! The scan pass: companies × keywords × feed entries.
//!
//! Pure functions over explicit inputs. The caller supplies `today` and the
//! detection timestamp, so a scan is reproducible in tests and the whole
//! fetch-match-deduplicate step stays off the network.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::alert::{Alert, EntrySnapshot};
use crate::company::{Company, CompanyId};
use crate::feed::FeedEntry;
use crate::window::{parse_reported_date, RecencyWindow};

/// Returns true when the keyword occurs in the entry's victim, title or
/// domain, ignoring case.
///
/// Keywords are stored lower-case; only the entry side is folded here.
/// Absent and empty fields never match.
#[must_use]
pub fn entry_matches(keyword: &str, entry: &FeedEntry) -> bool {
    [&entry.victim, &entry.title, &entry.domain]
        .iter()
        .any(|field| {
            field
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(keyword))
        })
}

/// Date gate for one entry under a window.
///
/// A bounded window drops entries whose reported date is missing or does
/// not parse. A present date is parsed under any window, so a malformed
/// value gets its warning even when nothing would be dropped; a missing
/// date is normal feed behavior and stays quiet.
fn entry_admitted(entry: &FeedEntry, window: RecencyWindow, today: NaiveDate) -> bool {
    let cutoff = window.cutoff(today);
    let Some(raw) = entry.reported_date_raw() else {
        return cutoff.is_none();
    };
    match parse_reported_date(raw) {
        Ok(reported) => cutoff.map_or(true, |cutoff| reported >= cutoff),
        Err(e) => {
            warn!(error = %e, "entry reported date does not parse; a bounded window drops it");
            cutoff.is_none()
        }
    }
}

/// Runs one scan pass and returns the alerts it creates.
///
/// Every (company, keyword, admitted entry) triple is tested; a match
/// materializes an alert unless its identity triple already exists among
/// `existing` or earlier in this same pass. Entries without a link get a
/// fresh UUID identity per occurrence and are therefore never deduplicated.
#[must_use]
pub fn scan(
    companies: &[Company],
    existing: &[Alert],
    entries: &[FeedEntry],
    window: RecencyWindow,
    today: NaiveDate,
    detected_at: DateTime<Utc>,
) -> Vec<Alert> {
    let mut seen: HashSet<(CompanyId, String, String)> =
        existing.iter().map(Alert::dedup_key).collect();

    let admitted: Vec<&FeedEntry> = entries
        .iter()
        .filter(|entry| entry_admitted(entry, window, today))
        .collect();

    let mut created = Vec::new();
    for company in companies {
        for keyword in &company.keywords {
            for entry in &admitted {
                if !entry_matches(keyword, entry) {
                    continue;
                }

                let entry_id = entry
                    .link
                    .clone()
                    .filter(|link| !link.is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string());

                let key = (company.id, keyword.clone(), entry_id.clone());
                if !seen.insert(key) {
                    continue;
                }

                created.push(Alert::new(
                    company,
                    keyword.as_str(),
                    entry_id,
                    EntrySnapshot::capture(entry),
                    detected_at,
                ));
            }
        }
    }

    debug!(
        entries = entries.len(),
        admitted = admitted.len(),
        created = created.len(),
        "scan pass complete"
    );
    created
}
