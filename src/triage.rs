//! Alert triage: status transitions, selection and the review view.
//!
//! The board owns the alert collection plus the transient selection map the
//! review flow uses for bulk actions. Selection is never persisted; it
//! exists for one session and is pruned whenever alerts disappear.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::alert::{Alert, AlertId, AlertStatus};
use crate::company::CompanyId;
use crate::error::ValidationError;
use crate::window::{parse_reported_date, RecencyWindow};

/// Filter for the review view. Every field is optional; the default keeps
/// everything.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// Keep only alerts whose recorded company name equals this exactly.
    /// Alerts detected before a rename keep the old name and will not match
    /// the new one.
    pub company_name: Option<String>,
    /// Keep only alerts with exactly this status.
    pub status: Option<AlertStatus>,
    /// Recency window over the snapshot's reported date.
    pub window: RecencyWindow,
}

/// The alert collection and its transient review state.
#[derive(Debug, Default)]
pub struct TriageBoard {
    alerts: Vec<Alert>,
    selection: HashMap<AlertId, bool>,
}

impl TriageBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-loaded alert collection.
    #[must_use]
    pub fn from_alerts(alerts: Vec<Alert>) -> Self {
        Self {
            alerts,
            selection: HashMap::new(),
        }
    }

    /// All alerts in detection order.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Number of alerts on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Returns true when the board holds no alerts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Looks up an alert by id.
    #[must_use]
    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Appends freshly scanned alerts.
    pub fn append(&mut self, new_alerts: Vec<Alert>) {
        self.alerts.extend(new_alerts);
    }

    /// Sets the status of one alert.
    pub fn set_status(&mut self, id: AlertId, status: AlertStatus) -> Result<(), ValidationError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ValidationError::AlertNotFound { id })?;
        alert.status = status;
        Ok(())
    }

    /// Sets the status of every listed alert that exists.
    ///
    /// Ids with no matching alert are silently ignored; the return value is
    /// how many alerts actually changed status.
    pub fn bulk_set_status(&mut self, ids: &[AlertId], status: &AlertStatus) -> usize {
        let mut updated = 0;
        for alert in &mut self.alerts {
            if ids.contains(&alert.id) {
                alert.status = status.clone();
                updated += 1;
            }
        }
        updated
    }

    /// Deletes one alert and its selection entry.
    pub fn delete(&mut self, id: AlertId) -> Result<(), ValidationError> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or(ValidationError::AlertNotFound { id })?;
        self.alerts.remove(index);
        self.selection.remove(&id);
        Ok(())
    }

    /// Drops every alert belonging to a company, pruning selection entries.
    ///
    /// Returns how many alerts were removed. This is the cascade target for
    /// company removal.
    pub fn remove_company_alerts(&mut self, company_id: CompanyId) -> usize {
        let before = self.alerts.len();
        let mut dropped = Vec::new();
        self.alerts.retain(|a| {
            if a.company_id == company_id {
                dropped.push(a.id);
                false
            } else {
                true
            }
        });
        for id in dropped {
            self.selection.remove(&id);
        }
        before - self.alerts.len()
    }

    /// Marks an alert selected or not. Unknown ids are ignored.
    pub fn set_selected(&mut self, id: AlertId, selected: bool) {
        if self.get(id).is_some() {
            self.selection.insert(id, selected);
        }
    }

    /// Clears the selection mark of the listed alerts.
    ///
    /// Ids that were never selected stay untracked; the map only ever
    /// holds entries for alerts that exist.
    pub fn deselect(&mut self, ids: &[AlertId]) {
        for id in ids {
            if let Some(mark) = self.selection.get_mut(id) {
                *mark = false;
            }
        }
    }

    /// Currently selected alert ids, in board order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<AlertId> {
        self.alerts
            .iter()
            .filter(|a| self.selection.get(&a.id).copied().unwrap_or(false))
            .map(|a| a.id)
            .collect()
    }

    /// The review view: filtered, then sorted by status rank with ties
    /// broken by detection time, newest first.
    #[must_use]
    pub fn view(&self, filter: &AlertFilter, today: NaiveDate) -> Vec<&Alert> {
        let cutoff = filter.window.cutoff(today);
        let mut rows: Vec<&Alert> = self
            .alerts
            .iter()
            .filter(|a| {
                filter
                    .company_name
                    .as_deref()
                    .map_or(true, |name| a.company_name == name)
            })
            .filter(|a| filter.status.as_ref().map_or(true, |s| a.status == *s))
            .filter(|a| reported_within(a, cutoff))
            .collect();

        rows.sort_by(|a, b| {
            a.status
                .sort_rank()
                .cmp(&b.status.sort_rank())
                .then_with(|| b.detected_at.cmp(&a.detected_at))
        });
        rows
    }
}

/// Window gate over the snapshot's reported date.
///
/// Unlike the scan path this stays silent on unparseable dates; the view
/// runs constantly and would repeat the same warning forever.
fn reported_within(alert: &Alert, cutoff: Option<NaiveDate>) -> bool {
    let Some(cutoff) = cutoff else {
        return true;
    };
    let raw = alert.snapshot.reported_date.as_str();
    if raw.is_empty() || raw == "N/A" {
        return false;
    }
    parse_reported_date(raw).map_or(false, |reported| reported >= cutoff)
}
