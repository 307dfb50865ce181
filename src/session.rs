//! The operator session: configuration, state and write-through persistence.
//!
//! A session owns everything the tool works with: the config, the JSON
//! store, the feed client, the company registry and the triage board. Every
//! mutation applies in memory first and persists the affected collection
//! right after. When a save fails the in-memory change is kept and the
//! error surfaces; the next successful save writes it out.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::alert::{Alert, AlertId, AlertStatus};
use crate::company::{Company, CompanyId};
use crate::error::{ValidationError, WatchError, WatchResult};
use crate::feed::{FeedClient, FeedEntry, RECENT_DISCLOSURES_URL};
use crate::pipeline;
use crate::registry::CompanyRegistry;
use crate::storage::{JsonFileStore, ALERTS_FILE, COMPANIES_FILE};
use crate::triage::{AlertFilter, TriageBoard};
use crate::window::RecencyWindow;

/// Configuration for a watch session.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Recent-disclosures endpoint.
    pub feed_url: String,
    /// Hard timeout for one feed request.
    pub fetch_timeout: Duration,
    /// Directory holding `companies.json` and `alerts.json`.
    pub data_dir: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            feed_url: RECENT_DISCLOSURES_URL.to_string(),
            fetch_timeout: Duration::from_secs(60),
            data_dir: PathBuf::from("."),
        }
    }
}

impl WatchConfig {
    /// Checks the configuration before a session opens with it.
    pub fn validate(self) -> Result<Self, WatchError> {
        if self.feed_url.trim().is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "feed_url must not be empty".to_string(),
            }
            .into());
        }
        if self.fetch_timeout.is_zero() {
            return Err(ValidationError::InvalidConfig {
                reason: "fetch_timeout must be positive".to_string(),
            }
            .into());
        }
        Ok(self)
    }
}

/// Outcome counts of one feed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Entries the feed returned.
    pub entries_fetched: usize,
    /// Alerts this check created.
    pub new_alerts: usize,
}

/// What a company removal took with it.
#[derive(Debug)]
pub struct CompanyRemoval {
    /// The removed company record.
    pub company: Company,
    /// How many of its alerts were dropped by the cascade.
    pub dropped_alerts: usize,
}

/// One operator session over a data directory.
pub struct WatchSession {
    config: WatchConfig,
    store: JsonFileStore,
    client: FeedClient,
    registry: CompanyRegistry,
    board: TriageBoard,
    load_warnings: Vec<String>,
}

impl WatchSession {
    /// Opens a session, loading both collections.
    ///
    /// A corrupt or unreadable collection file is tolerated: the session
    /// starts with that collection empty and records a warning the caller
    /// can show. The file is only rewritten when a mutation persists.
    pub fn open(config: WatchConfig) -> WatchResult<Self> {
        let config = config.validate()?;
        let store = JsonFileStore::new(config.data_dir.clone());
        let client = FeedClient::new(config.feed_url.clone(), config.fetch_timeout)?;

        let mut load_warnings = Vec::new();
        let companies =
            load_or_empty::<Company>(&store, COMPANIES_FILE, &mut load_warnings);
        let alerts = load_or_empty::<Alert>(&store, ALERTS_FILE, &mut load_warnings);

        info!(
            companies = companies.len(),
            alerts = alerts.len(),
            dir = %config.data_dir.display(),
            "session opened"
        );

        Ok(Self {
            config,
            store,
            client,
            registry: CompanyRegistry::from_companies(companies),
            board: TriageBoard::from_alerts(alerts),
            load_warnings,
        })
    }

    /// The configuration this session runs with.
    #[must_use]
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// All monitored companies.
    #[must_use]
    pub fn companies(&self) -> &[Company] {
        self.registry.companies()
    }

    /// All alerts on the board.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        self.board.alerts()
    }

    /// Warnings raised while loading the collection files.
    #[must_use]
    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    // ---- company operations ------------------------------------------------

    /// Registers a new company and persists the collection.
    pub fn add_company(
        &mut self,
        name: &str,
        description: &str,
        keywords: Vec<String>,
    ) -> WatchResult<CompanyId> {
        let id = self.registry.add(name, description, keywords)?.id;
        self.persist_companies()?;
        info!(company = %id, "company registered");
        Ok(id)
    }

    /// Renames a company and persists.
    pub fn rename_company(&mut self, id: CompanyId, new_name: &str) -> WatchResult<()> {
        self.registry.rename(id, new_name)?;
        self.persist_companies()
    }

    /// Replaces a company's description and persists.
    pub fn set_company_description(&mut self, id: CompanyId, text: &str) -> WatchResult<()> {
        self.registry.set_description(id, text)?;
        self.persist_companies()
    }

    /// Merges keywords into a company's set and persists.
    ///
    /// Returns the size of the set afterwards.
    pub fn add_company_keywords(
        &mut self,
        id: CompanyId,
        additions: Vec<String>,
    ) -> WatchResult<usize> {
        let total = self.registry.add_keywords(id, additions)?.keywords.len();
        self.persist_companies()?;
        Ok(total)
    }

    /// Removes one keyword; persists only when something changed.
    pub fn remove_company_keyword(&mut self, id: CompanyId, raw: &str) -> WatchResult<bool> {
        let removed = self.registry.remove_keyword(id, raw)?;
        if removed {
            self.persist_companies()?;
        }
        Ok(removed)
    }

    /// Removes a company and cascades to its alerts.
    ///
    /// Both collections are persisted; both saves are attempted even when
    /// the first fails, and the first failure surfaces.
    pub fn remove_company(&mut self, id: CompanyId) -> WatchResult<CompanyRemoval> {
        let company = self.registry.remove(id)?;
        let dropped_alerts = self.board.remove_company_alerts(company.id);

        let companies_save = self.persist_companies();
        let alerts_save = self.persist_alerts();
        companies_save.and(alerts_save)?;

        info!(company = %company.name, dropped_alerts, "company removed");
        Ok(CompanyRemoval {
            company,
            dropped_alerts,
        })
    }

    // ---- feed operations ---------------------------------------------------

    /// Fetches the feed and runs a scan pass over it.
    pub fn check_feed(&mut self, window: RecencyWindow) -> WatchResult<ScanReport> {
        let entries = self.client.fetch_recent()?;
        self.ingest(&entries, window)
    }

    /// Scans already-fetched entries; the network-free core of
    /// [`check_feed`](Self::check_feed).
    ///
    /// The alert collection is persisted only when the scan created
    /// something.
    pub fn ingest(
        &mut self,
        entries: &[FeedEntry],
        window: RecencyWindow,
    ) -> WatchResult<ScanReport> {
        let created = pipeline::scan(
            self.registry.companies(),
            self.board.alerts(),
            entries,
            window,
            Utc::now().date_naive(),
            Utc::now(),
        );

        let new_alerts = created.len();
        if new_alerts > 0 {
            self.board.append(created);
            self.persist_alerts()?;
        }

        info!(
            entries = entries.len(),
            new_alerts,
            window = %window,
            "feed check complete"
        );
        Ok(ScanReport {
            entries_fetched: entries.len(),
            new_alerts,
        })
    }

    // ---- triage operations -------------------------------------------------

    /// Sets one alert's status and persists.
    pub fn set_alert_status(&mut self, id: AlertId, status: AlertStatus) -> WatchResult<()> {
        self.board.set_status(id, status)?;
        self.persist_alerts()
    }

    /// Bulk status update; unknown ids are ignored.
    ///
    /// Updated alerts lose their selection mark. Persists only when at
    /// least one alert changed; returns the updated count.
    pub fn bulk_set_alert_status(
        &mut self,
        ids: &[AlertId],
        status: &AlertStatus,
    ) -> WatchResult<usize> {
        let updated = self.board.bulk_set_status(ids, status);
        if updated > 0 {
            self.board.deselect(ids);
            self.persist_alerts()?;
        }
        Ok(updated)
    }

    /// Deletes one alert and persists.
    pub fn delete_alert(&mut self, id: AlertId) -> WatchResult<()> {
        self.board.delete(id)?;
        self.persist_alerts()
    }

    /// The filtered, sorted review view as of the current UTC date.
    #[must_use]
    pub fn alerts_view(&self, filter: &AlertFilter) -> Vec<&Alert> {
        self.board.view(filter, Utc::now().date_naive())
    }

    /// Marks an alert selected or not for bulk actions.
    pub fn select_alert(&mut self, id: AlertId, selected: bool) {
        self.board.set_selected(id, selected);
    }

    /// Currently selected alert ids.
    #[must_use]
    pub fn selected_alerts(&self) -> Vec<AlertId> {
        self.board.selected_ids()
    }

    // ---- persistence -------------------------------------------------------

    fn persist_companies(&self) -> WatchResult<()> {
        self.store
            .save(COMPANIES_FILE, self.registry.companies())
            .map_err(WatchError::from)
    }

    fn persist_alerts(&self) -> WatchResult<()> {
        self.store
            .save(ALERTS_FILE, self.board.alerts())
            .map_err(WatchError::from)
    }
}

fn load_or_empty<T: serde::de::DeserializeOwned>(
    store: &JsonFileStore,
    file: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    match store.load::<T>(file) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, file, "starting with an empty collection");
            warnings.push(e.to_string());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(dir: &std::path::Path) -> WatchConfig {
        WatchConfig {
            data_dir: dir.to_path_buf(),
            ..WatchConfig::default()
        }
    }

    #[test]
    fn test_config_default_is_valid() {
        assert!(WatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_empty_url_and_zero_timeout() {
        let no_url = WatchConfig {
            feed_url: "  ".to_string(),
            ..WatchConfig::default()
        };
        assert!(no_url.validate().is_err());

        let no_timeout = WatchConfig {
            fetch_timeout: Duration::ZERO,
            ..WatchConfig::default()
        };
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn test_open_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let session = WatchSession::open(config_for(dir.path())).unwrap();
        assert!(session.companies().is_empty());
        assert!(session.alerts().is_empty());
        assert!(session.load_warnings().is_empty());
    }

    #[test]
    fn test_open_tolerates_corrupt_collection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COMPANIES_FILE), "]]garbage[[").unwrap();

        let session = WatchSession::open(config_for(dir.path())).unwrap();
        assert!(session.companies().is_empty());
        assert_eq!(session.load_warnings().len(), 1);
        assert!(session.load_warnings()[0].contains("companies.json"));
    }

    #[test]
    fn test_add_company_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = WatchSession::open(config_for(dir.path())).unwrap();
        let id = session
            .add_company("Acme Corp", "", vec!["acme".to_string()])
            .unwrap();

        let reopened = WatchSession::open(config_for(dir.path())).unwrap();
        assert_eq!(reopened.companies().len(), 1);
        assert_eq!(reopened.companies()[0].id, id);
    }

    #[test]
    fn test_remove_company_persists_both_collections() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = WatchSession::open(config_for(dir.path())).unwrap();
        let id = session
            .add_company("Acme Corp", "", vec!["acme".to_string()])
            .unwrap();
        let entries = vec![FeedEntry {
            victim: Some("Acme Corp".to_string()),
            link: Some("L1".to_string()),
            ..FeedEntry::default()
        }];
        session.ingest(&entries, RecencyWindow::AllTime).unwrap();
        assert_eq!(session.alerts().len(), 1);

        let removal = session.remove_company(id).unwrap();
        assert_eq!(removal.dropped_alerts, 1);
        assert_eq!(removal.company.name, "Acme Corp");

        let reopened = WatchSession::open(config_for(dir.path())).unwrap();
        assert!(reopened.companies().is_empty());
        assert!(reopened.alerts().is_empty());
    }
}
