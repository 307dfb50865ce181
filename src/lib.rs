//! # ransomwatch - keyword alerting over ransomware disclosure feeds
//!
//! ransomwatch watches the public recent-disclosure feed for mentions of
//! companies you care about. Registered companies carry normalized keyword
//! sets; a fetch scans every feed entry for case-insensitive keyword matches
//! and materializes deduplicated alerts that an operator then triages.
//!
//! ## Core Concepts
//!
//! - **Company**: a monitored organization with a normalized keyword set
//! - **Alert**: one keyword match against one feed entry, carrying an
//!   immutable snapshot of the entry and a mutable triage status
//! - **WatchSession**: the single-operator state (registry + triage board),
//!   loaded from and persisted to two JSON files
//! - **RecencyWindow**: optional day-count bound over feed-reported dates
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ransomwatch::{AlertFilter, RecencyWindow, WatchConfig, WatchSession};
//!
//! let mut session = WatchSession::open(WatchConfig::default())?;
//! session.add_company("Acme Corp", "", vec!["acme".into()])?;
//!
//! let report = session.check_feed(RecencyWindow::Days(30))?;
//! println!("{} new alerts", report.new_alerts);
//!
//! for alert in session.alerts_view(&AlertFilter::default()) {
//!     println!("{} [{}] {}", alert.company_name, alert.status, alert.snapshot.display_name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alert;
pub mod company;
pub mod error;
pub mod feed;
pub mod keyword;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod storage;
pub mod triage;
pub mod window;

// Re-export primary types at crate root for convenience
pub use alert::{Alert, AlertId, AlertStatus, EntrySnapshot};
pub use company::{Company, CompanyId};
pub use error::{
    DateParseError, FetchError, StorageError, ValidationError, WatchError, WatchResult,
};
pub use feed::{FeedClient, FeedEntry, GroupClaim};
pub use registry::CompanyRegistry;
pub use session::{CompanyRemoval, ScanReport, WatchConfig, WatchSession};
pub use storage::JsonFileStore;
pub use triage::{AlertFilter, TriageBoard};
pub use window::RecencyWindow;
