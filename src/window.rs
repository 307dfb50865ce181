//! Recency windows over feed-reported dates.
//!
//! A window bounds how far back a scan or a triage view reaches. It applies
//! to the date the *feed* reports for a disclosure, never to when we
//! detected the match. Entries without a parseable reported date cannot be
//! placed in time, so a bounded window excludes them.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};

use crate::error::DateParseError;

/// Format the feed reports disclosure dates in.
const REPORTED_DATE_FORMAT: &str = "%Y-%m-%d";

/// How far back a scan or view reaches.
///
/// # Examples
///
/// ```
/// use ransomwatch::RecencyWindow;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
/// let window = RecencyWindow::Days(7);
/// assert_eq!(window.cutoff(today), NaiveDate::from_ymd_opt(2026, 8, 15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyWindow {
    /// No cutoff at all.
    AllTime,
    /// Only disclosures reported within the last `n` days.
    Days(u32),
}

impl RecencyWindow {
    /// The day-count presets the command help advertises.
    pub const PRESETS: [u32; 4] = [7, 30, 60, 90];

    /// The oldest reported date this window admits, relative to `today`.
    ///
    /// `None` means unbounded.
    #[must_use]
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::AllTime => None,
            Self::Days(n) => Some(
                today
                    .checked_sub_days(Days::new(u64::from(*n)))
                    .unwrap_or(NaiveDate::MIN),
            ),
        }
    }

    /// Returns true when a parsed reported date falls inside the window.
    ///
    /// The cutoff day itself is admitted.
    #[must_use]
    pub fn admits(&self, reported: NaiveDate, today: NaiveDate) -> bool {
        self.cutoff(today).map_or(true, |cutoff| reported >= cutoff)
    }

    /// Returns true when this window has no cutoff.
    #[must_use]
    pub const fn is_all_time(&self) -> bool {
        matches!(self, Self::AllTime)
    }
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::AllTime
    }
}

impl fmt::Display for RecencyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTime => write!(f, "all time"),
            Self::Days(n) => write!(f, "last {n} days"),
        }
    }
}

impl FromStr for RecencyWindow {
    type Err = String;

    /// Parses operator input: a day count, or `all` for no cutoff.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("all time") {
            return Ok(Self::AllTime);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Days)
            .map_err(|_| format!("unrecognized window '{s}' (use a day count or 'all')"))
    }
}

/// Parses a feed-reported date string (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`DateParseError`] for anything else, including trailing text.
pub fn parse_reported_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(raw, REPORTED_DATE_FORMAT).map_err(|_| DateParseError {
        raw: raw.to_string(),
    })
}
