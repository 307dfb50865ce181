//! Company records and identity.
//!
//! Companies are the anchor of the whole tool: alerts reference them by id,
//! and every scan iterates their keyword sets. Ids are stable for the life
//! of the record; names can change without touching existing alerts.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keyword;

/// Globally unique, stable company identifier.
///
/// Once created, a `CompanyId` never changes. Alerts hold it as a weak
/// reference, so renaming a company never rewrites alert history.
///
/// # Examples
///
/// ```
/// use ransomwatch::CompanyId;
///
/// let a = CompanyId::new();
/// let b = CompanyId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Creates a new random company ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a company ID from an existing UUID.
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

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CompanyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CompanyId> for Uuid {
    fn from(id: CompanyId) -> Self {
        id.0
    }
}

/// A monitored company with its keyword set.
///
/// The keyword set is always normalized: trimmed, lower-cased, deduplicated
/// and sorted. Construction and every mutation maintain that invariant.
///
/// # Examples
///
/// ```
/// use ransomwatch::Company;
///
/// let company = Company::new("Acme Corp", "", vec!["Zeta".into(), " ACME ".into()]);
/// assert_eq!(company.keywords, vec!["acme", "zeta"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Globally unique identifier.
    pub id: CompanyId,

    /// Display name, trimmed and case-insensitively unique in the registry.
    pub name: String,

    /// Optional free-text note about the company.
    #[serde(default)]
    pub description: String,

    /// Normalized keyword set, persisted sorted.
    pub keywords: Vec<String>,
}

impl Company {
    /// Creates a new company, normalizing the keyword set.
    ///
    /// Validation (non-empty name, non-empty keyword set, name uniqueness)
    /// is the registry's job; this constructor only normalizes.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self::with_id(CompanyId::new(), name, description, keywords)
    }

    /// Creates a company with a specific ID (fixtures, migration).
    #[must_use]
    pub fn with_id(
        id: CompanyId,
        name: impl Into<String>,
        description: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        let mut set = Vec::new();
        keyword::merge(&mut set, keywords);
        Self {
            id,
            name: name.into(),
            description: description.into(),
            keywords: set,
        }
    }

    /// Merges raw keywords into this company's set.
    pub fn add_keywords(&mut self, additions: Vec<String>) {
        keyword::merge(&mut self.keywords, additions);
    }

    /// Removes one keyword, matching its normalized form.
    ///
    /// Returns true when the keyword was present.
    pub fn remove_keyword(&mut self, raw: &str) -> bool {
        let Some(target) = keyword::normalize(raw) else {
            return false;
        };
        let before = self.keywords.len();
        self.keywords.retain(|k| *k != target);
        self.keywords.len() != before
    }
}
