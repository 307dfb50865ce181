//! The monitored-company registry.
//!
//! A plain in-memory collection with the uniqueness and validation rules
//! for company mutations. Persistence is the session's job; the registry
//! never touches the filesystem.

use crate::company::{Company, CompanyId};
use crate::error::ValidationError;

/// Case-insensitive form used for name uniqueness.
fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The collection of monitored companies.
///
/// Names are unique ignoring case and surrounding whitespace. Ids are
/// stable; every other field can change after creation.
#[derive(Debug, Default)]
pub struct CompanyRegistry {
    companies: Vec<Company>,
}

impl CompanyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            companies: Vec::new(),
        }
    }

    /// Wraps an already-loaded company collection.
    #[must_use]
    pub fn from_companies(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    /// All companies in insertion order.
    #[must_use]
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// Number of registered companies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Returns true when no companies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Looks up a company by id.
    #[must_use]
    pub fn get(&self, id: CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    /// Registers a new company.
    ///
    /// The name is stored trimmed; keywords are normalized before the
    /// non-empty check, so input that is all whitespace still fails.
    pub fn add(
        &mut self,
        name: &str,
        description: &str,
        keywords: Vec<String>,
    ) -> Result<&Company, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCompanyName);
        }
        if self.name_taken(trimmed, None) {
            return Err(ValidationError::DuplicateCompanyName {
                name: trimmed.to_string(),
            });
        }

        let company = Company::new(trimmed, description, keywords);
        if company.keywords.is_empty() {
            return Err(ValidationError::EmptyKeywordSet);
        }

        let index = self.companies.len();
        self.companies.push(company);
        Ok(&self.companies[index])
    }

    /// Renames a company.
    ///
    /// Changing only the case of the company's own name is allowed; a
    /// collision with any *other* company is not.
    pub fn rename(&mut self, id: CompanyId, new_name: &str) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCompanyName);
        }
        if self.name_taken(trimmed, Some(id)) {
            return Err(ValidationError::DuplicateCompanyName {
                name: trimmed.to_string(),
            });
        }
        self.companies[index].name = trimmed.to_string();
        Ok(())
    }

    /// Replaces a company's description.
    pub fn set_description(
        &mut self,
        id: CompanyId,
        description: &str,
    ) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.companies[index].description = description.to_string();
        Ok(())
    }

    /// Merges raw keywords into a company's set.
    ///
    /// Additions that normalize to nothing are a no-op, not an error.
    pub fn add_keywords(
        &mut self,
        id: CompanyId,
        additions: Vec<String>,
    ) -> Result<&Company, ValidationError> {
        let index = self.index_of(id)?;
        self.companies[index].add_keywords(additions);
        Ok(&self.companies[index])
    }

    /// Removes one keyword from a company's set.
    ///
    /// Returns whether the keyword was present. Removing the last keyword
    /// is allowed; the company simply stops matching anything.
    pub fn remove_keyword(&mut self, id: CompanyId, raw: &str) -> Result<bool, ValidationError> {
        let index = self.index_of(id)?;
        Ok(self.companies[index].remove_keyword(raw))
    }

    /// Removes a company, returning the removed record.
    ///
    /// The caller owns the cascade to that company's alerts.
    pub fn remove(&mut self, id: CompanyId) -> Result<Company, ValidationError> {
        let index = self.index_of(id)?;
        Ok(self.companies.remove(index))
    }

    fn index_of(&self, id: CompanyId) -> Result<usize, ValidationError> {
        self.companies
            .iter()
            .position(|c| c.id == id)
            .ok_or(ValidationError::CompanyNotFound { id })
    }

    fn name_taken(&self, candidate: &str, exclude: Option<CompanyId>) -> bool {
        let folded = normalize_name(candidate);
        self.companies
            .iter()
            .filter(|c| exclude != Some(c.id))
            .any(|c| normalize_name(&c.name) == folded)
    }
}
