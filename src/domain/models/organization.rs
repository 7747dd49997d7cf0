//! Organization domain model.
//!
//! An organization is one tenant of the gateway. It is bound to at most one
//! GitHub App installation and carries the label policy applied to every
//! issue request made on its behalf.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Delimiter used to store label lists as a single column and to build the
/// provider's label filter.
pub const LABEL_DELIMITER: char = ',';

/// A tenant organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Database identifier
    pub id: i64,
    /// Display name (unset until named)
    pub name: Option<String>,
    /// Plaintext GitHub App installation identifier
    #[serde(skip_serializing)]
    pub installation_id: Option<String>,
    /// Labels every listed issue must carry
    pub mandatory_labels: Vec<String>,
    /// Labels stamped onto every created or updated issue
    pub added_labels: Vec<String>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// The installation identifier, treating an empty string as absent.
    pub fn installation(&self) -> Option<&str> {
        self.installation_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether the GitHub App has been installed for this organization.
    pub fn is_installed(&self) -> bool {
        self.installation().is_some()
    }
}

/// Split a stored comma-joined label string into its labels.
///
/// Surrounding whitespace is trimmed and empty entries are dropped, so an
/// empty column yields an empty list.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(LABEL_DELIMITER)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join labels into the stored comma-joined representation.
pub fn join_labels(labels: &[String]) -> String {
    labels.join(&LABEL_DELIMITER.to_string())
}

/// Normalize a caller-supplied label list.
///
/// Labels are trimmed and blank entries dropped. A label containing the
/// delimiter cannot round-trip through storage or the provider's filter
/// syntax and is rejected.
pub fn normalize_labels(labels: &[String]) -> DomainResult<Vec<String>> {
    let mut normalized = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        if label.contains(LABEL_DELIMITER) {
            return Err(DomainError::ValidationFailed(format!(
                "label '{label}' must not contain '{LABEL_DELIMITER}'"
            )));
        }
        normalized.push(label.to_string());
    }
    Ok(normalized)
}
