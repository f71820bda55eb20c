//! Ledger entry types

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Stable handle to a ledger row
///
/// Positions shift on removal; ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Ulid);

impl EntryId {
    /// Generate new id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// One change-history row, stored exactly as entered
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeEntry {
    /// Free text; `DD/MM/YYYY` or `YYYY-MM-DD` expected
    pub date: String,
    /// Version label
    pub version: String,
    /// What changed
    pub description: String,
    /// Who changed it
    pub author: String,
}

impl ChangeEntry {
    /// Create entry with date, version and author
    #[must_use]
    pub fn new(date: impl Into<String>, version: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            version: version.into(),
            description: String::new(),
            author: author.into(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the entry takes part in the version projection
    ///
    /// Only rows with version, date and author all blank are skipped;
    /// the description does not count.
    #[inline]
    #[must_use]
    pub fn qualifies(&self) -> bool {
        !(self.version.trim().is_empty()
            && self.date.trim().is_empty()
            && self.author.trim().is_empty())
    }

    /// Read a field
    #[must_use]
    pub fn get(&self, field: ChangeField) -> &str {
        match field {
            ChangeField::Date => &self.date,
            ChangeField::Version => &self.version,
            ChangeField::Description => &self.description,
            ChangeField::Author => &self.author,
        }
    }

    /// Overwrite a field
    pub fn set(&mut self, field: ChangeField, value: impl Into<String>) {
        let slot = match field {
            ChangeField::Date => &mut self.date,
            ChangeField::Version => &mut self.version,
            ChangeField::Description => &mut self.description,
            ChangeField::Author => &mut self.author,
        };
        *slot = value.into();
    }
}

/// Editable column of a [`ChangeEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeField {
    /// `date`
    Date,
    /// `version`
    Version,
    /// `description`
    Description,
    /// `author`
    Author,
}

impl ChangeField {
    /// All fields in submission order
    pub const ALL: [ChangeField; 4] = [
        ChangeField::Date,
        ChangeField::Version,
        ChangeField::Description,
        ChangeField::Author,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeField::Date => "date",
            ChangeField::Version => "version",
            ChangeField::Description => "description",
            ChangeField::Author => "author",
        }
    }
}

impl fmt::Display for ChangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeField {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownField(s.to_string()))
    }
}

/// Per-row display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Read-only row
    #[default]
    Viewing,
    /// Inputs enabled
    Editing,
}

impl EntryMode {
    /// The other mode
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Viewing => Self::Editing,
            Self::Editing => Self::Viewing,
        }
    }
}
