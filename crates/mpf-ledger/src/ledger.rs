//! Change ledger and its current-version projection

use crate::entry::{ChangeEntry, ChangeField, EntryId, EntryMode};
use crate::error::{LedgerError, LedgerResult};
use crate::recency::select_latest;
use serde::Serialize;

/// Top-level "current version" fields mirrored from the winning entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VersionProjection {
    /// Winning entry's version
    pub version: String,
    /// Winning entry's date, literally as entered
    pub date: String,
    /// Winning entry's author
    pub author: String,
}

impl VersionProjection {
    fn from_entry(entry: &ChangeEntry) -> Self {
        Self {
            version: entry.version.clone(),
            date: entry.date.clone(),
            author: entry.author.clone(),
        }
    }

    /// Whether no entry qualified
    #[inline]
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.version.is_empty() && self.date.is_empty() && self.author.is_empty()
    }
}

#[derive(Debug, Clone)]
struct LedgerRow {
    id: EntryId,
    entry: ChangeEntry,
    mode: EntryMode,
}

/// Ordered change history with a derived [`VersionProjection`]
///
/// The projection is recomputed after every mutation, so reads are always
/// consistent with the current rows.
#[derive(Debug, Clone, Default)]
pub struct ChangeLedger {
    rows: Vec<LedgerRow>,
    projection: VersionProjection,
}

impl ChangeLedger {
    /// Create empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows with page-load history
    ///
    /// Loaded rows start read-only. An empty history yields one blank row in
    /// edit mode so there is always something to type into.
    pub fn load(&mut self, entries: Vec<ChangeEntry>) {
        self.rows = entries
            .into_iter()
            .map(|entry| LedgerRow {
                id: EntryId::new(),
                entry,
                mode: EntryMode::Viewing,
            })
            .collect();

        if self.rows.is_empty() {
            self.push_row(ChangeEntry::default());
        }

        self.recompute();
        tracing::debug!(entries = self.rows.len(), "ledger loaded");
    }

    /// Create ledger from page-load history
    #[must_use]
    pub fn loaded(entries: Vec<ChangeEntry>) -> Self {
        let mut ledger = Self::new();
        ledger.load(entries);
        ledger
    }

    fn push_row(&mut self, entry: ChangeEntry) -> EntryId {
        let id = EntryId::new();
        self.rows.push(LedgerRow {
            id,
            entry,
            mode: EntryMode::Editing,
        });
        id
    }

    /// Append an entry (blank when `None`), in edit mode
    pub fn add_entry(&mut self, entry: Option<ChangeEntry>) -> EntryId {
        let id = self.push_row(entry.unwrap_or_default());
        self.recompute();
        tracing::debug!(%id, "ledger entry added");
        id
    }

    /// Remove an entry
    ///
    /// # Errors
    /// `LedgerError::UnknownEntry` if `id` is not live
    pub fn remove_entry(&mut self, id: EntryId) -> LedgerResult<ChangeEntry> {
        let position = self.position(id)?;
        let row = self.rows.remove(position);
        self.recompute();
        tracing::debug!(%id, "ledger entry removed");
        Ok(row.entry)
    }

    /// Overwrite one field of an entry
    ///
    /// # Errors
    /// `LedgerError::UnknownEntry` if `id` is not live
    pub fn set_field(&mut self, id: EntryId, field: ChangeField, value: impl Into<String>) -> LedgerResult<()> {
        let position = self.position(id)?;
        self.rows[position].entry.set(field, value);
        self.recompute();
        Ok(())
    }

    /// Flip an entry between viewing and editing
    ///
    /// # Errors
    /// `LedgerError::UnknownEntry` if `id` is not live
    pub fn toggle_edit(&mut self, id: EntryId) -> LedgerResult<EntryMode> {
        let position = self.position(id)?;
        let row = &mut self.rows[position];
        row.mode = row.mode.toggled();
        Ok(row.mode)
    }

    /// Current mode of an entry
    ///
    /// # Errors
    /// `LedgerError::UnknownEntry` if `id` is not live
    pub fn mode(&self, id: EntryId) -> LedgerResult<EntryMode> {
        Ok(self.rows[self.position(id)?].mode)
    }

    /// Entry by id
    ///
    /// # Errors
    /// `LedgerError::UnknownEntry` if `id` is not live
    pub fn entry(&self, id: EntryId) -> LedgerResult<&ChangeEntry> {
        Ok(&self.rows[self.position(id)?].entry)
    }

    /// Entries in position order
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &ChangeEntry)> {
        self.rows.iter().map(|row| (row.id, &row.entry))
    }

    /// Owned copy of the rows, for snapshots
    #[must_use]
    pub fn to_entries(&self) -> Vec<ChangeEntry> {
        self.rows.iter().map(|row| row.entry.clone()).collect()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the ledger has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current version projection
    #[inline]
    #[must_use]
    pub fn projection(&self) -> &VersionProjection {
        &self.projection
    }

    /// Submission fields: `change_history[i][field]` then the three
    /// `version_control_*` fields
    #[must_use]
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.rows.len() * ChangeField::ALL.len() + 3);

        for (index, row) in self.rows.iter().enumerate() {
            for field in ChangeField::ALL {
                fields.push((
                    format!("change_history[{index}][{field}]"),
                    row.entry.get(field).to_string(),
                ));
            }
        }

        fields.push((
            "version_control_current_version".to_string(),
            self.projection.version.clone(),
        ));
        fields.push((
            "version_control_last_update".to_string(),
            self.projection.date.clone(),
        ));
        fields.push((
            "version_control_author".to_string(),
            self.projection.author.clone(),
        ));
        fields
    }

    fn position(&self, id: EntryId) -> LedgerResult<usize> {
        self.rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(LedgerError::UnknownEntry(id))
    }

    fn recompute(&mut self) {
        let entries: Vec<ChangeEntry> = self.to_entries();
        self.projection = select_latest(&entries)
            .map(|position| VersionProjection::from_entry(&entries[position]))
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_load_yields_blank_editing_row() {
        let ledger = ChangeLedger::loaded(Vec::new());
        assert_eq!(ledger.len(), 1);
        let (id, entry) = ledger.entries().next().unwrap();
        assert_eq!(entry, &ChangeEntry::default());
        assert_eq!(ledger.mode(id).unwrap(), EntryMode::Editing);
        assert!(ledger.projection().is_cleared());
    }

    #[test]
    fn loaded_rows_start_viewing() {
        let ledger = ChangeLedger::loaded(vec![ChangeEntry::new("01/01/2024", "1.0", "ana")]);
        let (id, _) = ledger.entries().next().unwrap();
        assert_eq!(ledger.mode(id).unwrap(), EntryMode::Viewing);
        assert_eq!(ledger.projection().version, "1.0");
    }

    #[test]
    fn edits_recompute_projection() {
        let mut ledger = ChangeLedger::loaded(vec![ChangeEntry::new("01/01/2024", "1.0", "ana")]);
        let id = ledger.add_entry(None);
        assert_eq!(ledger.projection().version, "1.0");

        ledger.set_field(id, ChangeField::Version, "1.1").unwrap();
        ledger.set_field(id, ChangeField::Date, "15/03/2024").unwrap();
        ledger.set_field(id, ChangeField::Author, "rui").unwrap();

        assert_eq!(
            ledger.projection(),
            &VersionProjection {
                version: "1.1".to_string(),
                date: "15/03/2024".to_string(),
                author: "rui".to_string(),
            }
        );
    }

    #[test]
    fn removing_only_entry_clears_projection() {
        let mut ledger = ChangeLedger::new();
        let id = ledger.add_entry(Some(ChangeEntry::new("2024-03-15", "X", "")));
        assert_eq!(ledger.projection().version, "X");

        ledger.remove_entry(id).unwrap();
        assert!(ledger.is_empty());
        assert!(ledger.projection().is_cleared());
    }

    #[test]
    fn unknown_entry_is_rejected() {
        let mut ledger = ChangeLedger::new();
        let id = ledger.add_entry(None);
        ledger.remove_entry(id).unwrap();

        assert_eq!(ledger.remove_entry(id), Err(LedgerError::UnknownEntry(id)));
        assert!(ledger.set_field(id, ChangeField::Date, "x").is_err());
        assert!(ledger.toggle_edit(id).is_err());
    }

    #[test]
    fn toggle_flips_mode() {
        let mut ledger = ChangeLedger::new();
        let id = ledger.add_entry(None);
        assert_eq!(ledger.toggle_edit(id).unwrap(), EntryMode::Viewing);
        assert_eq!(ledger.toggle_edit(id).unwrap(), EntryMode::Editing);
    }

    #[test]
    fn form_fields_follow_naming() {
        let ledger = ChangeLedger::loaded(vec![
            ChangeEntry::new("01/01/2024", "1.0", "ana").with_description("kickoff"),
        ]);
        let fields = ledger.to_form_fields();

        assert_eq!(fields[0], ("change_history[0][date]".to_string(), "01/01/2024".to_string()));
        assert_eq!(fields[2], ("change_history[0][description]".to_string(), "kickoff".to_string()));
        assert_eq!(
            fields.last().unwrap(),
            &("version_control_author".to_string(), "ana".to_string())
        );
        assert_eq!(fields.len(), 4 + 3);
    }
}
