//! Error types for the change ledger

use crate::entry::EntryId;

/// Ledger misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No live entry with this id
    #[error("unknown ledger entry: {0}")]
    UnknownEntry(EntryId),

    /// Field name outside `date|version|description|author`
    #[error("unknown ledger field: {0}")]
    UnknownField(String),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_display() {
        let err = LedgerError::UnknownField("reviewer".to_string());
        assert_eq!(err.to_string(), "unknown ledger field: reviewer");
    }
}
