//! The whole page: form tree plus change ledger
//!
//! The embedded page document carries both halves side by side:
//!
//! ```text
//! { "groups": [...], "change_history": [...] }
//! ```
//!
//! They are decoded independently so a malformed history never costs the
//! tree, and the other way round.

use mpf_form::{FormTree, ProjectSnapshot, RehydrationReport};
use mpf_ledger::{ChangeEntry, ChangeLedger};
use mpf_schema::SchemaResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Page document as embedded at load and re-emitted by `serialize`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    /// Group/Object tree
    #[serde(flatten)]
    pub project: ProjectSnapshot,
    /// Change history rows as entered
    #[serde(default)]
    pub change_history: Vec<ChangeEntry>,
}

#[derive(Deserialize)]
struct HistoryOnly {
    #[serde(default)]
    change_history: Vec<ChangeEntry>,
}

/// Live page state
#[derive(Debug)]
pub struct Page {
    /// Group/Object form
    pub tree: FormTree,
    /// Change history
    pub ledger: ChangeLedger,
}

impl Page {
    /// Page-load entry point
    ///
    /// A missing or unreadable document yields an empty tree and a ledger
    /// with one blank row.
    pub async fn bootstrap(resolver: Arc<SchemaResolver>, raw: Option<&str>) -> (Self, RehydrationReport) {
        let mut tree = FormTree::new(resolver);
        let report = tree.bootstrap(raw).await;
        let ledger = ChangeLedger::loaded(history(raw));

        tracing::info!(
            groups = report.groups,
            objects = report.objects,
            entries = ledger.len(),
            "page loaded"
        );
        (Self { tree, ledger }, report)
    }

    /// Submission pairs: tree fields, then ledger fields
    #[must_use]
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.tree.to_form_fields();
        fields.extend(self.ledger.to_form_fields());
        fields
    }

    /// Current page document
    #[must_use]
    pub fn payload(&self) -> PagePayload {
        PagePayload {
            project: self.tree.serialize(),
            change_history: self.ledger.to_entries(),
        }
    }
}

fn history(raw: Option<&str>) -> Vec<ChangeEntry> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<HistoryOnly>(raw) {
        Ok(doc) => doc.change_history,
        Err(e) => {
            tracing::warn!(error = %e, "change history unreadable, starting with a blank row");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_read_alongside_groups() {
        let raw = r#"{"groups": [], "change_history": [{"date": "01/01/2024", "version": "1.0"}]}"#;
        let entries = history(Some(raw));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version, "1.0");
        assert_eq!(entries[0].author, "");
    }

    #[test]
    fn bad_history_is_empty() {
        assert!(history(Some(r#"{"change_history": "nope"}"#)).is_empty());
        assert!(history(Some("{")).is_empty());
        assert!(history(None).is_empty());
    }

    #[test]
    fn payload_flattens_groups() {
        let payload: PagePayload =
            serde_json::from_str(r#"{"groups": [{"label": "A"}], "change_history": []}"#).unwrap();
        assert_eq!(payload.project.groups.len(), 1);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("groups").is_some());
        assert!(json.get("change_history").is_some());
    }
}
