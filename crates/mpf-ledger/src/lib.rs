//! Change history ledger
//!
//! A freely edited list of dated change entries plus the derived
//! "current version" record the page submits alongside it.
//!
//! # Core Operations
//!
//! - **Load**: seed from page-load history (one blank row when empty)
//! - **Edit**: add, remove, set fields, toggle per-row edit mode
//! - **Project**: [`VersionProjection`] mirrors the entry the recency rule picks
//!
//! The ledger is independent of the form tree; the two only meet in the
//! submitted field list.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod entry;
pub mod error;
pub mod ledger;
pub mod recency;

pub use entry::{ChangeEntry, ChangeField, EntryId, EntryMode};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{ChangeLedger, VersionProjection};
pub use recency::{parse_entry_date, select_latest};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
