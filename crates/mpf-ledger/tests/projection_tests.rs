//! Projection Tests
//!
//! The recency rule through the public ledger API.

use mpf_ledger::{select_latest, ChangeEntry, ChangeField, ChangeLedger, VersionProjection};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn entry(date: &str, version: &str) -> ChangeEntry {
    ChangeEntry::new(date, version, "")
}

#[test]
fn test_later_date_mirrors_into_projection() {
    let ledger = ChangeLedger::loaded(vec![entry("01/01/2024", "1.0"), entry("15/03/2024", "1.1")]);
    assert_eq!(ledger.projection().version, "1.1");
    assert_eq!(ledger.projection().date, "15/03/2024");
}

#[test]
fn test_undated_entries_resolve_by_position() {
    let ledger = ChangeLedger::loaded(vec![entry("", "A"), entry("", "B")]);
    assert_eq!(ledger.projection().version, "B");
}

#[test]
fn test_dated_entry_beats_later_undated() {
    let ledger = ChangeLedger::loaded(vec![entry("2024-03-15", "X"), entry("", "Y")]);
    assert_eq!(ledger.projection().version, "X");
}

#[test]
fn test_mixed_encodings_compare_by_instant() {
    let ledger = ChangeLedger::loaded(vec![
        entry("2024-06-01", "2.0"),
        entry("15/03/2024", "1.1"),
        entry("not a date", "0.9"),
    ]);
    assert_eq!(ledger.projection().version, "2.0");
}

#[test]
fn test_clearing_fields_drops_entry_from_projection() {
    let mut ledger = ChangeLedger::new();
    let first = ledger.add_entry(Some(entry("01/01/2024", "1.0")));
    let second = ledger.add_entry(Some(entry("15/03/2024", "1.1")));
    assert_eq!(ledger.projection().version, "1.1");

    ledger.set_field(second, ChangeField::Date, "").unwrap();
    ledger.set_field(second, ChangeField::Version, "").unwrap();
    assert_eq!(ledger.projection().version, "1.0");

    ledger.remove_entry(first).unwrap();
    assert_eq!(ledger.projection(), &VersionProjection::default());
}

fn arb_date() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("garbage".to_string()),
        (1u32..=28, 1u32..=12, 2020i32..=2026).prop_map(|(d, m, y)| format!("{d:02}/{m:02}/{y}")),
        (1u32..=28, 1u32..=12, 2020i32..=2026).prop_map(|(d, m, y)| format!("{y}-{m:02}-{d:02}")),
    ]
}

fn arb_entry() -> impl Strategy<Value = ChangeEntry> {
    (arb_date(), prop_oneof![Just(String::new()), "[0-9]\\.[0-9]"], prop_oneof![Just(String::new()), "[a-z]{3}"])
        .prop_map(|(date, version, author)| ChangeEntry::new(date, version, author))
}

proptest! {
    #[test]
    fn prop_projection_mirrors_a_qualifying_entry(entries in proptest::collection::vec(arb_entry(), 0..12)) {
        let ledger = ChangeLedger::loaded(entries.clone());
        let projection = ledger.projection();

        match select_latest(&ledger.to_entries()) {
            Some(position) => {
                let winner = &ledger.to_entries()[position];
                prop_assert!(winner.qualifies());
                prop_assert_eq!(&projection.version, &winner.version);
                prop_assert_eq!(&projection.date, &winner.date);
                prop_assert_eq!(&projection.author, &winner.author);
            }
            None => {
                prop_assert!(entries.iter().all(|e| !e.qualifies()));
                prop_assert!(projection.is_cleared());
            }
        }
    }

    #[test]
    fn prop_appending_newer_dated_entry_takes_over(entries in proptest::collection::vec(arb_entry(), 0..8)) {
        let mut ledger = ChangeLedger::loaded(entries);
        ledger.add_entry(Some(ChangeEntry::new("31/12/2030", "next", "")));
        prop_assert_eq!(ledger.projection().version.as_str(), "next");
    }
}
