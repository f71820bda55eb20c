//! Recency rule
//!
//! Picks the entry the "current version" mirrors:
//! - dates parse as `DD/MM/YYYY`, then `YYYY-MM-DD`, then a handful of
//!   general encodings; anything else counts as undated
//! - a dated entry beats an undated one
//! - among equals (both dated and same instant, or both undated) the later
//!   position wins

use crate::entry::ChangeEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an entry date, `None` when blank or unrecognised
#[must_use]
pub fn parse_entry_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let date_only = |fmt: &str| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    };

    // Day-first wins over the general formats so 03/04 is April, not March
    date_only(DATE_FORMATS[0])
        .or_else(|| date_only(DATE_FORMATS[1]))
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|d| d.naive_utc()))
        .or_else(|| DateTime::parse_from_rfc2822(text).ok().map(|d| d.naive_utc()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        })
        .or_else(|| date_only(DATE_FORMATS[2]))
}

/// Position of the winning entry, `None` when no entry qualifies
#[must_use]
pub fn select_latest(entries: &[ChangeEntry]) -> Option<usize> {
    let mut winner: Option<(usize, Option<NaiveDateTime>)> = None;

    for (position, entry) in entries.iter().enumerate() {
        if !entry.qualifies() {
            continue;
        }
        let date = parse_entry_date(&entry.date);

        winner = Some(match winner {
            None => (position, date),
            Some((best, best_date)) => {
                // Candidates always sit at a later position than the winner
                let candidate_wins = match (date, best_date) {
                    (Some(candidate), Some(current)) => candidate >= current,
                    (Some(_), None) | (None, None) => true,
                    (None, Some(_)) => false,
                };
                if candidate_wins {
                    (position, date)
                } else {
                    (best, best_date)
                }
            }
        });
    }

    winner.map(|(position, _)| position)
}
