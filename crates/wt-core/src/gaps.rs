//! Gap detection: calendar dates missing from a ledger.

use crate::date::DateKey;
use crate::ledger::Ledger;

/// Every calendar date in `[start, end]` absent from `ledger`, in
/// chronological order.
///
/// Surfaces logging gaps; it never fills them. Empty when `start > end`.
pub fn find_gaps(ledger: &Ledger, start: DateKey, end: DateKey) -> Vec<DateKey> {
    DateKey::range_inclusive(start, end)
        .filter(|date| !ledger.contains(*date))
        .collect()
}
