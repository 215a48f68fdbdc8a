//! Reconciling per-device ledgers into the canonical ledger.

use std::collections::BTreeMap;

use crate::date::DateKey;
use crate::ledger::{Hours, Ledger};

/// Merges device ledgers into the canonical ledger.
///
/// For every date present in any device ledger, the device contributions are
/// summed (time worked on different machines the same day is additive) and
/// the total replaces whatever the canonical ledger held: the canonical
/// ledger is a cache of device totals, not an independent source for dates
/// that have device data. Dates with no device data keep their canonical
/// value.
pub fn merge_devices(canonical: &Ledger, devices: &[Ledger]) -> Ledger {
    let mut totals: BTreeMap<DateKey, f64> = BTreeMap::new();
    for device in devices {
        for (date, hours) in device.iter() {
            *totals.entry(date).or_insert(0.0) += hours.value();
        }
    }

    let mut merged = canonical.clone();
    for (date, total) in totals {
        let Some(total) = Hours::new(total) else {
            continue;
        };
        // Device totals are authoritative, but overwriting a differing
        // canonical entry can erase a hand-corrected value; make it visible.
        match merged.get(date) {
            Some(previous) if previous != total => {
                tracing::warn!(
                    %date,
                    previous = previous.value(),
                    replaced_by = total.value(),
                    "device totals replace canonical entry"
                );
            }
            _ => {}
        }
        merged.upsert(date, total);
    }
    merged
}
