//! Core domain logic for the worktime ledger.
//!
//! This crate contains the fundamental types and logic for:
//! - Dates: validated `YYYY-MM-DD` keys and local-midnight day windows
//! - Aggregation: summing event overlap with a day window
//! - Bucket selection: picking the event source for the current host
//! - Ledger: the persistent date → hours store, device merging, gap reports

pub mod bucket;
pub mod date;
pub mod gaps;
pub mod ledger;
pub mod merge;
pub mod overlap;

pub use bucket::select_bucket;
pub use date::{DateKey, DateKeyError, DayWindow};
pub use gaps::find_gaps;
pub use ledger::{Hours, Ledger, LedgerError};
pub use merge::merge_devices;
pub use overlap::{SpannedEvent, sum_overlap};
