//! Interval-overlap aggregation for timestamped events.

use chrono::{DateTime, TimeDelta, Utc};

use crate::date::DayWindow;

/// A timestamped event covering `[start, start + duration)`.
///
/// Implemented by the tracking-service event type; kept as a trait so the
/// aggregation logic stays independent of any wire format.
pub trait SpannedEvent {
    /// When the interval begins.
    fn start_time(&self) -> DateTime<Utc>;

    /// Interval length in seconds. Non-positive or non-finite values are
    /// treated as zero.
    fn duration_seconds(&self) -> f64;

    /// When the interval ends.
    fn end_time(&self) -> DateTime<Utc> {
        self.start_time() + seconds_to_delta(self.duration_seconds())
    }
}

/// Total seconds of overlap between `events` and `window`, counting only
/// events accepted by `predicate`.
///
/// Each event contributes `max(0, min(event.end, window.end) -
/// max(event.start, window.start))` seconds, which clamps events straddling
/// the day boundary to their in-window portion. Events fully outside the
/// window contribute nothing.
pub fn sum_overlap<E, P>(events: &[E], window: DayWindow, mut predicate: P) -> f64
where
    E: SpannedEvent,
    P: FnMut(&E) -> bool,
{
    events
        .iter()
        .filter(|event| predicate(event))
        .map(|event| overlap_seconds(event, window))
        .sum()
}

fn overlap_seconds<E: SpannedEvent>(event: &E, window: DayWindow) -> f64 {
    let start = event.start_time().max(window.start);
    let end = event.end_time().min(window.end);
    let overlap = end.signed_duration_since(start);
    if overlap <= TimeDelta::zero() {
        0.0
    } else {
        delta_to_seconds(overlap)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "event durations are bounded far below i64 milliseconds"
)]
fn seconds_to_delta(seconds: f64) -> TimeDelta {
    if seconds.is_finite() && seconds > 0.0 {
        TimeDelta::milliseconds((seconds * 1000.0).round() as i64)
    } else {
        TimeDelta::zero()
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "overlaps within a single day fit exactly in f64 milliseconds"
)]
fn delta_to_seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}
