//! Bucket selection: picking the event source for the current host.
//!
//! Tracking services register one bucket per watcher per host, named
//! `<prefix><hostname>`. Hosts don't always report the same name the watcher
//! registered under (FQDN vs short hostname), so selection runs an ordered
//! list of tie-break strategies instead of requiring an exact match.

/// Inputs shared by all tie-break strategies.
struct Selection<'a> {
    /// `prefix + hostname`.
    exact: String,
    /// `prefix + hostname-up-to-first-dot`.
    short_exact: String,
    /// Hostname truncated at the first `.`.
    short_host: String,
    /// Bucket ids starting with the prefix, sorted lexicographically.
    candidates: Vec<&'a str>,
}

type Strategy = for<'a> fn(&Selection<'a>) -> Option<&'a str>;

/// Evaluated in order; the first strategy producing a match wins.
const STRATEGIES: [(&str, Strategy); 4] = [
    ("exact-host", exact_host),
    ("sole-candidate", sole_candidate),
    ("short-host", short_host),
    ("first-sorted", first_sorted),
];

/// Picks the bucket id representing `hostname` among `bucket_ids`.
///
/// Returns `None` only when no id starts with `prefix`.
pub fn select_bucket<'a, I>(bucket_ids: I, prefix: &str, hostname: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut candidates: Vec<&str> = bucket_ids
        .into_iter()
        .filter(|id| id.starts_with(prefix))
        .collect();
    candidates.sort_unstable();

    let short = hostname.split('.').next().unwrap_or(hostname);
    let selection = Selection {
        exact: format!("{prefix}{hostname}"),
        short_exact: format!("{prefix}{short}"),
        short_host: short.to_string(),
        candidates,
    };

    for (name, strategy) in STRATEGIES {
        if let Some(id) = strategy(&selection) {
            tracing::debug!(strategy = name, bucket = id, "selected bucket");
            return Some(id);
        }
    }
    None
}

/// The bucket registered under the caller's full hostname.
fn exact_host<'a>(sel: &Selection<'a>) -> Option<&'a str> {
    sel.candidates.iter().copied().find(|id| *id == sel.exact)
}

/// A single candidate is unambiguous regardless of its host suffix.
fn sole_candidate<'a>(sel: &Selection<'a>) -> Option<&'a str> {
    match sel.candidates.as_slice() {
        &[only] => Some(only),
        _ => None,
    }
}

/// Matches on the short hostname, tolerating FQDN mismatches between the
/// watcher's registration and the caller.
fn short_host<'a>(sel: &Selection<'a>) -> Option<&'a str> {
    sel.candidates
        .iter()
        .copied()
        .find(|id| *id == sel.short_exact || id.contains(sel.short_host.as_str()))
}

/// Last resort: the lexicographically first candidate.
fn first_sorted<'a>(sel: &Selection<'a>) -> Option<&'a str> {
    sel.candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "aw-watcher-afk_";

    fn select<'a>(ids: &'a [&str], hostname: &str) -> Option<&'a str> {
        select_bucket(ids.iter().copied(), PREFIX, hostname)
    }

    #[test]
    fn exact_hostname_wins() {
        let ids = [
            "aw-watcher-afk_other",
            "aw-watcher-afk_myhost",
            "aw-watcher-window_myhost",
        ];
        assert_eq!(select(&ids, "myhost"), Some("aw-watcher-afk_myhost"));
    }

    #[test]
    fn no_prefixed_bucket_selects_nothing() {
        let ids = ["aw-watcher-window_myhost", "unrelated"];
        assert_eq!(select(&ids, "myhost"), None);
    }

    #[test]
    fn sole_candidate_wins_despite_host_mismatch() {
        let ids = ["aw-watcher-afk_elsewhere"];
        assert_eq!(select(&ids, "myhost"), Some("aw-watcher-afk_elsewhere"));
    }

    #[test]
    fn fqdn_caller_matches_short_host_bucket() {
        let ids = ["aw-watcher-afk_myhost", "aw-watcher-afk_other"];
        assert_eq!(select(&ids, "myhost.local"), Some("aw-watcher-afk_myhost"));
    }

    #[test]
    fn short_host_substring_match() {
        let ids = ["aw-watcher-afk_aaa", "aw-watcher-afk_myhost-2"];
        assert_eq!(
            select(&ids, "myhost.example.com"),
            Some("aw-watcher-afk_myhost-2")
        );
    }

    #[test]
    fn falls_back_to_first_sorted_candidate() {
        let ids = ["aw-watcher-afk_zzz", "aw-watcher-afk_bbb"];
        assert_eq!(select(&ids, "myhost"), Some("aw-watcher-afk_bbb"));
    }

    #[test]
    fn short_host_match_prefers_sorted_order() {
        // Both contain the short host; the first in sorted order wins.
        let ids = ["aw-watcher-afk_myhost-new", "aw-watcher-afk_myhost-old"];
        assert_eq!(
            select(&ids, "myhost.lan"),
            Some("aw-watcher-afk_myhost-new")
        );
    }

    #[test]
    fn empty_bucket_set_selects_nothing() {
        assert_eq!(select(&[], "myhost"), None);
    }
}
