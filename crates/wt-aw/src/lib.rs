//! ActivityWatch API integration for the worktime ledger.
//!
//! Talks to a local ActivityWatch server and reduces one day's watcher
//! events to a count of active seconds. Collection prefers the host's AFK
//! watcher (presence data); when none is registered it falls back to the
//! window watcher, where any recorded event counts as active time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use wt_core::{DayWindow, SpannedEvent, select_bucket, sum_overlap};

/// Bucket prefix of the presence (AFK) watcher.
pub const AFK_BUCKET_PREFIX: &str = "aw-watcher-afk_";
/// Bucket prefix of the window watcher.
pub const WINDOW_BUCKET_PREFIX: &str = "aw-watcher-window_";

/// `status` value marking presence in AFK watcher events.
const NOT_AFK: &str = "not-afk";

/// ActivityWatch client errors.
#[derive(Debug, Error)]
pub enum AwError {
    /// The configured server URL does not parse.
    #[error("invalid server URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The request never completed (connection refused, DNS, ...).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("server returned {status} for {url}")]
    Status { url: String, status: StatusCode },
    /// The response body was not the expected JSON.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Neither an AFK nor a window bucket exists for the host.
    #[error(
        "no bucket found for host {hostname:?}: expected {AFK_BUCKET_PREFIX}* or {WINDOW_BUCKET_PREFIX}*"
    )]
    NoBucket { hostname: String },
}

/// Server metadata from `GET /api/0/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One event from a watcher bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct AwEvent {
    /// Interval start.
    pub timestamp: DateTime<Utc>,
    /// Interval length in seconds. Missing durations count as zero.
    #[serde(default)]
    pub duration: f64,
    /// Watcher-specific payload.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl AwEvent {
    /// Whether the AFK watcher marked this interval as at-the-keyboard.
    pub fn is_not_afk(&self) -> bool {
        self.data.get("status").and_then(|value| value.as_str()) == Some(NOT_AFK)
    }
}

impl SpannedEvent for AwEvent {
    fn start_time(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn duration_seconds(&self) -> f64 {
        self.duration
    }
}

/// The bucket a day's hours were derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSource {
    /// Presence-based AFK watcher bucket.
    Afk(String),
    /// Window watcher bucket; a coarser signal used only as fallback.
    Window(String),
}

impl BucketSource {
    pub fn id(&self) -> &str {
        match self {
            Self::Afk(id) | Self::Window(id) => id,
        }
    }
}

impl fmt::Display for BucketSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Afk(id) => write!(f, "AFK bucket ({id})"),
            Self::Window(id) => write!(f, "Window bucket ({id})"),
        }
    }
}

/// Picks the preferred event source for `hostname` from the available
/// bucket ids: the AFK bucket when one matches, the window bucket otherwise.
pub fn choose_source(bucket_ids: &[String], hostname: &str) -> Option<BucketSource> {
    let ids = || bucket_ids.iter().map(String::as_str);
    if let Some(id) = select_bucket(ids(), AFK_BUCKET_PREFIX, hostname) {
        return Some(BucketSource::Afk(id.to_string()));
    }
    select_bucket(ids(), WINDOW_BUCKET_PREFIX, hostname)
        .map(|id| BucketSource::Window(id.to_string()))
}

/// ActivityWatch HTTP client.
///
/// Requests run sequentially and use the HTTP client's default timeout
/// behavior; there is no retry.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    /// Creates a client for the given base URL, e.g. `http://localhost:5600`.
    /// Trailing slashes are ignored.
    pub fn new(base_url: &str) -> Result<Self, AwError> {
        let base =
            Url::parse(base_url.trim_end_matches('/')).map_err(|source| AwError::InvalidUrl {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// Fetches server metadata (`GET /api/0/info`).
    pub async fn server_info(&self) -> Result<ServerInfo, AwError> {
        self.get_json(self.endpoint(&["api", "0", "info"])).await
    }

    /// Lists available buckets (`GET /api/0/buckets`), id → metadata.
    pub async fn buckets(&self) -> Result<BTreeMap<String, serde_json::Value>, AwError> {
        self.get_json(self.endpoint(&["api", "0", "buckets"])).await
    }

    /// Fetches one bucket's events within `window`.
    pub async fn events(&self, bucket_id: &str, window: DayWindow) -> Result<Vec<AwEvent>, AwError> {
        let mut url = self.endpoint(&["api", "0", "buckets", bucket_id, "events"]);
        url.query_pairs_mut()
            .append_pair("start", &format_instant(window.start))
            .append_pair("end", &format_instant(window.end));
        self.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AwError> {
        tracing::debug!(%url, "requesting");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| AwError::Request {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AwError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.json().await.map_err(|source| AwError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// One day's collected activity.
#[derive(Debug, Clone)]
pub struct DaySample {
    /// Raw active seconds; rounding is the caller's concern.
    pub seconds: f64,
    /// The bucket the sample came from.
    pub source: BucketSource,
    /// Number of events the bucket reported for the window.
    pub event_count: usize,
}

/// Estimates active seconds for one day window.
///
/// Lists the server's buckets, picks the source for `hostname`, and sums the
/// in-window overlap of its events. Fails with [`AwError::NoBucket`] when the
/// host has neither an AFK nor a window bucket.
pub async fn collect_day(
    client: &Client,
    hostname: &str,
    window: DayWindow,
) -> Result<DaySample, AwError> {
    let buckets = client.buckets().await?;
    let bucket_ids: Vec<String> = buckets.into_keys().collect();
    let source = choose_source(&bucket_ids, hostname).ok_or_else(|| AwError::NoBucket {
        hostname: hostname.to_string(),
    })?;
    sample_source(client, &source, window).await
}

/// Fetches and aggregates one already-chosen source.
pub async fn sample_source(
    client: &Client,
    source: &BucketSource,
    window: DayWindow,
) -> Result<DaySample, AwError> {
    let events = client.events(source.id(), window).await?;
    let seconds = match source {
        BucketSource::Afk(_) => sum_overlap(&events, window, AwEvent::is_not_afk),
        BucketSource::Window(_) => sum_overlap(&events, window, |_| true),
    };
    tracing::debug!(
        bucket = source.id(),
        events = events.len(),
        seconds,
        "collected day sample"
    );
    Ok(DaySample {
        seconds,
        source: source.clone(),
        event_count: events.len(),
    })
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
