//! HTTP client for the NOAA GHCN-Daily bucket.
//!
//! Every feed is streamed, so the multi-megabyte station and inventory files
//! never sit in memory whole. The fixed-width feeds are handed to the caller
//! line by line; the per-station CSV goes through the `csv` reader on a
//! blocking thread.

use std::io;
use std::pin::Pin;
use std::time::Duration;

use axum::body::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::Url;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::{StreamReader, SyncIoBridge};

use super::error::FeedError;
use super::observations::{ParsedObservations, read_observations};

/// Default base URL of the public GHCN-Daily bucket.
const DEFAULT_BASE_URL: &str = "https://noaa-ghcn-pds.s3.amazonaws.com";

/// Default connect and read-idle timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A response body as a buffered async reader.
type BodyReader = StreamReader<BodyStream, Bytes>;

/// Configuration for the NOAA client.
#[derive(Debug, Clone)]
pub struct NoaaConfig {
    /// Base URL of the bucket (no trailing slash)
    pub base_url: String,
    /// Connect timeout, and the longest the body may go without new bytes.
    /// A slow but steady download never times out.
    pub timeout_secs: u64,
}

impl NoaaConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing or a mirror).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the connect and read-idle timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NoaaConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines seen by [`NoaaClient::for_each_line`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    /// Lines passed to the callback
    pub lines: usize,
    /// Lines dropped because they were not valid UTF-8
    pub undecodable: usize,
}

/// Client for the station directory, inventory and per-station feeds.
#[derive(Debug, Clone)]
pub struct NoaaClient {
    http: reqwest::Client,
    base: Url,
}

impl NoaaClient {
    pub fn new(config: NoaaConfig) -> Result<Self, FeedError> {
        let base = Url::parse(&config.base_url).map_err(|e| FeedError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FeedError::InvalidBaseUrl {
                url: config.base_url,
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self { http, base })
    }

    pub fn stations_url(&self) -> String {
        self.feed_url(&["ghcnd-stations.txt"])
    }

    pub fn inventory_url(&self) -> String {
        self.feed_url(&["ghcnd-inventory.txt"])
    }

    /// URL of one station's CSV. The id is percent-encoded as a single
    /// path segment, so `/`, `?` and `#` cannot escape the directory.
    pub fn observations_url(&self, station_id: &str) -> String {
        self.feed_url(&["csv", "by_station", &format!("{station_id}.csv")])
    }

    fn feed_url(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    /// Send a GET and return the body.
    async fn open(&self, url: &str) -> Result<BodyReader, FeedError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FeedError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let stream: BodyStream = Box::pin(response.bytes_stream().map_err(io::Error::other));
        Ok(StreamReader::new(stream))
    }

    /// Stream `url` and call `on_line` for every line of the body.
    ///
    /// Line endings (`\n` or `\r\n`) are stripped. Lines that are not valid
    /// UTF-8 are counted and skipped. A non-success status is an error;
    /// nothing is passed to `on_line` in that case.
    pub async fn for_each_line<F>(
        &self,
        url: &str,
        mut on_line: F,
    ) -> Result<LineCounts, FeedError>
    where
        F: FnMut(&str) + Send,
    {
        let mut reader = self.open(url).await?;
        let mut counts = LineCounts::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|source| FeedError::Io {
                    url: url.to_string(),
                    source,
                })?;
            if read == 0 {
                break;
            }

            let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match std::str::from_utf8(line) {
                Ok(line) => {
                    on_line(line);
                    counts.lines += 1;
                }
                Err(_) => counts.undecodable += 1,
            }
        }

        Ok(counts)
    }

    /// Fetch and parse the daily observations of one station.
    pub async fn station_observations(
        &self,
        station_id: &str,
    ) -> Result<ParsedObservations, FeedError> {
        let url = self.observations_url(station_id);
        let reader = SyncIoBridge::new(self.open(&url).await?);

        let parsed = tokio::task::spawn_blocking(move || read_observations(reader))
            .await
            .map_err(io::Error::other)
            .and_then(|parsed| parsed);

        parsed.map_err(|source| FeedError::Io { url, source })
    }
}
