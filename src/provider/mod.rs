//! Upstream provider adapters.
//!
//! Each adapter maps a [`QueryDescriptor`] to one upstream request and parses the
//! response into [`ProviderRaw`], a loose intermediate form where every field is
//! optional. Provider-specific field names stay inside the adapter module; the
//! normalizer only ever sees `ProviderRaw`.

pub mod api_football;
pub mod football_data;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::canonical::MatchStatus;
use crate::config::{Config, ProviderKind};
use crate::descriptor::QueryDescriptor;
use crate::error::FetchError;

pub use api_football::ApiFootball;
pub use football_data::FootballData;

/// Quota headers reported by the supported providers.
const QUOTA_HEADERS: &[&str] = &[
    "x-ratelimit-requests-remaining",
    "x-requests-available-minute",
];

/// Upstream error bodies are logged up to this many bytes.
const MAX_LOGGED_BODY: usize = 512;

/// An interchangeable upstream sports-data API.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short identifier used in logs and on `/health`.
    fn id(&self) -> &'static str;

    /// Issue exactly one upstream request for `descriptor`. Never retries.
    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<ProviderRaw, FetchError>;
}

/// Provider-neutral intermediate form produced by every adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRaw {
    Fixtures(Vec<RawFixture>),
    /// `None` when the upstream response carried no table at all.
    Standings(Option<Vec<RawStanding>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTeam {
    pub id: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGoal {
    pub minute: Option<u32>,
    pub team_id: Option<String>,
    pub scorer: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFixture {
    pub id: Option<String>,
    pub kickoff: Option<DateTime<Utc>>,
    pub status: Option<MatchStatus>,
    pub competition: Option<String>,
    pub venue: Option<String>,
    pub home: Option<RawTeam>,
    pub away: Option<RawTeam>,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub goals: Option<Vec<RawGoal>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStanding {
    pub rank: Option<u32>,
    pub team: Option<RawTeam>,
    pub played: Option<u32>,
    pub won: Option<u32>,
    pub drawn: Option<u32>,
    pub lost: Option<u32>,
    pub points: Option<i32>,
    pub goal_difference: Option<i32>,
}

/// Parse an RFC 3339 timestamp leniently; anything else becomes `None`.
pub(crate) fn parse_kickoff(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP plumbing shared by the adapters: base URL, timeout, optional quota and
/// the uniform classification of transport outcomes into [`FetchError`].
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Option<DirectLimiter>,
}

impl UpstreamClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        requests_per_minute: Option<NonZeroU32>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(5)
            .user_agent(concat!("scores-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: requests_per_minute.map(|n| RateLimiter::direct(Quota::per_minute(n))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&'static str, &str)],
    ) -> Result<T, FetchError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Upstream request to {} failed: {}", url, e);
            FetchError::unreachable(describe_transport_error(&e))
        })?;

        for name in QUOTA_HEADERS {
            if let Some(remaining) = response.headers().get(*name) {
                debug!("Upstream quota remaining: {}", remaining.to_str().unwrap_or("?"));
            }
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::unreachable(describe_transport_error(&e)))?;

        if !status.is_success() {
            warn!(
                "Upstream error (status {}) for {}: {}",
                status,
                url,
                truncate(&body, MAX_LOGGED_BODY)
            );
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse upstream body from {}: {}", url, e);
            FetchError::malformed(e)
        })?;
        info!("Upstream call to {} succeeded ({} bytes)", path, body.len());
        Ok(parsed)
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

fn truncate(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Build the single adapter this deployment talks to.
pub fn build_adapter(config: &Config) -> Result<Arc<dyn ProviderAdapter>> {
    let client = UpstreamClient::new(
        &config.base_url,
        config.upstream_timeout,
        config.requests_per_minute,
    )?;
    let adapter: Arc<dyn ProviderAdapter> = match config.provider {
        ProviderKind::ApiFootball => Arc::new(ApiFootball::new(client, config.api_key.clone())),
        ProviderKind::FootballData => Arc::new(FootballData::new(client, config.api_key.clone())),
    };
    info!(
        "Using upstream provider {} at {}",
        adapter.id(),
        config.base_url
    );
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kickoff_parsing_is_lenient() {
        let parsed = parse_kickoff(Some("2025-08-15T19:00:00+01:00")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-08-15T18:00:00+00:00");
        assert_eq!(parse_kickoff(Some("next tuesday")), None);
        assert_eq!(parse_kickoff(None), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo", 2), "h");
    }
}
