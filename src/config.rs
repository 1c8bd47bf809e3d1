//! Process configuration, read once at startup.

use std::env;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::descriptor::QueryDescriptor;
use crate::error::ConfigError;
use crate::provider::{api_football, football_data};

const DEFAULT_TTL_MS: u64 = 15_000;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    ApiFootball,
    FootballData,
}

impl ProviderKind {
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::ApiFootball => api_football::DEFAULT_BASE_URL,
            ProviderKind::FootballData => football_data::DEFAULT_BASE_URL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api-football" | "api_football" | "apifootball" => Ok(ProviderKind::ApiFootball),
            "football-data" | "football_data" | "footballdata" => Ok(ProviderKind::FootballData),
            other => Err(format!(
                "unknown provider '{}' (expected api-football or football-data)",
                other
            )),
        }
    }
}

/// TTL applied to cache entries. Uniform unless `live` overrides it for
/// live-match queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub default: Duration,
    pub live: Option<Duration>,
}

impl TtlPolicy {
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            default: ttl,
            live: None,
        }
    }

    pub fn for_descriptor(&self, descriptor: &QueryDescriptor) -> Duration {
        match descriptor {
            QueryDescriptor::LiveMatches => self.live.unwrap_or(self.default),
            _ => self.default,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(DEFAULT_TTL_MS))
    }
}

/// Configuration
#[derive(Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub upstream_timeout: Duration,
    /// Client-side upstream quota; `None` means unthrottled.
    pub requests_per_minute: Option<NonZeroU32>,
    /// Exact origins; empty means every origin is allowed.
    pub allowed_origins: Vec<String>,
    pub ttl: TtlPolicy,
    /// `None` disables the background sweep.
    pub sweep_interval: Option<Duration>,
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("allowed_origins", &self.allowed_origins)
            .field("ttl", &self.ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset,
    /// except for the API key where a blank value is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match get("UPSTREAM_PROVIDER") {
            Some(v) => {
                let parsed = v.parse::<ProviderKind>();
                parsed.map_err(|reason| ConfigError::Invalid {
                    name: "UPSTREAM_PROVIDER",
                    value: v,
                    reason,
                })?
            }
            None => ProviderKind::ApiFootball,
        };

        let api_key = api_key(&lookup)?;

        let base_url = get("UPSTREAM_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| provider.default_base_url().to_string());

        let upstream_timeout = Duration::from_millis(parse(
            &get,
            "UPSTREAM_TIMEOUT_MS",
            DEFAULT_UPSTREAM_TIMEOUT_MS,
        )?);

        let requests_per_minute = NonZeroU32::new(parse(&get, "UPSTREAM_REQUESTS_PER_MINUTE", 0)?);

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let ttl = TtlPolicy {
            default: Duration::from_millis(parse(&get, "CACHE_TTL_MS", DEFAULT_TTL_MS)?),
            live: match get("LIVE_CACHE_TTL_MS") {
                Some(_) => Some(Duration::from_millis(parse(&get, "LIVE_CACHE_TTL_MS", 0)?)),
                None => None,
            },
        };

        let sweep_secs = parse(&get, "CACHE_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?;
        let sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        Ok(Self {
            provider,
            api_key,
            base_url,
            upstream_timeout,
            requests_per_minute,
            allowed_origins,
            ttl,
            sweep_interval,
            port: parse(&get, "PORT", DEFAULT_PORT)?,
        })
    }
}

fn api_key<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (name, key) = match lookup("UPSTREAM_API_KEY") {
        Some(v) => ("UPSTREAM_API_KEY", v),
        None => match lookup("RAPIDAPI_KEY") {
            Some(v) => ("RAPIDAPI_KEY", v),
            None => return Err(ConfigError::Missing("UPSTREAM_API_KEY")),
        },
    };

    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(ConfigError::Empty(name));
    }

    // Prevent accidental use of sample/placeholder keys
    let key_lower = key.to_lowercase();
    if key_lower.contains("change_me") || key_lower.contains("your_") || key_lower.starts_with("sample") {
        return Err(ConfigError::Placeholder(name));
    }
    Ok(key)
}

fn parse<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            })
        }
        None => Ok(default),
    }
}
