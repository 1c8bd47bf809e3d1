//! Canonical query descriptors and the cache keys derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

const MAX_PARAM_LEN: usize = 32;

/// One of the four queries the gateway knows how to answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryDescriptor {
    LiveMatches,
    Results { league: String, season: String },
    Upcoming { league: String, season: String },
    Table { league: String, season: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {name} parameter {value:?}: expected 1-32 characters of [A-Za-z0-9_-]")]
pub struct InvalidParameter {
    pub name: &'static str,
    pub value: String,
}

impl QueryDescriptor {
    pub fn results(league: &str, season: &str) -> Result<Self, InvalidParameter> {
        let (league, season) = validated(league, season)?;
        Ok(QueryDescriptor::Results { league, season })
    }

    pub fn upcoming(league: &str, season: &str) -> Result<Self, InvalidParameter> {
        let (league, season) = validated(league, season)?;
        Ok(QueryDescriptor::Upcoming { league, season })
    }

    pub fn table(league: &str, season: &str) -> Result<Self, InvalidParameter> {
        let (league, season) = validated(league, season)?;
        Ok(QueryDescriptor::Table { league, season })
    }

    /// Variant tag used as the cache key prefix and in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            QueryDescriptor::LiveMatches => "live",
            QueryDescriptor::Results { .. } => "results",
            QueryDescriptor::Upcoming { .. } => "upcoming",
            QueryDescriptor::Table { .. } => "table",
        }
    }

    /// Parameters in sorted order.
    pub fn params(&self) -> BTreeMap<&'static str, &str> {
        let mut params = BTreeMap::new();
        match self {
            QueryDescriptor::LiveMatches => {}
            QueryDescriptor::Results { league, season }
            | QueryDescriptor::Upcoming { league, season }
            | QueryDescriptor::Table { league, season } => {
                params.insert("league", league.as_str());
                params.insert("season", season.as_str());
            }
        }
        params
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from(self)
    }
}

fn validated(league: &str, season: &str) -> Result<(String, String), InvalidParameter> {
    Ok((check("league", league)?, check("season", season)?))
}

fn check(name: &'static str, value: &str) -> Result<String, InvalidParameter> {
    let ok = !value.is_empty()
        && value.len() <= MAX_PARAM_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(value.to_string())
    } else {
        Err(InvalidParameter {
            name,
            value: value.to_string(),
        })
    }
}

/// Deterministic key: variant tag followed by the sorted parameters as a JSON
/// object. JSON string escaping keeps the mapping injective for any field values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&QueryDescriptor> for CacheKey {
    fn from(descriptor: &QueryDescriptor) -> Self {
        let params: Map<String, Value> = descriptor
            .params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        CacheKey(format!("{}:{}", descriptor.tag(), Value::Object(params)))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
