//! Football scores gateway.
//!
//! Serves live matches, results, upcoming fixtures and league tables from a
//! short-lived in-process cache, falling back to a single upstream sports-data
//! provider on a miss. Concurrent misses for the same query share one upstream
//! call, and every provider response is normalized into one canonical schema.

pub mod access;
pub mod cache;
pub mod canonical;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod gateway;
pub mod health;
pub mod http;
pub mod normalize;
pub mod provider;

pub use access::AccessGate;
pub use cache::CacheStore;
pub use canonical::CanonicalData;
pub use config::Config;
pub use descriptor::{CacheKey, QueryDescriptor};
pub use error::{ConfigError, FetchError};
pub use gateway::Gateway;
pub use provider::{ProviderAdapter, ProviderRaw};
