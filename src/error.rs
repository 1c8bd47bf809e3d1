//! Error taxonomy for the gateway.
//!
//! `FetchError` is local to a single resolution and is shared between every
//! caller coalesced onto the same upstream call, so it must be `Clone`.
//! `ConfigError` is only produced at startup and is fatal.

use thiserror::Error;

/// Failure of one upstream resolution. Never cached, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered with a non-success HTTP status.
    #[error("upstream responded with HTTP {status}")]
    UpstreamStatus { status: u16, body: String },

    /// DNS, connect, TLS or timeout failure before a response was read.
    #[error("upstream unreachable: {cause}")]
    UpstreamUnreachable { cause: String },

    /// Upstream body did not parse as the expected structure.
    #[error("upstream response malformed: {cause}")]
    UpstreamMalformed { cause: String },

    /// The fetch task panicked or was cancelled before it settled.
    #[error("upstream fetch aborted: {cause}")]
    Aborted { cause: String },
}

impl FetchError {
    /// Stable kind name reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::UpstreamStatus { .. } => "UpstreamStatusError",
            FetchError::UpstreamUnreachable { .. } => "UpstreamUnreachableError",
            FetchError::UpstreamMalformed { .. } => "UpstreamMalformedError",
            FetchError::Aborted { .. } => "FetchAborted",
        }
    }

    pub fn unreachable(cause: impl ToString) -> Self {
        FetchError::UpstreamUnreachable {
            cause: cause.to_string(),
        }
    }

    pub fn malformed(cause: impl ToString) -> Self {
        FetchError::UpstreamMalformed {
            cause: cause.to_string(),
        }
    }
}

/// Startup configuration failure. The process must not serve traffic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(&'static str),

    #[error("{0} is set but empty")]
    Empty(&'static str),

    #[error("{0} appears to be a placeholder value; replace it with a real key")]
    Placeholder(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let status = FetchError::UpstreamStatus {
            status: 503,
            body: "down".into(),
        };
        assert_eq!(status.kind(), "UpstreamStatusError");
        assert_eq!(FetchError::unreachable("dns").kind(), "UpstreamUnreachableError");
        assert_eq!(FetchError::malformed("eof").kind(), "UpstreamMalformedError");
    }

    #[test]
    fn status_display_omits_body() {
        let err = FetchError::UpstreamStatus {
            status: 503,
            body: "secret upstream detail".into(),
        };
        assert!(!err.to_string().contains("secret"));
    }
}
