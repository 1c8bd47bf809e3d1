use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Service health state, updated on every resolution.
#[derive(Clone, Default)]
pub struct HealthState {
    pub last_success: Arc<RwLock<Option<DateTime<Utc>>>>,
    pub consecutive_errors: Arc<RwLock<usize>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_success(&self) {
        *self.last_success.write().await = Some(Utc::now());
        *self.consecutive_errors.write().await = 0;
    }

    pub async fn record_error(&self) {
        *self.consecutive_errors.write().await += 1;
    }
}
