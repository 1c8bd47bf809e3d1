#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scores_gateway::config::TtlPolicy;
use scores_gateway::provider::{RawFixture, RawStanding, RawTeam};
use scores_gateway::{CacheStore, FetchError, Gateway, ProviderAdapter, ProviderRaw, QueryDescriptor};

type Respond = dyn Fn(usize, &QueryDescriptor) -> Result<ProviderRaw, FetchError> + Send + Sync;

/// Scripted adapter that counts calls and optionally takes a while to answer.
pub struct FakeAdapter {
    calls: AtomicUsize,
    delay: Duration,
    respond: Box<Respond>,
}

impl FakeAdapter {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize, &QueryDescriptor) -> Result<ProviderRaw, FetchError> + Send + Sync + 'static,
    {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            respond: Box::new(respond),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for FakeAdapter {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<ProviderRaw, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.respond)(n, descriptor)
    }
}

pub fn gateway(adapter: &Arc<FakeAdapter>, ttl: TtlPolicy) -> Gateway {
    Gateway::new(adapter.clone(), CacheStore::new(), ttl)
}

pub fn team(id: u32, name: &str) -> RawTeam {
    RawTeam {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        short_name: None,
    }
}

pub fn live_fixture(id: u32, home: RawTeam, away: RawTeam) -> RawFixture {
    RawFixture {
        id: Some(id.to_string()),
        competition: Some("Premier League".to_string()),
        home: Some(home),
        away: Some(away),
        home_goals: Some(1),
        away_goals: Some(0),
        ..Default::default()
    }
}

pub fn two_live_matches() -> ProviderRaw {
    ProviderRaw::Fixtures(vec![
        live_fixture(1, team(40, "Liverpool"), team(35, "Bournemouth")),
        live_fixture(2, team(42, "Arsenal"), team(39, "Wolves")),
    ])
}

pub fn standing(rank: u32, team_id: u32) -> RawStanding {
    RawStanding {
        rank: Some(rank),
        team: Some(team(team_id, "Team")),
        played: Some(3),
        points: Some(9 - rank as i32),
        ..Default::default()
    }
}

pub fn unavailable() -> FetchError {
    FetchError::UpstreamStatus {
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}
