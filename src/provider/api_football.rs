//! API-Football (api-sports.io v3), optionally reached through RapidAPI.
//!
//! Auth: `x-rapidapi-key` and `x-rapidapi-host` headers.
//! Live: `/fixtures?live=all`. Results/upcoming: `/fixtures?league&season&status=FT|NS`.
//! Table: `/standings?league&season`, first league, first standings group.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{
    parse_kickoff, ProviderAdapter, ProviderRaw, RawFixture, RawGoal, RawStanding, RawTeam,
    UpstreamClient,
};
use crate::canonical::MatchStatus;
use crate::descriptor::QueryDescriptor;
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://v3.football.api-sports.io";
const API_HOST: &str = "v3.football.api-sports.io";
const PROVIDER_ID: &str = "api-football";

// ============================================================================
// API Response Structures
// ============================================================================

/// Every endpoint wraps its payload in `response`. Application errors come back
/// with HTTP 200 and a non-empty `errors` field. A body without `response` is
/// not an envelope at all.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: serde_json::Value,
    response: Vec<T>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FixtureItem {
    fixture: Option<Fixture>,
    league: Option<League>,
    teams: Option<Teams>,
    goals: Option<Goals>,
    events: Option<Vec<Event>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Fixture {
    id: Option<u64>,
    date: Option<String>,
    venue: Option<Venue>,
    status: Option<Status>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Venue {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Status {
    short: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct League {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Teams {
    home: Option<Team>,
    away: Option<Team>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Team {
    id: Option<u64>,
    name: Option<String>,
    /// Only present on some endpoints (e.g. `/teams`).
    code: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Goals {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Event {
    time: Option<EventTime>,
    team: Option<Team>,
    player: Option<Player>,
    #[serde(rename = "type")]
    kind: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EventTime {
    elapsed: Option<u32>,
    extra: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Player {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StandingsItem {
    league: Option<StandingsLeague>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StandingsLeague {
    standings: Option<Vec<Vec<StandingRow>>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
struct StandingRow {
    rank: Option<u32>,
    team: Option<Team>,
    points: Option<i32>,
    goals_diff: Option<i32>,
    all: Option<Record>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Record {
    played: Option<u32>,
    win: Option<u32>,
    draw: Option<u32>,
    lose: Option<u32>,
}

// ============================================================================
// ApiFootball
// ============================================================================

pub struct ApiFootball {
    client: UpstreamClient,
    api_key: String,
}

impl ApiFootball {
    pub fn new(client: UpstreamClient, api_key: String) -> Self {
        Self { client, api_key }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, FetchError> {
        let headers = [
            ("x-rapidapi-key", self.api_key.as_str()),
            ("x-rapidapi-host", API_HOST),
        ];
        let envelope: Envelope<T> = self.client.get_json(path, query, &headers).await?;
        if has_errors(&envelope.errors) {
            warn!("API-Football reported errors: {}", envelope.errors);
            return Err(FetchError::malformed(format!(
                "upstream reported errors: {}",
                envelope.errors
            )));
        }
        Ok(envelope.response)
    }
}

#[async_trait]
impl ProviderAdapter for ApiFootball {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<ProviderRaw, FetchError> {
        match descriptor {
            QueryDescriptor::LiveMatches => {
                let items: Vec<FixtureItem> = self.get("/fixtures", &[("live", "all")]).await?;
                Ok(ProviderRaw::Fixtures(items.into_iter().map(fixture).collect()))
            }
            QueryDescriptor::Results { league, season } => {
                let query = [("league", league.as_str()), ("season", season.as_str()), ("status", "FT")];
                let items: Vec<FixtureItem> = self.get("/fixtures", &query).await?;
                Ok(ProviderRaw::Fixtures(items.into_iter().map(fixture).collect()))
            }
            QueryDescriptor::Upcoming { league, season } => {
                let query = [("league", league.as_str()), ("season", season.as_str()), ("status", "NS")];
                let items: Vec<FixtureItem> = self.get("/fixtures", &query).await?;
                Ok(ProviderRaw::Fixtures(items.into_iter().map(fixture).collect()))
            }
            QueryDescriptor::Table { league, season } => {
                let query = [("league", league.as_str()), ("season", season.as_str())];
                let items: Vec<StandingsItem> = self.get("/standings", &query).await?;
                Ok(ProviderRaw::Standings(first_table(items)))
            }
        }
    }
}

/// `errors` is `[]` when clean, otherwise an object or array of messages.
fn has_errors(errors: &serde_json::Value) -> bool {
    match errors {
        serde_json::Value::Null => false,
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn status(short: &str) -> Option<MatchStatus> {
    let status = match short {
        "TBD" | "NS" => MatchStatus::Scheduled,
        "1H" | "2H" | "ET" | "BT" | "P" | "LIVE" | "INT" => MatchStatus::Live,
        "HT" => MatchStatus::HalfTime,
        "FT" | "AET" | "PEN" | "AWD" | "WO" => MatchStatus::Finished,
        "PST" | "SUSP" => MatchStatus::Postponed,
        "CANC" | "ABD" => MatchStatus::Cancelled,
        _ => return None,
    };
    Some(status)
}

fn team(team: Team) -> RawTeam {
    RawTeam {
        id: team.id.map(|id| id.to_string()),
        name: team.name,
        short_name: team.code,
    }
}

fn goal(event: Event) -> Option<RawGoal> {
    if event.kind.as_deref() != Some("Goal") || event.detail.as_deref() == Some("Missed Penalty") {
        return None;
    }
    let minute = event
        .time
        .and_then(|t| t.elapsed.map(|m| m.saturating_add(t.extra.unwrap_or(0))));
    Some(RawGoal {
        minute,
        team_id: event.team.and_then(|t| t.id).map(|id| id.to_string()),
        scorer: event.player.and_then(|p| p.name),
        detail: event.detail,
    })
}

fn fixture(item: FixtureItem) -> RawFixture {
    let fixture = item.fixture.unwrap_or_default();
    let teams = item.teams.unwrap_or_default();
    let goals = item.goals.unwrap_or_default();
    RawFixture {
        id: fixture.id.map(|id| id.to_string()),
        kickoff: parse_kickoff(fixture.date.as_deref()),
        status: fixture.status.and_then(|s| s.short).as_deref().and_then(status),
        competition: item.league.and_then(|l| l.name),
        venue: fixture.venue.and_then(|v| v.name),
        home: teams.home.map(team),
        away: teams.away.map(team),
        home_goals: goals.home,
        away_goals: goals.away,
        goals: item
            .events
            .map(|events| events.into_iter().filter_map(goal).collect()),
    }
}

fn first_table(items: Vec<StandingsItem>) -> Option<Vec<RawStanding>> {
    let table = items
        .into_iter()
        .next()?
        .league?
        .standings?
        .into_iter()
        .next()?;
    Some(
        table
            .into_iter()
            .map(|row| {
                let record = row.all.unwrap_or_default();
                RawStanding {
                    rank: row.rank,
                    team: row.team.map(team),
                    played: record.played,
                    won: record.win,
                    drawn: record.draw,
                    lost: record.lose,
                    points: row.points,
                    goal_difference: row.goals_diff,
                }
            })
            .collect(),
    )
}
