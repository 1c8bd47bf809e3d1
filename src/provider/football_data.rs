//! football-data.org v4.
//!
//! Auth: `X-Auth-Token`. Leagues are competition codes or ids (`PL`, `2021`).

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    parse_kickoff, ProviderAdapter, ProviderRaw, RawFixture, RawGoal, RawStanding, RawTeam,
    UpstreamClient,
};
use crate::canonical::MatchStatus;
use crate::descriptor::QueryDescriptor;
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org/v4";
const PROVIDER_ID: &str = "football-data";

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    matches: Vec<Match>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
struct Match {
    id: Option<u64>,
    utc_date: Option<String>,
    status: Option<String>,
    venue: Option<String>,
    competition: Option<Competition>,
    home_team: Option<Team>,
    away_team: Option<Team>,
    score: Option<Score>,
    /// Only populated on paid plans.
    goals: Option<Vec<Goal>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Competition {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
struct Team {
    id: Option<u64>,
    name: Option<String>,
    short_name: Option<String>,
    tla: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
struct Score {
    full_time: Option<Side>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Side {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
struct Goal {
    minute: Option<u32>,
    injury_time: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<String>,
    team: Option<Team>,
    scorer: Option<Person>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Person {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StandingsResponse {
    standings: Option<Vec<Standing>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Standing {
    #[serde(rename = "type")]
    kind: Option<String>,
    table: Option<Vec<TableRow>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
struct TableRow {
    position: Option<u32>,
    team: Option<Team>,
    played_games: Option<u32>,
    won: Option<u32>,
    draw: Option<u32>,
    lost: Option<u32>,
    points: Option<i32>,
    goal_difference: Option<i32>,
}

pub struct FootballData {
    client: UpstreamClient,
    api_key: String,
}

impl FootballData {
    pub fn new(client: UpstreamClient, api_key: String) -> Self {
        Self { client, api_key }
    }

    async fn matches(&self, path: &str, query: &[(&str, &str)]) -> Result<ProviderRaw, FetchError> {
        let response: MatchesResponse = self
            .client
            .get_json(path, query, &[("X-Auth-Token", self.api_key.as_str())])
            .await?;
        Ok(ProviderRaw::Fixtures(
            response.matches.into_iter().map(fixture).collect(),
        ))
    }
}

#[async_trait]
impl ProviderAdapter for FootballData {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<ProviderRaw, FetchError> {
        match descriptor {
            QueryDescriptor::LiveMatches => self.matches("/matches", &[("status", "LIVE")]).await,
            QueryDescriptor::Results { league, season } => {
                let path = format!("/competitions/{}/matches", league);
                self.matches(&path, &[("season", season.as_str()), ("status", "FINISHED")])
                    .await
            }
            QueryDescriptor::Upcoming { league, season } => {
                let path = format!("/competitions/{}/matches", league);
                self.matches(&path, &[("season", season.as_str()), ("status", "SCHEDULED,TIMED")])
                    .await
            }
            QueryDescriptor::Table { league, season } => {
                let path = format!("/competitions/{}/standings", league);
                let response: StandingsResponse = self
                    .client
                    .get_json(
                        &path,
                        &[("season", season.as_str())],
                        &[("X-Auth-Token", self.api_key.as_str())],
                    )
                    .await?;
                Ok(ProviderRaw::Standings(total_table(response)))
            }
        }
    }
}

fn status(value: &str) -> Option<MatchStatus> {
    let status = match value {
        "SCHEDULED" | "TIMED" => MatchStatus::Scheduled,
        "IN_PLAY" | "LIVE" => MatchStatus::Live,
        "PAUSED" => MatchStatus::HalfTime,
        "FINISHED" | "AWARDED" => MatchStatus::Finished,
        "POSTPONED" | "SUSPENDED" => MatchStatus::Postponed,
        "CANCELLED" => MatchStatus::Cancelled,
        _ => return None,
    };
    Some(status)
}

fn team(team: Team) -> RawTeam {
    RawTeam {
        id: team.id.map(|id| id.to_string()),
        name: team.name,
        short_name: team.short_name.or(team.tla),
    }
}

fn goal(goal: Goal) -> RawGoal {
    RawGoal {
        minute: goal
            .minute
            .map(|m| m.saturating_add(goal.injury_time.unwrap_or(0))),
        team_id: goal.team.and_then(|t| t.id).map(|id| id.to_string()),
        scorer: goal.scorer.and_then(|p| p.name),
        detail: goal.kind,
    }
}

fn fixture(m: Match) -> RawFixture {
    let full_time = m.score.and_then(|s| s.full_time).unwrap_or_default();
    RawFixture {
        id: m.id.map(|id| id.to_string()),
        kickoff: parse_kickoff(m.utc_date.as_deref()),
        status: m.status.as_deref().and_then(status),
        competition: m.competition.and_then(|c| c.name),
        venue: m.venue,
        home: m.home_team.map(team),
        away: m.away_team.map(team),
        home_goals: full_time.home,
        away_goals: full_time.away,
        goals: m.goals.map(|goals| goals.into_iter().map(goal).collect()),
    }
}

/// Prefer the `TOTAL` group; fall back to the first one.
fn total_table(response: StandingsResponse) -> Option<Vec<RawStanding>> {
    let mut standings = response.standings?;
    let index = standings
        .iter()
        .position(|s| s.kind.as_deref() == Some("TOTAL"))
        .unwrap_or(0);
    if index >= standings.len() {
        return None;
    }
    let rows = standings.swap_remove(index).table?;
    Some(
        rows.into_iter()
            .map(|row| RawStanding {
                rank: row.position,
                team: row.team.map(team),
                played: row.played_games,
                won: row.won,
                drawn: row.draw,
                lost: row.lost,
                points: row.points,
                goal_difference: row.goal_difference,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_match() {
        let m: Match = serde_json::from_value(json!({
            "id": 497410,
            "utcDate": "2025-08-16T14:00:00Z",
            "status": "PAUSED",
            "venue": "Villa Park",
            "competition": { "id": 2021, "name": "Premier League" },
            "homeTeam": { "id": 58, "name": "Aston Villa FC", "shortName": "Aston Villa", "tla": "AVL" },
            "awayTeam": { "id": 73, "name": "Tottenham Hotspur FC", "tla": "TOT" },
            "score": { "winner": null, "fullTime": { "home": 0, "away": 1 }, "halfTime": { "home": 0, "away": 1 } }
        }))
        .unwrap();
        let raw = fixture(m);
        assert_eq!(raw.status, Some(MatchStatus::HalfTime));
        assert_eq!(raw.home.unwrap().short_name.as_deref(), Some("Aston Villa"));
        assert_eq!(raw.away.unwrap().short_name.as_deref(), Some("TOT"));
        assert_eq!((raw.home_goals, raw.away_goals), (Some(0), Some(1)));
        assert_eq!(raw.goals, None);
    }

    #[test]
    fn matches_key_is_required() {
        assert!(serde_json::from_value::<MatchesResponse>(json!({})).is_err());
        let empty: MatchesResponse = serde_json::from_value(json!({ "matches": [] })).unwrap();
        assert!(empty.matches.is_empty());
    }

    #[test]
    fn goal_minute_saturates() {
        let g: Goal = serde_json::from_value(json!({
            "minute": u32::MAX, "injuryTime": 3, "type": "REGULAR"
        }))
        .unwrap();
        assert_eq!(goal(g).minute, Some(u32::MAX));
    }

    #[test]
    fn picks_total_group() {
        let response: StandingsResponse = serde_json::from_value(json!({
            "standings": [
                { "type": "HOME", "table": [{ "position": 1, "team": { "id": 1 } }] },
                { "type": "TOTAL", "table": [
                    { "position": 1, "team": { "id": 64 }, "playedGames": 3, "points": 9 },
                    { "position": 2, "team": { "id": 57 }, "playedGames": 3, "points": 7 }
                ] }
            ]
        }))
        .unwrap();
        let rows = total_table(response).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team.as_ref().unwrap().id.as_deref(), Some("64"));
    }

    #[test]
    fn empty_standings_list_is_absent_table() {
        let response: StandingsResponse =
            serde_json::from_value(json!({ "standings": [] })).unwrap();
        assert_eq!(total_table(response), None);
    }
}
