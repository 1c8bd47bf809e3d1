//! Provider-independent response schema. Nothing else is ever returned to callers.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Live,
    HalfTime,
    Finished,
    Postponed,
    Cancelled,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTeamRef {
    pub id: String,
    pub name: String,
    pub short_name: String,
}

/// Goals per side; `null` until the upstream reports a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct CanonicalScore {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalEvent {
    pub minute: Option<u32>,
    pub team_id: String,
    pub scorer: String,
    /// e.g. "Normal Goal", "Penalty", "Own Goal"
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMatch {
    pub id: String,
    /// RFC 3339, empty when unknown.
    pub kickoff_time: String,
    pub status: MatchStatus,
    pub competition_name: String,
    pub venue: String,
    pub home_team: CanonicalTeamRef,
    pub away_team: CanonicalTeamRef,
    pub score: CanonicalScore,
    pub goal_events: Vec<GoalEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub rank: u32,
    pub team_ref: CanonicalTeamRef,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub points: i32,
    pub goal_difference: i32,
}

/// Standing rows in upstream rank order. Serialises as a bare array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct CanonicalTable {
    pub rows: Vec<StandingRow>,
}

/// Body returned on success: `{ "matches": [...] }` or `{ "table": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalData {
    Matches(Vec<CanonicalMatch>),
    Table(CanonicalTable),
}
