//! Maps the provider-neutral intermediate form onto the canonical schema.
//!
//! Pure and total: every missing upstream field lands on an explicit default
//! (`""`, `[]`, `null` score, `0` counters, `UNKNOWN` status).

use tracing::warn;

use crate::canonical::{
    CanonicalData, CanonicalMatch, CanonicalScore, CanonicalTable, CanonicalTeamRef, GoalEvent,
    StandingRow,
};
use crate::descriptor::QueryDescriptor;
use crate::provider::{ProviderRaw, RawFixture, RawGoal, RawStanding, RawTeam};

pub fn normalize(descriptor: &QueryDescriptor, raw: ProviderRaw) -> CanonicalData {
    match (descriptor, raw) {
        (QueryDescriptor::Table { .. }, ProviderRaw::Standings(rows)) => {
            CanonicalData::Table(table(rows.unwrap_or_default()))
        }
        (QueryDescriptor::Table { .. }, ProviderRaw::Fixtures(_)) => {
            warn!("Adapter returned fixtures for a table query; serving an empty table");
            CanonicalData::Table(CanonicalTable::default())
        }
        (_, ProviderRaw::Fixtures(fixtures)) => {
            CanonicalData::Matches(fixtures.into_iter().map(canonical_match).collect())
        }
        (_, ProviderRaw::Standings(_)) => {
            warn!("Adapter returned standings for a {} query; serving no matches", descriptor.tag());
            CanonicalData::Matches(Vec::new())
        }
    }
}

fn team_ref(team: Option<RawTeam>) -> CanonicalTeamRef {
    let team = team.unwrap_or_default();
    CanonicalTeamRef {
        id: team.id.unwrap_or_default(),
        name: team.name.unwrap_or_default(),
        short_name: team.short_name.unwrap_or_default(),
    }
}

fn goal_event(goal: RawGoal) -> GoalEvent {
    GoalEvent {
        minute: goal.minute,
        team_id: goal.team_id.unwrap_or_default(),
        scorer: goal.scorer.unwrap_or_default(),
        detail: goal.detail.unwrap_or_default(),
    }
}

fn canonical_match(fixture: RawFixture) -> CanonicalMatch {
    CanonicalMatch {
        id: fixture.id.unwrap_or_default(),
        kickoff_time: fixture
            .kickoff
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        status: fixture.status.unwrap_or_default(),
        competition_name: fixture.competition.unwrap_or_default(),
        venue: fixture.venue.unwrap_or_default(),
        home_team: team_ref(fixture.home),
        away_team: team_ref(fixture.away),
        score: CanonicalScore {
            home: fixture.home_goals,
            away: fixture.away_goals,
        },
        goal_events: fixture
            .goals
            .unwrap_or_default()
            .into_iter()
            .map(goal_event)
            .collect(),
    }
}

/// Rows follow the upstream rank; unranked rows keep their relative order at the end.
fn table(rows: Vec<RawStanding>) -> CanonicalTable {
    let mut ranked: Vec<(Option<u32>, StandingRow)> = rows
        .into_iter()
        .map(|row| {
            let rank = row.rank;
            (
                rank,
                StandingRow {
                    rank: rank.unwrap_or_default(),
                    team_ref: team_ref(row.team),
                    played: row.played.unwrap_or_default(),
                    won: row.won.unwrap_or_default(),
                    drawn: row.drawn.unwrap_or_default(),
                    lost: row.lost.unwrap_or_default(),
                    points: row.points.unwrap_or_default(),
                    goal_difference: row.goal_difference.unwrap_or_default(),
                },
            )
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| rank.unwrap_or(u32::MAX));
    CanonicalTable {
        rows: ranked.into_iter().map(|(_, row)| row).collect(),
    }
}
