//! Win-loss records and conference standings.

use serde::{Deserialize, Serialize};
use sim_core::{Conference, GameResult, League, TeamId};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl TeamRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            g => f64::from(self.wins) / f64::from(g),
        }
    }

    pub fn point_diff(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

/// Regular-season records keyed by team.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Records {
    pub teams: BTreeMap<TeamId, TeamRecord>,
}

impl Records {
    /// Empty records for every team in the league.
    pub fn for_league(league: &League) -> Self {
        Self {
            teams: league
                .teams
                .iter()
                .map(|t| (t.id.clone(), TeamRecord::default()))
                .collect(),
        }
    }

    pub fn record_game(&mut self, r: &GameResult) {
        let home_won = r.home_score > r.away_score;
        let home = self.teams.entry(r.home.clone()).or_default();
        home.points_for += r.home_score;
        home.points_against += r.away_score;
        if home_won {
            home.wins += 1;
            home.home_wins += 1;
        } else {
            home.losses += 1;
        }
        let away = self.teams.entry(r.away.clone()).or_default();
        away.points_for += r.away_score;
        away.points_against += r.home_score;
        if home_won {
            away.losses += 1;
        } else {
            away.wins += 1;
            away.away_wins += 1;
        }
    }

    pub fn get(&self, id: &TeamId) -> Option<&TeamRecord> {
        self.teams.get(id)
    }
}

/// One row of a conference table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub seed: usize,
    pub team: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    /// Half the win-loss differential against the conference leader.
    pub games_back: f64,
    pub point_diff: i64,
}

/// Better record first: win percentage, then point differential, then name.
pub fn compare_records(a: (&TeamId, &TeamRecord), b: (&TeamId, &TeamRecord)) -> Ordering {
    b.1.win_pct()
        .total_cmp(&a.1.win_pct())
        .then_with(|| b.1.point_diff().cmp(&a.1.point_diff()))
        .then_with(|| a.0.cmp(b.0))
}

/// Ranked table for `conference`, seeds starting at 1.
pub fn conference_standings(league: &League, records: &Records, conference: Conference) -> Vec<StandingEntry> {
    let empty = TeamRecord::default();
    let mut rows: Vec<(&TeamId, &TeamRecord)> = league
        .teams
        .iter()
        .filter(|t| t.conference == conference)
        .map(|t| (&t.id, records.get(&t.id).unwrap_or(&empty)))
        .collect();
    rows.sort_by(|a, b| compare_records(*a, *b));
    let Some(&(_, leader)) = rows.first() else {
        return Vec::new();
    };
    let (lw, ll) = (i64::from(leader.wins), i64::from(leader.losses));
    rows.iter()
        .enumerate()
        .map(|(i, (id, rec))| {
            let gb = ((lw - i64::from(rec.wins)) + (i64::from(rec.losses) - ll)) as f64 / 2.0;
            StandingEntry {
                seed: i + 1,
                team: (*id).clone(),
                wins: rec.wins,
                losses: rec.losses,
                win_pct: rec.win_pct(),
                games_back: gb,
                point_diff: rec.point_diff(),
            }
        })
        .collect()
}
