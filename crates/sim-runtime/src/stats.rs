//! Running player and team totals with leaderboards.

use serde::{Deserialize, Serialize};
use sim_core::{GameResult, Position, Side, StatLine, TeamId};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeason {
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub games: u32,
    pub seconds: u32,
    pub totals: StatLine,
}

impl PlayerSeason {
    fn per_game(&self, total: u32) -> f64 {
        match self.games {
            0 => 0.0,
            g => f64::from(total) / f64::from(g),
        }
    }

    pub fn points_per_game(&self) -> f64 {
        self.per_game(self.totals.points)
    }

    pub fn value(&self, stat: PlayerStat) -> Option<f64> {
        let t = &self.totals;
        Some(match stat {
            PlayerStat::Points => self.per_game(t.points),
            PlayerStat::Rebounds => self.per_game(t.rebounds),
            PlayerStat::Assists => self.per_game(t.assists),
            PlayerStat::Steals => self.per_game(t.steals),
            PlayerStat::Blocks => self.per_game(t.blocks),
            PlayerStat::Turnovers => self.per_game(t.turnovers),
            PlayerStat::Minutes => self.per_game(self.seconds) / 60.0,
            PlayerStat::FieldGoalPct => t.field_goal_pct()?,
            PlayerStat::ThreePointPct => t.three_point_pct()?,
            PlayerStat::FreeThrowPct => t.free_throw_pct()?,
            PlayerStat::TrueShooting => t.true_shooting()?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeason {
    pub games: u32,
    pub totals: StatLine,
    /// Opponents' combined lines in games against this team.
    pub allowed: StatLine,
}

impl TeamSeason {
    pub fn value(&self, stat: TeamStat) -> Option<f64> {
        if self.games == 0 {
            return None;
        }
        let g = f64::from(self.games);
        let (t, a) = (&self.totals, &self.allowed);
        Some(match stat {
            TeamStat::Points => f64::from(t.points) / g,
            TeamStat::Rebounds => f64::from(t.rebounds) / g,
            TeamStat::Assists => f64::from(t.assists) / g,
            TeamStat::Steals => f64::from(t.steals) / g,
            TeamStat::Blocks => f64::from(t.blocks) / g,
            TeamStat::Turnovers => f64::from(t.turnovers) / g,
            TeamStat::FieldGoalPct => t.field_goal_pct()?,
            TeamStat::ThreePointPct => t.three_point_pct()?,
            TeamStat::PointsAllowed => f64::from(a.points) / g,
            TeamStat::ReboundsAllowed => f64::from(a.rebounds) / g,
            TeamStat::FieldGoalPctAllowed => a.field_goal_pct()?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    Minutes,
    FieldGoalPct,
    ThreePointPct,
    FreeThrowPct,
    TrueShooting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamStat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    FieldGoalPct,
    ThreePointPct,
    PointsAllowed,
    ReboundsAllowed,
    FieldGoalPctAllowed,
}

impl TeamStat {
    /// Lower is better for everything given up to opponents.
    pub fn ascending(self) -> bool {
        matches!(
            self,
            TeamStat::PointsAllowed | TeamStat::ReboundsAllowed | TeamStat::FieldGoalPctAllowed
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub rank: usize,
    pub name: String,
    pub team: TeamId,
    pub games: u32,
    pub value: f64,
}

/// Accumulated box scores, for a season or a single series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub players: Vec<PlayerSeason>,
    pub teams: BTreeMap<TeamId, TeamSeason>,
    #[serde(skip)]
    index: BTreeMap<(TeamId, String), usize>,
}

impl SeasonStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one game. Players count a game played only if they logged minutes.
    pub fn record_game(&mut self, r: &GameResult) {
        for side in [Side::Home, Side::Away] {
            let team_box = r.box_score.side(side);
            let opp_box = r.box_score.side(side.other());
            let ts = self.teams.entry(team_box.team.clone()).or_default();
            ts.games += 1;
            ts.totals.accumulate(&team_box.totals);
            ts.allowed.accumulate(&opp_box.totals);

            for line in &team_box.players {
                if line.seconds_played == 0 {
                    continue;
                }
                let i = self.slot(&team_box.team, &line.name, line.position);
                let p = &mut self.players[i];
                p.games += 1;
                p.seconds += line.seconds_played;
                p.totals.accumulate(&line.stats);
            }
        }
    }

    fn slot(&mut self, team: &TeamId, name: &str, position: Position) -> usize {
        let key = (team.clone(), name.to_string());
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = match self
            .players
            .iter()
            .position(|p| &p.team == team && p.name == name)
        {
            Some(i) => i,
            None => {
                self.players.push(PlayerSeason {
                    name: name.to_string(),
                    team: team.clone(),
                    position,
                    games: 0,
                    seconds: 0,
                    totals: StatLine::default(),
                });
                self.players.len() - 1
            }
        };
        self.index.insert(key, i);
        i
    }

    pub fn player(&self, team: &TeamId, name: &str) -> Option<&PlayerSeason> {
        self.players.iter().find(|p| &p.team == team && p.name == name)
    }

    pub fn team(&self, team: &TeamId) -> Option<&TeamSeason> {
        self.teams.get(team)
    }

    /// Top `limit` players by a per-game or percentage stat, best first.
    /// Ties rank by name.
    pub fn player_leaders(&self, stat: PlayerStat, limit: usize, min_games: u32) -> Vec<LeaderEntry> {
        let mut rows: Vec<LeaderEntry> = self
            .players
            .iter()
            .filter(|p| p.games >= min_games.max(1))
            .filter_map(|p| {
                Some(LeaderEntry {
                    rank: 0,
                    name: p.name.clone(),
                    team: p.team.clone(),
                    games: p.games,
                    value: p.value(stat)?,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        rank(rows, limit)
    }

    /// Team leaderboard; "allowed" stats rank ascending.
    pub fn team_leaders(&self, stat: TeamStat, limit: usize) -> Vec<LeaderEntry> {
        let mut rows: Vec<LeaderEntry> = self
            .teams
            .iter()
            .filter_map(|(id, t)| {
                Some(LeaderEntry {
                    rank: 0,
                    name: id.to_string(),
                    team: id.clone(),
                    games: t.games,
                    value: t.value(stat)?,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            let ord = if stat.ascending() {
                a.value.total_cmp(&b.value)
            } else {
                b.value.total_cmp(&a.value)
            };
            ord.then_with(|| a.name.cmp(&b.name))
        });
        rank(rows, limit)
    }
}

fn rank(mut rows: Vec<LeaderEntry>, limit: usize) -> Vec<LeaderEntry> {
    rows.truncate(limit);
    for (i, r) in rows.iter_mut().enumerate() {
        r.rank = i + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted_result;
    use sim_core::fixtures::sample_league;

    #[test]
    fn totals_follow_box_scores() {
        let league = sample_league(2);
        let (h, a) = (league.teams[0].id.clone(), league.teams[1].id.clone());
        let mut stats = SeasonStats::new();
        stats.record_game(&scripted_result(&league, &h, &a, true));
        stats.record_game(&scripted_result(&league, &a, &h, true));
        let home = stats.team(&h).unwrap();
        assert_eq!(home.games, 2);
        assert_eq!(home.totals.points + home.allowed.points, 2 * (100 + 90));
        let star = stats.player(&h, &league.teams[0].roster[0].name).unwrap();
        assert_eq!(star.games, 2);
        assert_eq!(star.totals.points, 190);
        // Benched for both games, so no entry.
        assert!(stats.player(&h, &league.teams[0].roster[11].name).is_none());
    }

    #[test]
    fn allowed_stats_rank_ascending() {
        let league = sample_league(2);
        let ids: Vec<TeamId> = league.teams.iter().map(|t| t.id.clone()).collect();
        let mut stats = SeasonStats::new();
        stats.record_game(&scripted_result(&league, &ids[0], &ids[1], true));
        let pts = stats.team_leaders(TeamStat::Points, 10);
        let allowed = stats.team_leaders(TeamStat::PointsAllowed, 10);
        assert_eq!(pts[0].team, ids[0]);
        assert_eq!(allowed[0].team, ids[0]);
        assert_eq!(allowed[0].value, 90.0);
        assert_eq!(allowed[0].rank, 1);

        let scorers = stats.player_leaders(PlayerStat::Points, 1, 1);
        assert_eq!(scorers.len(), 1);
        assert_eq!(scorers[0].value, 100.0);
    }

    #[test]
    fn survives_a_serde_round_trip() {
        let league = sample_league(2);
        let (h, a) = (league.teams[0].id.clone(), league.teams[1].id.clone());
        let mut stats = SeasonStats::new();
        stats.record_game(&scripted_result(&league, &h, &a, false));
        let json = serde_json::to_string(&stats).unwrap();
        let mut back: SeasonStats = serde_json::from_str(&json).unwrap();
        back.record_game(&scripted_result(&league, &h, &a, false));
        assert_eq!(back.players.len(), stats.players.len());
        assert_eq!(back.player(&a, &league.teams[1].roster[0].name).unwrap().games, 2);
    }
}
