//! Composite MVP ranking for series, finals and the regular season.

use serde::{Deserialize, Serialize};
use sim_core::config::MvpWeights;
use sim_core::TeamId;
use std::cmp::Ordering;

use crate::standings::Records;
use crate::stats::{PlayerSeason, SeasonStats};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MvpEntry {
    pub name: String,
    pub team: TeamId,
    pub games: u32,
    pub score: f64,
    pub points_per_game: f64,
    pub rebounds_per_game: f64,
    pub assists_per_game: f64,
}

/// Weighted per-game production plus a true-shooting bonus over the baseline.
pub fn composite(w: &MvpWeights, p: &PlayerSeason) -> f64 {
    if p.games == 0 {
        return 0.0;
    }
    let g = f64::from(p.games);
    let t = &p.totals;
    let per = |v: u32| f64::from(v) / g;
    let ts_bonus = t
        .true_shooting()
        .map_or(0.0, |ts| w.true_shooting * (ts - w.true_shooting_baseline));
    w.points * per(t.points)
        + w.rebounds * per(t.rebounds)
        + w.assists * per(t.assists)
        + w.steals * per(t.steals)
        + w.blocks * per(t.blocks)
        - w.turnovers * per(t.turnovers)
        + ts_bonus
}

fn entry(p: &PlayerSeason, score: f64) -> MvpEntry {
    let g = f64::from(p.games.max(1));
    MvpEntry {
        name: p.name.clone(),
        team: p.team.clone(),
        games: p.games,
        score,
        points_per_game: f64::from(p.totals.points) / g,
        rebounds_per_game: f64::from(p.totals.rebounds) / g,
        assists_per_game: f64::from(p.totals.assists) / g,
    }
}

/// Higher score, then higher scoring average, then name.
fn better(a: &MvpEntry, b: &MvpEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.points_per_game.total_cmp(&a.points_per_game))
        .then_with(|| a.name.cmp(&b.name))
}

fn best<'a>(candidates: impl Iterator<Item = (&'a PlayerSeason, f64)>) -> Option<MvpEntry> {
    candidates
        .map(|(p, score)| entry(p, score))
        .min_by(better)
}

/// Best player on the series winner, from the series' own stats.
pub fn series_mvp(stats: &SeasonStats, winner: &TeamId, w: &MvpWeights) -> Option<MvpEntry> {
    best(
        stats
            .players
            .iter()
            .filter(|p| &p.team == winner && p.games > 0)
            .map(|p| (p, composite(w, p))),
    )
}

/// Best player from either finals team.
pub fn finals_mvp(stats: &SeasonStats, w: &MvpWeights) -> Option<MvpEntry> {
    best(
        stats
            .players
            .iter()
            .filter(|p| p.games > 0)
            .map(|p| (p, composite(w, p))),
    )
}

/// Regular-season MVP. Players must have appeared in at least
/// `min_games_fraction` of their team's games; team winning percentage adds
/// `win_pct` weight on top of the composite.
pub fn season_mvp(stats: &SeasonStats, records: &Records, w: &MvpWeights) -> Option<MvpEntry> {
    best(stats.players.iter().filter_map(|p| {
        let rec = records.get(&p.team)?;
        let needed = (w.min_games_fraction * f64::from(rec.games())).ceil();
        if p.games == 0 || f64::from(p.games) < needed {
            return None;
        }
        Some((p, composite(w, p) + w.win_pct * rec.win_pct()))
    }))
}
