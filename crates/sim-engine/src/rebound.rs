//! Rebounds after missed shots and free throws.

use sim_core::config::ReboundConfig;
use sim_core::{EventKind, PlayerRef, ShotZone, Side, SimRng, Team};

use crate::state::GameContext;

/// Offensive rebound chance in percent. `zone` is `None` after a missed free throw.
pub fn offensive_pct(cfg: &ReboundConfig, offense: &Team, defense: &Team, zone: Option<ShotZone>) -> f64 {
    let mut pct = match zone {
        Some(ShotZone::Close) => cfg.offensive_pct + cfg.close_shot_bonus,
        Some(_) => cfg.offensive_pct,
        None => cfg.free_throw_offensive_pct,
    };
    let off = offense.lineup_average(|p| p.ratings.offensive_rebound);
    let def = defense.lineup_average(|p| p.ratings.defensive_rebound);
    pct += cfg.rating_factor * (off - def);
    pct.clamp(cfg.min_pct, cfg.max_pct)
}

/// Roster index of the rebounder, drawn with weights `rating ^ exponent`.
pub fn pick_rebounder(cfg: &ReboundConfig, team: &Team, offensive: bool, rng: &mut SimRng) -> Option<usize> {
    let weights: Vec<f64> = team
        .on_court
        .iter()
        .map(|&i| {
            let r = &team.roster[i].ratings;
            let rating = if offensive {
                r.offensive_rebound
            } else {
                r.defensive_rebound
            };
            f64::from(rating.max(1)).powf(cfg.exponent)
        })
        .collect();
    rng.weighted_index(&weights).and_then(|k| team.on_court.get(k).copied())
}

/// Resolves a rebound after `offense` missed. Returns the rebounder.
pub fn rebound(
    ctx: &mut GameContext<'_>,
    cfg: &ReboundConfig,
    offense: Side,
    zone: Option<ShotZone>,
    rng: &mut SimRng,
) -> Option<PlayerRef> {
    let pct = offensive_pct(cfg, ctx.team(offense), ctx.team(offense.other()), zone);
    let offensive = rng.chance(pct);
    let side = if offensive { offense } else { offense.other() };
    let index = pick_rebounder(cfg, ctx.team(side), offensive, rng)?;
    let line = &mut ctx.team_mut(side).roster[index].state.line;
    line.rebounds += 1;
    if offensive {
        line.offensive_rebounds += 1;
    }
    let player = PlayerRef::new(side, index);
    ctx.push(EventKind::Rebound { player, offensive });
    Some(player)
}
