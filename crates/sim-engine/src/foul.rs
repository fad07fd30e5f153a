//! Foul calls, coach's challenges and free throws.

use sim_core::config::FoulConfig;
use sim_core::{EventKind, FoulKind, Player, PlayerRef, ShotZone, SimRng};

use crate::state::GameContext;

/// Outcome of a called foul.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FoulCall {
    /// Defense was over the team-foul limit before this foul.
    pub in_bonus: bool,
    /// Reversed on a coach's challenge; nothing was charged.
    pub overturned: bool,
    pub fouled_out: bool,
}

/// Chance of a shooting foul on this attempt, in percent.
pub fn shooting_foul_pct(cfg: &FoulConfig, shooter: &Player, defender: &Player, zone: ShotZone) -> f64 {
    let mut pct = cfg.shooting_foul_pct
        + cfg.draw_foul_factor * (f64::from(shooter.ratings.draw_foul) - 50.0)
        + cfg.tendency_factor * (f64::from(defender.ratings.foul_tendency) - 50.0);
    match zone {
        ShotZone::Close => pct += cfg.close_shot_extra,
        ShotZone::Mid => {}
        ShotZone::Three => pct *= cfg.three_shot_scale,
    }
    pct.clamp(0.0, 100.0)
}

/// Tendency-scaled chance of a non-shooting foul with base percentage `base`.
pub fn common_foul_pct(cfg: &FoulConfig, base: f64, offender: &Player) -> f64 {
    let scale = 1.0 + cfg.tendency_factor * (f64::from(offender.ratings.foul_tendency) - 50.0) / 10.0;
    (base * scale.max(0.0)).clamp(0.0, 100.0)
}

pub fn free_throw_pct(cfg: &FoulConfig, shooter: &Player) -> f64 {
    (f64::from(shooter.ratings.free_throw) - cfg.free_throw_fatigue_penalty * shooter.state.fatigue)
        .clamp(cfg.free_throw_min_pct, cfg.free_throw_max_pct)
}

/// Calls a foul by `offender` on `on`. The penalized bench may challenge;
/// an upheld call is charged to the player (and to the team for defensive
/// fouls).
pub fn call_foul(
    ctx: &mut GameContext<'_>,
    cfg: &FoulConfig,
    offender: PlayerRef,
    on: PlayerRef,
    kind: FoulKind,
    rng: &mut SimRng,
) -> FoulCall {
    let defensive = !kind.is_offensive();
    let can_challenge =
        ctx.period >= cfg.challenge_from_period && ctx.team(offender.side).game.challenge_available;
    let challenged = can_challenge && rng.chance(cfg.challenge_pct);
    let overturned = challenged && rng.chance(cfg.challenge_success_pct);
    // An overturned call never counts toward the bonus.
    let in_bonus =
        defensive && !overturned && ctx.team(offender.side).game.period_fouls >= cfg.bonus_threshold;
    ctx.push(EventKind::Foul {
        player: offender,
        on,
        kind,
        in_bonus,
    });
    let mut call = FoulCall {
        in_bonus,
        overturned,
        fouled_out: false,
    };
    if challenged {
        ctx.team_mut(offender.side).game.challenge_available = false;
        ctx.push(EventKind::Challenge {
            side: offender.side,
            kind,
            overturned,
        });
        if overturned {
            return call;
        }
    }

    let team = ctx.team_mut(offender.side);
    if defensive {
        team.game.period_fouls += 1;
    }
    let p = &mut team.roster[offender.index];
    p.state.line.fouls += 1;
    if p.state.line.fouls >= cfg.foul_out_limit && !p.state.fouled_out {
        p.state.fouled_out = true;
        call.fouled_out = true;
        ctx.push(EventKind::FoulOut { player: offender });
    }
    call
}

/// Shoots `count` free throws, each drawn independently. Returns whether the
/// last one went in.
pub fn free_throws(
    ctx: &mut GameContext<'_>,
    cfg: &FoulConfig,
    shooter: PlayerRef,
    count: u8,
    rng: &mut SimRng,
) -> bool {
    let pct = free_throw_pct(cfg, &ctx.team(shooter.side).roster[shooter.index]);
    let mut made = false;
    for attempt in 1..=count {
        made = rng.chance(pct);
        ctx.team_mut(shooter.side).roster[shooter.index]
            .state
            .line
            .record_free_throw(made);
        if made {
            ctx.add_points(shooter, 1);
        }
        ctx.push(EventKind::FreeThrow {
            shooter,
            made,
            attempt,
            of: count,
        });
    }
    made
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::fixtures::default_team;
    use sim_core::{Conference, Side};

    #[test]
    fn three_point_fouls_are_rarer() {
        let cfg = FoulConfig::default();
        let t = default_team("T", Conference::East);
        let close = shooting_foul_pct(&cfg, &t.roster[0], &t.roster[1], ShotZone::Close);
        let mid = shooting_foul_pct(&cfg, &t.roster[0], &t.roster[1], ShotZone::Mid);
        let three = shooting_foul_pct(&cfg, &t.roster[0], &t.roster[1], ShotZone::Three);
        assert!(close > mid && mid > three);
    }

    #[test]
    fn tired_shooters_miss_more_free_throws() {
        let cfg = FoulConfig::default();
        let t = default_team("T", Conference::East);
        let mut tired = t.roster[0].clone();
        tired.state.fatigue = 80.0;
        assert!(free_throw_pct(&cfg, &tired) < free_throw_pct(&cfg, &t.roster[0]));
        tired.ratings.free_throw = 10;
        assert_eq!(free_throw_pct(&cfg, &tired), cfg.free_throw_min_pct);
    }

    #[test]
    fn sixth_foul_disqualifies_and_bonus_follows_team_fouls() {
        let cfg = FoulConfig {
            challenge_pct: 0.0,
            ..FoulConfig::default()
        };
        let mut home = default_team("H", Conference::East);
        let mut away = default_team("A", Conference::West);
        home.reset_for_game();
        away.reset_for_game();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(1, 720);
        let mut rng = SimRng::new(1);
        let offender = PlayerRef::new(Side::Home, 4);
        let on = PlayerRef::new(Side::Away, 4);
        let mut last = FoulCall::default();
        for _ in 0..6 {
            last = call_foul(&mut ctx, &cfg, offender, on, FoulKind::ReachIn, &mut rng);
        }
        assert!(last.in_bonus);
        assert!(last.fouled_out);
        assert_eq!(ctx.team(Side::Home).game.period_fouls, 6);
        assert!(matches!(
            ctx.log().events.last().map(|e| &e.kind),
            Some(EventKind::FoulOut { .. })
        ));
        // Offensive fouls are personal only.
        call_foul(&mut ctx, &cfg, on, offender, FoulKind::Charging, &mut rng);
        assert_eq!(ctx.team(Side::Away).game.period_fouls, 0);
        assert_eq!(ctx.team(Side::Away).roster[4].state.line.fouls, 1);
    }

    #[test]
    fn challenge_is_spent_once() {
        let cfg = FoulConfig {
            challenge_pct: 100.0,
            challenge_success_pct: 100.0,
            challenge_from_period: 1,
            ..FoulConfig::default()
        };
        let mut home = default_team("H", Conference::East);
        let mut away = default_team("A", Conference::West);
        home.reset_for_game();
        away.reset_for_game();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(1, 720);
        let mut rng = SimRng::new(2);
        let offender = PlayerRef::new(Side::Home, 0);
        let on = PlayerRef::new(Side::Away, 0);
        let first = call_foul(&mut ctx, &cfg, offender, on, FoulKind::Blocking, &mut rng);
        assert!(first.overturned);
        assert_eq!(ctx.team(Side::Home).roster[0].state.line.fouls, 0);
        let second = call_foul(&mut ctx, &cfg, offender, on, FoulKind::Blocking, &mut rng);
        assert!(!second.overturned);
        assert_eq!(ctx.team(Side::Home).roster[0].state.line.fouls, 1);
        assert!(!ctx.team(Side::Home).game.challenge_available);
    }

    #[test]
    fn overturned_call_is_not_logged_in_the_bonus() {
        let cfg = FoulConfig {
            challenge_pct: 100.0,
            challenge_success_pct: 100.0,
            challenge_from_period: 1,
            ..FoulConfig::default()
        };
        let mut home = default_team("H", Conference::East);
        let mut away = default_team("A", Conference::West);
        home.reset_for_game();
        away.reset_for_game();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(2, 400);
        ctx.team_mut(Side::Home).game.period_fouls = cfg.bonus_threshold + 1;
        let mut rng = SimRng::new(5);
        let offender = PlayerRef::new(Side::Home, 2);
        let on = PlayerRef::new(Side::Away, 2);
        let call = call_foul(&mut ctx, &cfg, offender, on, FoulKind::ReachIn, &mut rng);
        assert!(call.overturned && !call.in_bonus);
        let kinds: Vec<&EventKind> = ctx.log().events.iter().map(|e| &e.kind).collect();
        assert!(matches!(kinds[0], EventKind::Foul { in_bonus: false, .. }));
        assert!(matches!(kinds[1], EventKind::Challenge { overturned: true, .. }));

        // The next call, upheld, is in the bonus.
        let call = call_foul(&mut ctx, &cfg, offender, on, FoulKind::ReachIn, &mut rng);
        assert!(!call.overturned && call.in_bonus);
        assert!(matches!(
            ctx.log().events.last().map(|e| &e.kind),
            Some(EventKind::Foul { in_bonus: true, .. })
        ));
    }

    #[test]
    fn free_throws_are_logged_one_by_one() {
        let cfg = FoulConfig::default();
        let mut home = default_team("H", Conference::East);
        let mut away = default_team("A", Conference::West);
        home.reset_for_game();
        away.reset_for_game();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(1, 720);
        let mut rng = SimRng::new(11);
        let shooter = PlayerRef::new(Side::Away, 1);
        free_throws(&mut ctx, &cfg, shooter, 3, &mut rng);
        let log = ctx.log();
        assert_eq!(log.len(), 3);
        let made = log
            .events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::FreeThrow { made: true, .. }))
            .count() as u32;
        assert_eq!(ctx.score().away, made);
        assert_eq!(ctx.team(Side::Away).roster[1].state.line.ft_attempts, 3);
    }
}
