//! Game state machine: tip-off, periods, overtime, full time.

use sim_core::{
    validate_team, BoxScore, EngineConfig, EventKind, GameResult, PlayerRef, Side, SimRng, Team,
    TeamBox,
};
use tracing::debug;

use crate::error::SimError;
use crate::fatigue;
use crate::possession::{NextPlay, PlayKind, PossessionResolver};
use crate::state::GameContext;

/// Plays a full game between `home` and `away` on the given stream.
///
/// Both teams are reset first and left in their post-game state: nobody on
/// court and fatigue decayed for the next game.
pub fn simulate_game(
    home: &mut Team,
    away: &mut Team,
    cfg: &EngineConfig,
    rng: &mut SimRng,
) -> Result<GameResult, SimError> {
    validate_team(home)?;
    validate_team(away)?;
    home.reset_for_game();
    away.reset_for_game();

    let resolver = PossessionResolver::new(cfg);
    let clock = &cfg.clock;
    let regulation = clock.regulation_periods.max(1);
    let mut ctx = GameContext::new(home, away, regulation);
    let mut period_scores = Vec::new();
    let mut tip_winner = Side::Home;
    let mut period: u8 = 1;

    loop {
        let overtime = period > regulation;
        let length = if overtime {
            clock.overtime_seconds
        } else {
            clock.quarter_seconds
        };
        ctx.start_period(period, length);
        let first = if period == 1 {
            tip_winner = jump_ball(&mut ctx, rng);
            tip_winner
        } else if overtime {
            ctx.push(EventKind::OvertimeStart { period });
            jump_ball(&mut ctx, rng)
        } else if period == regulation {
            tip_winner
        } else {
            tip_winner.other()
        };

        run_period(&resolver, &mut ctx, cfg, first, rng)?;

        let score = ctx.score();
        ctx.push(EventKind::PeriodEnd {
            period,
            home: score.home,
            away: score.away,
        });
        period_scores.push(score);
        debug!(period, home = score.home, away = score.away, "period over");
        if period >= regulation && score.home != score.away {
            break;
        }
        period_break(&resolver, &mut ctx, cfg, period == regulation / 2);
        period = period.saturating_add(1);
    }

    let score = ctx.score();
    ctx.push(EventKind::FullTime {
        home: score.home,
        away: score.away,
        periods: period,
    });
    let elapsed = ctx.elapsed;
    let log = ctx.into_log();

    home.finish_game(elapsed, cfg.fatigue.post_game_retain);
    away.finish_game(elapsed, cfg.fatigue.post_game_retain);
    let box_score = BoxScore {
        home: TeamBox::from_team(home),
        away: TeamBox::from_team(away),
    };
    let winner = if score.home > score.away {
        home.id.clone()
    } else {
        away.id.clone()
    };
    Ok(GameResult {
        home: home.id.clone(),
        away: away.id.clone(),
        home_score: score.home,
        away_score: score.away,
        period_scores,
        events: log.events,
        score_snapshots: log.scores,
        time_snapshots: log.times,
        box_score,
        winner,
        final_period: period,
        regulation_periods: regulation,
        seed: rng.seed(),
    })
}

/// Standalone game on its own stream.
pub fn simulate_game_seeded(
    home: &mut Team,
    away: &mut Team,
    cfg: &EngineConfig,
    seed: u64,
) -> Result<GameResult, SimError> {
    let mut rng = SimRng::new(seed);
    simulate_game(home, away, cfg, &mut rng)
}

/// Tip-off between the best leapers on court. Returns the side that wins it.
fn jump_ball(ctx: &mut GameContext<'_>, rng: &mut SimRng) -> Side {
    let jumper = |t: &Team| {
        t.on_court
            .iter()
            .copied()
            .max_by_key(|&i| {
                let r = &t.roster[i].ratings;
                (u16::from(r.athleticism) + u16::from(r.block), std::cmp::Reverse(i))
            })
            .unwrap_or(0)
    };
    let h = jumper(ctx.team(Side::Home));
    let a = jumper(ctx.team(Side::Away));
    let edge = f64::from(ctx.team(Side::Home).roster[h].ratings.athleticism)
        - f64::from(ctx.team(Side::Away).roster[a].ratings.athleticism);
    let winner = if rng.chance((50.0 + edge / 2.0).clamp(20.0, 80.0)) {
        Side::Home
    } else {
        Side::Away
    };
    ctx.push(EventKind::JumpBall {
        home: PlayerRef::new(Side::Home, h),
        away: PlayerRef::new(Side::Away, a),
        winner,
    });
    winner
}

fn run_period(
    resolver: &PossessionResolver<'_>,
    ctx: &mut GameContext<'_>,
    cfg: &EngineConfig,
    first: Side,
    rng: &mut SimRng,
) -> Result<(), SimError> {
    let mut play = NextPlay::new(first);
    while ctx.seconds_remaining > 0 {
        let range = match play.kind {
            PlayKind::Normal => cfg.clock.possession_seconds,
            PlayKind::FastBreak => cfg.clock.fast_break_seconds,
            PlayKind::Putback => cfg.clock.putback_seconds,
            PlayKind::SideOut => cfg.clock.side_out_seconds,
        };
        let low = i32::try_from(range.min).unwrap_or(i32::MAX);
        let high = i32::try_from(range.max).unwrap_or(i32::MAX);
        let drawn = u32::try_from(rng.range(low, high).max(1)).unwrap_or(1);
        let span = drawn.min(ctx.seconds_remaining);
        ctx.advance(span)?;
        fatigue::accrue(&cfg.fatigue, ctx.team_mut(Side::Home), span);
        fatigue::accrue(&cfg.fatigue, ctx.team_mut(Side::Away), span);

        play = resolver.resolve(ctx, play, rng)?;
        resolver.injury_check(ctx, rng)?;

        let dead_ball = matches!(play.kind, PlayKind::Normal | PlayKind::SideOut);
        if dead_ball && ctx.seconds_remaining > 0 {
            for side in [Side::Home, Side::Away] {
                let situation = ctx.situation(side);
                let subs = resolver
                    .substitutions()
                    .check(ctx.team_mut(side), &situation, rng);
                push_subs(ctx, side, &subs);
            }
        }
    }
    Ok(())
}

/// Fatigue recovery and a forced rotation look for both benches.
fn period_break(
    resolver: &PossessionResolver<'_>,
    ctx: &mut GameContext<'_>,
    cfg: &EngineConfig,
    halftime: bool,
) {
    for side in [Side::Home, Side::Away] {
        fatigue::period_break(&cfg.fatigue, ctx.team_mut(side), halftime);
    }
    for side in [Side::Home, Side::Away] {
        let situation = ctx.situation(side);
        let subs = resolver
            .substitutions()
            .end_of_period(ctx.team_mut(side), &situation);
        push_subs(ctx, side, &subs);
    }
}

fn push_subs(ctx: &mut GameContext<'_>, side: Side, subs: &[sim_ai::Substitution]) {
    for s in subs {
        ctx.push(EventKind::Substitution {
            out: PlayerRef::new(side, s.out),
            into: PlayerRef::new(side, s.into),
            reason: s.reason,
        });
    }
}
