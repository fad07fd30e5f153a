//! Play resolution.
//!
//! One call to [`PossessionResolver::resolve`] plays out one trip down the
//! floor: ball handler, pre-shot foul and turnover rolls, then the shot with
//! its foul, block, assist and rebound sub-draws. It returns who has the ball
//! next and how that play starts (normal, fast break, put-back or side-out).

use sim_ai::{garbage_tier, is_clutch, SubstitutionManager};
use sim_core::{
    EngineConfig, EventKind, FoulKind, PlayerRef, ShotZone, Side, SimRng, SubReason, Team,
    TurnoverKind,
};
use tracing::trace;

use crate::error::SimError;
use crate::foul::{self, FoulCall};
use crate::rebound;
use crate::shot::{self, ShotContext, ShotSetup};
use crate::state::GameContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayKind {
    Normal,
    /// Live-ball steal run out by the stealer.
    FastBreak,
    /// Offensive rebound, forced close shot by the rebounder.
    Putback,
    /// Inbound after a non-shooting foul; same offense, short clock.
    SideOut,
}

/// How the next play starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextPlay {
    pub offense: Side,
    pub kind: PlayKind,
    /// Designated shooter for fast breaks and put-backs.
    pub shooter: Option<usize>,
}

impl NextPlay {
    pub fn new(offense: Side) -> Self {
        Self {
            offense,
            kind: PlayKind::Normal,
            shooter: None,
        }
    }

    fn with(offense: Side, kind: PlayKind, shooter: Option<usize>) -> Self {
        Self {
            offense,
            kind,
            shooter,
        }
    }

    /// Dead ball: the other side brings it up.
    fn change(offense: Side) -> Self {
        Self::new(offense.other())
    }
}

pub struct PossessionResolver<'a> {
    cfg: &'a EngineConfig,
    subs: SubstitutionManager<'a>,
}

impl<'a> PossessionResolver<'a> {
    pub fn new(cfg: &'a EngineConfig) -> Self {
        Self {
            cfg,
            subs: SubstitutionManager::new(cfg),
        }
    }

    pub fn substitutions(&self) -> &SubstitutionManager<'a> {
        &self.subs
    }

    /// Ball handler weighted by rating over the weakest player on court, a
    /// star multiplier and fatigue.
    pub fn select_handler(&self, team: &Team, rng: &mut SimRng) -> Result<usize, SimError> {
        let sel = &self.cfg.selection;
        let floor = team
            .on_court
            .iter()
            .map(|&i| team.roster[i].ratings.overall)
            .min()
            .ok_or_else(|| SimError::InvalidLineup {
                team: team.id.0.clone(),
                reason: "nobody on court".into(),
            })?;
        let weights: Vec<f64> = team
            .on_court
            .iter()
            .map(|&i| {
                let p = &team.roster[i];
                let mut w = 1.0 + sel.differential_factor * f64::from(p.ratings.overall - floor);
                if p.ratings.overall >= sel.star_threshold {
                    w *= sel.star_multiplier;
                }
                w * (1.0 - sel.fatigue_dampening * p.state.fatigue).max(0.1)
            })
            .collect();
        let k = rng.weighted_index(&weights).unwrap_or(0);
        Ok(team.on_court[k])
    }

    /// Plays one trip for `play.offense`.
    pub fn resolve(
        &self,
        ctx: &mut GameContext<'_>,
        play: NextPlay,
        rng: &mut SimRng,
    ) -> Result<NextPlay, SimError> {
        let offense = play.offense;
        let defense = offense.other();
        for side in [offense, defense] {
            let t = ctx.team(side);
            if t.on_court.len() != 5 {
                return Err(SimError::InvalidLineup {
                    team: t.id.0.clone(),
                    reason: format!("{} players on court", t.on_court.len()),
                });
            }
        }

        let designated = play
            .shooter
            .filter(|&i| ctx.team(offense).is_on_court(i));
        let handler = match designated {
            Some(i) => i,
            None => self.select_handler(ctx.team(offense), rng)?,
        };
        let handler_ref = PlayerRef::new(offense, handler);
        let defender = self.defender_of(ctx, handler_ref)?;
        trace!(?offense, handler, kind = ?play.kind, "play");

        let set_play = matches!(play.kind, PlayKind::Normal | PlayKind::SideOut);
        if set_play {
            if let Some(next) = self.pre_shot(ctx, handler_ref, defender, rng)? {
                return Ok(next);
            }
        }
        self.shoot(ctx, play, handler_ref, rng)
    }

    /// Matchup defender of `player`.
    fn defender_of(&self, ctx: &GameContext<'_>, player: PlayerRef) -> Result<PlayerRef, SimError> {
        let side = player.side.other();
        ctx.matchup(player)
            .map(|i| PlayerRef::new(side, i))
            .ok_or_else(|| SimError::InvalidLineup {
                team: ctx.team(side).id.0.clone(),
                reason: "no defender on court".into(),
            })
    }

    /// Flagrant, offensive foul, turnover and defensive foul rolls. `Some`
    /// ends the play before a shot goes up.
    fn pre_shot(
        &self,
        ctx: &mut GameContext<'_>,
        handler: PlayerRef,
        defender: PlayerRef,
        rng: &mut SimRng,
    ) -> Result<Option<NextPlay>, SimError> {
        let fc = &self.cfg.foul;
        let offense = handler.side;

        if rng.probability(fc.flagrant_pct / 100.0) {
            let call = foul::call_foul(ctx, fc, defender, handler, FoulKind::Flagrant, rng);
            if !call.overturned {
                foul::free_throws(ctx, fc, handler, 2, rng);
            }
            self.after_foul(ctx, defender, call)?;
            return Ok(Some(NextPlay::with(offense, PlayKind::SideOut, None)));
        }

        let handler_p = &ctx.team(offense).roster[handler.index];
        if rng.probability(foul::common_foul_pct(fc, fc.charging_pct, handler_p) / 100.0) {
            return self.offensive_foul(ctx, handler, defender, FoulKind::Charging, rng).map(Some);
        }
        if rng.probability(fc.illegal_screen_pct / 100.0) {
            let teammates: Vec<usize> = ctx
                .team(offense)
                .on_court
                .iter()
                .copied()
                .filter(|&i| i != handler.index)
                .collect();
            let pick = usize::try_from(rng.range(0, teammates.len() as i32 - 1)).unwrap_or(0);
            if let Some(&screener) = teammates.get(pick) {
                let screener = PlayerRef::new(offense, screener);
                let guarded_by = self.defender_of(ctx, screener)?;
                return self
                    .offensive_foul(ctx, screener, guarded_by, FoulKind::IllegalScreen, rng)
                    .map(Some);
            }
        }

        if rng.chance(self.turnover_pct(ctx, handler, defender)) {
            return Ok(Some(self.turnover(ctx, handler, defender, rng)));
        }

        let defender_p = &ctx.team(defender.side).roster[defender.index];
        let blocking = foul::common_foul_pct(fc, fc.blocking_pct, defender_p);
        let reach_in = foul::common_foul_pct(fc, fc.reach_in_pct, defender_p);
        let kind = if rng.probability(blocking / 100.0) {
            Some(FoulKind::Blocking)
        } else if rng.probability(reach_in / 100.0) {
            Some(FoulKind::ReachIn)
        } else {
            None
        };
        if let Some(kind) = kind {
            let call = foul::call_foul(ctx, fc, defender, handler, kind, rng);
            self.after_foul(ctx, defender, call)?;
            if !call.overturned {
                if call.in_bonus {
                    return self.free_throw_trip(ctx, handler, 2, rng).map(Some);
                }
                return Ok(Some(NextPlay::with(offense, PlayKind::SideOut, None)));
            }
        }
        Ok(None)
    }

    fn offensive_foul(
        &self,
        ctx: &mut GameContext<'_>,
        offender: PlayerRef,
        on: PlayerRef,
        kind: FoulKind,
        rng: &mut SimRng,
    ) -> Result<NextPlay, SimError> {
        let call = foul::call_foul(ctx, &self.cfg.foul, offender, on, kind, rng);
        if call.overturned {
            self.after_foul(ctx, offender, call)?;
            return Ok(NextPlay::with(offender.side, PlayKind::SideOut, None));
        }
        ctx.team_mut(offender.side).roster[offender.index].state.line.turnovers += 1;
        ctx.push(EventKind::Turnover {
            player: offender,
            kind: TurnoverKind::OffensiveFoul,
        });
        self.after_foul(ctx, offender, call)?;
        Ok(NextPlay::change(offender.side))
    }

    /// Turnover chance in percent: ball security of the handler against
    /// the defending lineup's hands.
    pub fn turnover_pct(&self, ctx: &GameContext<'_>, handler: PlayerRef, defender: PlayerRef) -> f64 {
        let tc = &self.cfg.turnover;
        let h = &ctx.team(handler.side).roster[handler.index];
        let pressure = ctx.team(defender.side).lineup_average(|p| p.ratings.steal);
        (tc.base_pct - tc.handler_factor * (f64::from(h.ratings.assist) - 70.0)
            + tc.pressure_factor * (pressure - 70.0))
            .clamp(tc.min_pct, tc.max_pct)
    }

    fn turnover(
        &self,
        ctx: &mut GameContext<'_>,
        handler: PlayerRef,
        defender: PlayerRef,
        rng: &mut SimRng,
    ) -> NextPlay {
        let tc = &self.cfg.turnover;
        let steal_rating = ctx.team(defender.side).roster[defender.index].ratings.steal;
        let bonus = tc
            .steal_tiers
            .iter()
            .find(|t| steal_rating >= t.threshold)
            .map_or(0.0, |t| t.bonus);
        ctx.team_mut(handler.side).roster[handler.index].state.line.turnovers += 1;

        if rng.chance(tc.steal_base_pct + bonus) {
            let fast_break = rng.chance(tc.fast_break_pct);
            ctx.team_mut(defender.side).roster[defender.index].state.line.steals += 1;
            ctx.push(EventKind::Turnover {
                player: handler,
                kind: TurnoverKind::Stolen,
            });
            ctx.push(EventKind::Steal {
                player: defender,
                from: handler,
                fast_break,
            });
            if fast_break {
                return NextPlay::with(defender.side, PlayKind::FastBreak, Some(defender.index));
            }
            return NextPlay::new(defender.side);
        }

        let kind = match rng.weighted_index(&[tc.bad_pass_weight, tc.travel_weight, tc.out_of_bounds_weight]) {
            Some(1) => TurnoverKind::Travel,
            Some(2) => TurnoverKind::OutOfBounds,
            _ => TurnoverKind::BadPass,
        };
        ctx.push(EventKind::Turnover {
            player: handler,
            kind,
        });
        NextPlay::change(handler.side)
    }

    fn shoot(
        &self,
        ctx: &mut GameContext<'_>,
        play: NextPlay,
        shooter: PlayerRef,
        rng: &mut SimRng,
    ) -> Result<NextPlay, SimError> {
        let offense = shooter.side;
        let putback = play.kind == PlayKind::Putback;
        let fast_break = play.kind == PlayKind::FastBreak;
        let defender = self.defender_of(ctx, shooter)?;
        let situation = ctx.situation(offense);
        let shot_ctx = ShotContext {
            home: offense == Side::Home,
            fast_break,
            putback,
            clutch: is_clutch(&self.cfg.situation, &situation),
            garbage: garbage_tier(&self.cfg.substitution, &situation).is_some(),
        };

        let setup = {
            let shooter_p = &ctx.team(offense).roster[shooter.index];
            shot::choose_shot(&self.cfg.shot, shooter_p, putback, rng)
        };
        let (foul_pct, mut make_pct) = {
            let shooter_p = &ctx.team(offense).roster[shooter.index];
            let defense = ctx.team(defender.side);
            let defender_p = &defense.roster[defender.index];
            let help = defense.lineup_average(|p| p.ratings.zone_defense(setup.zone));
            (
                foul::shooting_foul_pct(&self.cfg.foul, shooter_p, defender_p, setup.zone),
                shot::make_pct(self.cfg, shooter_p, defender_p, help, &setup, &shot_ctx),
            )
        };

        let mut fouled = rng.probability(foul_pct / 100.0);
        if fouled {
            make_pct *= self.cfg.foul.and_one_make_factor;
        }
        let made = rng.chance(make_pct);
        let call = if fouled {
            if made {
                self.record_make(ctx, shooter, &setup, putback, fast_break, rng);
            }
            let call = foul::call_foul(ctx, &self.cfg.foul, defender, shooter, FoulKind::Shooting, rng);
            fouled = !call.overturned;
            Some(call)
        } else {
            None
        };
        if let Some(call) = call {
            self.after_foul(ctx, defender, call)?;
        }

        match (fouled, made) {
            (true, true) => self.free_throw_trip(ctx, shooter, 1, rng),
            (true, false) => {
                let count = u8::try_from(setup.points()).unwrap_or(2);
                self.free_throw_trip(ctx, shooter, count, rng)
            }
            // Overturned shooting foul on a make: the basket already counted.
            (false, true) if call.is_some() => Ok(NextPlay::change(offense)),
            (false, true) => {
                self.record_make(ctx, shooter, &setup, putback, fast_break, rng);
                Ok(NextPlay::change(offense))
            }
            (false, false) => {
                self.record_miss(ctx, shooter, defender, &setup, rng);
                Ok(self.after_miss(ctx, offense, Some(setup.zone), rng))
            }
        }
    }

    fn record_make(
        &self,
        ctx: &mut GameContext<'_>,
        shooter: PlayerRef,
        setup: &ShotSetup,
        putback: bool,
        fast_break: bool,
        rng: &mut SimRng,
    ) {
        let points = setup.points();
        ctx.team_mut(shooter.side).roster[shooter.index]
            .state
            .line
            .record_shot(setup.zone, true);
        ctx.add_points(shooter, points);
        let assist = if !putback && rng.chance(shot::assist_pct(&self.cfg.shot, setup)) {
            self.pick_assist(ctx.team(shooter.side), shooter.index, rng)
                .map(|i| PlayerRef::new(shooter.side, i))
        } else {
            None
        };
        if let Some(a) = assist {
            ctx.team_mut(a.side).roster[a.index].state.line.assists += 1;
        }
        ctx.push(EventKind::ShotMade {
            shooter,
            zone: setup.zone,
            shot: setup.kind,
            distance: setup.distance,
            points,
            assist,
            fast_break,
        });
    }

    fn record_miss(
        &self,
        ctx: &mut GameContext<'_>,
        shooter: PlayerRef,
        defender: PlayerRef,
        setup: &ShotSetup,
        rng: &mut SimRng,
    ) {
        ctx.team_mut(shooter.side).roster[shooter.index]
            .state
            .line
            .record_shot(setup.zone, false);
        let block = {
            let d = &ctx.team(defender.side).roster[defender.index];
            shot::block_pct(&self.cfg.shot, d, setup.zone)
        };
        let blocked_by = rng.chance(block).then_some(defender);
        if let Some(b) = blocked_by {
            ctx.team_mut(b.side).roster[b.index].state.line.blocks += 1;
        }
        ctx.push(EventKind::ShotMissed {
            shooter,
            zone: setup.zone,
            shot: setup.kind,
            distance: setup.distance,
            blocked_by,
        });
    }

    /// Passer weighted by assist rating among the other four on court.
    fn pick_assist(&self, team: &Team, shooter: usize, rng: &mut SimRng) -> Option<usize> {
        let mates: Vec<usize> = team.on_court.iter().copied().filter(|&i| i != shooter).collect();
        let weights: Vec<f64> = mates
            .iter()
            .map(|&i| f64::from(team.roster[i].ratings.assist.max(1)))
            .collect();
        rng.weighted_index(&weights).and_then(|k| mates.get(k).copied())
    }

    fn free_throw_trip(
        &self,
        ctx: &mut GameContext<'_>,
        shooter: PlayerRef,
        count: u8,
        rng: &mut SimRng,
    ) -> Result<NextPlay, SimError> {
        if foul::free_throws(ctx, &self.cfg.foul, shooter, count, rng) {
            return Ok(NextPlay::change(shooter.side));
        }
        Ok(self.after_miss(ctx, shooter.side, None, rng))
    }

    fn after_miss(
        &self,
        ctx: &mut GameContext<'_>,
        offense: Side,
        zone: Option<ShotZone>,
        rng: &mut SimRng,
    ) -> NextPlay {
        match rebound::rebound(ctx, &self.cfg.rebound, offense, zone, rng) {
            Some(r) if r.side == offense => NextPlay::with(offense, PlayKind::Putback, Some(r.index)),
            Some(r) => NextPlay::new(r.side),
            None => NextPlay::change(offense),
        }
    }

    /// Sends a fouled-out player to the bench right away; a player who just
    /// reached foul trouble gets a forced rotation look.
    fn after_foul(&self, ctx: &mut GameContext<'_>, offender: PlayerRef, call: FoulCall) -> Result<(), SimError> {
        if call.overturned {
            return Ok(());
        }
        if call.fouled_out {
            return self.force_out(ctx, offender, SubReason::FouledOut);
        }
        let situation = ctx.situation(offender.side);
        if let Some(sub) = self
            .subs
            .foul_trouble(ctx.team_mut(offender.side), offender.index, &situation)
        {
            ctx.push(EventKind::Substitution {
                out: PlayerRef::new(offender.side, sub.out),
                into: PlayerRef::new(offender.side, sub.into),
                reason: sub.reason,
            });
        }
        Ok(())
    }

    /// Replaces an on-court player who can no longer play.
    pub fn force_out(&self, ctx: &mut GameContext<'_>, player: PlayerRef, reason: SubReason) -> Result<(), SimError> {
        if !ctx.team(player.side).is_on_court(player.index) {
            return Ok(());
        }
        let situation = ctx.situation(player.side);
        let sub = self
            .subs
            .replace(ctx.team_mut(player.side), player.index, reason, &situation)?;
        ctx.push(EventKind::Substitution {
            out: PlayerRef::new(player.side, sub.out),
            into: PlayerRef::new(player.side, sub.into),
            reason: sub.reason,
        });
        Ok(())
    }

    /// Independent per-play injury draw over the ten players on court.
    /// Low durability makes a player more likely to be the one hurt.
    pub fn injury_check(&self, ctx: &mut GameContext<'_>, rng: &mut SimRng) -> Result<(), SimError> {
        if !rng.probability(self.cfg.injury.per_play_probability) {
            return Ok(());
        }
        let mut candidates: Vec<PlayerRef> = Vec::with_capacity(10);
        let mut weights: Vec<f64> = Vec::with_capacity(10);
        for side in [Side::Home, Side::Away] {
            let t = ctx.team(side);
            for &i in &t.on_court {
                candidates.push(PlayerRef::new(side, i));
                weights.push(101.0 - f64::from(t.roster[i].ratings.durability));
            }
        }
        let Some(victim) = rng.weighted_index(&weights).and_then(|k| candidates.get(k).copied()) else {
            return Ok(());
        };
        ctx.team_mut(victim.side).roster[victim.index].state.injured = true;
        ctx.push(EventKind::Injury { player: victim });
        self.force_out(ctx, victim, SubReason::Injury)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::fixtures::default_team;
    use sim_core::Conference;

    fn teams() -> (Team, Team) {
        let mut home = default_team("H", Conference::East);
        let mut away = default_team("A", Conference::West);
        home.reset_for_game();
        away.reset_for_game();
        (home, away)
    }

    #[test]
    fn stars_get_the_ball_more() {
        let cfg = EngineConfig::default();
        let resolver = PossessionResolver::new(&cfg);
        let (mut home, _) = teams();
        home.roster[2].ratings.overall = 92;
        let mut rng = SimRng::new(4);
        let mut counts = [0u32; 12];
        for _ in 0..2000 {
            counts[resolver.select_handler(&home, &mut rng).unwrap()] += 1;
        }
        let max = counts.iter().enumerate().max_by_key(|(_, c)| **c).map(|(i, _)| i);
        assert_eq!(max, Some(2));
        assert!(counts[5..].iter().all(|&c| c == 0));
    }

    #[test]
    fn plays_alternate_possession_and_keep_the_log_aligned() {
        let cfg = EngineConfig::default();
        let resolver = PossessionResolver::new(&cfg);
        let (mut home, mut away) = teams();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(1, 720);
        let mut rng = SimRng::new(42);
        let mut play = NextPlay::new(Side::Home);
        for _ in 0..200 {
            let before = ctx.score();
            play = resolver.resolve(&mut ctx, play, &mut rng).unwrap();
            let after = ctx.score();
            assert!(after.home >= before.home && after.away >= before.away);
            if play.kind == PlayKind::Putback || play.kind == PlayKind::FastBreak {
                assert!(play.shooter.is_some());
            }
        }
        let log = ctx.log();
        assert_eq!(log.events.len(), log.scores.len());
        assert_eq!(log.events.len(), log.times.len());
        assert!(ctx.score().home > 0 && ctx.score().away > 0);
    }

    #[test]
    fn putback_is_a_close_shot_by_the_rebounder() {
        let mut cfg = EngineConfig::default();
        cfg.foul.shooting_foul_pct = 0.0;
        cfg.foul.draw_foul_factor = 0.0;
        cfg.foul.tendency_factor = 0.0;
        cfg.foul.close_shot_extra = 0.0;
        let resolver = PossessionResolver::new(&cfg);
        let (mut home, mut away) = teams();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(1, 720);
        let mut rng = SimRng::new(8);
        let play = NextPlay::with(Side::Away, PlayKind::Putback, Some(4));
        resolver.resolve(&mut ctx, play, &mut rng).unwrap();
        let first = &ctx.log().events[0].kind;
        match first {
            EventKind::ShotMade { shooter, zone, .. } | EventKind::ShotMissed { shooter, zone, .. } => {
                assert_eq!(*shooter, PlayerRef::new(Side::Away, 4));
                assert_eq!(*zone, ShotZone::Close);
            }
            other => panic!("expected a shot, got {other:?}"),
        }
    }

    #[test]
    fn injuries_force_a_substitution() {
        let mut cfg = EngineConfig::default();
        cfg.injury.per_play_probability = 1.0;
        let resolver = PossessionResolver::new(&cfg);
        let (mut home, mut away) = teams();
        let mut ctx = GameContext::new(&mut home, &mut away, 4);
        ctx.start_period(2, 500);
        let mut rng = SimRng::new(3);
        resolver.injury_check(&mut ctx, &mut rng).unwrap();
        let kinds: Vec<&EventKind> = ctx.log().events.iter().map(|e| &e.kind).collect();
        let EventKind::Injury { player } = kinds[0] else {
            panic!("expected injury first");
        };
        assert!(matches!(
            kinds[1],
            EventKind::Substitution { out, reason: SubReason::Injury, .. } if out == player
        ));
        assert!(!ctx.team(player.side).is_on_court(player.index));
        assert_eq!(ctx.team(player.side).on_court.len(), 5);
    }

    #[test]
    fn careless_handlers_under_pressure_turn_it_over_more() {
        let cfg = EngineConfig::default();
        let resolver = PossessionResolver::new(&cfg);
        let (mut home, mut away) = teams();
        home.roster[1].ratings.assist = 20;
        for &i in &away.on_court {
            away.roster[i].ratings.steal = 100;
        }
        let ctx = GameContext::new(&mut home, &mut away, 4);
        let defender = PlayerRef::new(Side::Away, 0);
        let careful = resolver.turnover_pct(&ctx, PlayerRef::new(Side::Home, 0), defender);
        let careless = resolver.turnover_pct(&ctx, PlayerRef::new(Side::Home, 1), defender);
        assert!(careless > careful);
        assert!(careless <= cfg.turnover.max_pct);
        assert!(careful >= cfg.turnover.min_pct);
    }
}
