//! Shot selection and make probability.
//!
//! A shot is built in three draws: the zone (weighted by the shooter's zone
//! ratings), a distance inside that zone, and the finish (layup, dunk or
//! jumper) conditioned on the distance and the shooter's dunker tier. The make
//! percentage starts from a distance curve and is adjusted additively for
//! shooter and defense, then scaled for clutch and garbage time and clamped.

use sim_core::config::{CurvePoint, DistanceRange, EngineConfig, ShotConfig, ShotSplit};
use sim_core::{DunkerType, Player, ShotKind, ShotZone, SimRng};

/// Where and how a shot is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShotSetup {
    pub zone: ShotZone,
    pub distance: u8,
    pub kind: ShotKind,
}

impl ShotSetup {
    pub fn points(&self) -> u32 {
        self.zone.points()
    }
}

/// Game conditions around a shot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShotContext {
    pub home: bool,
    pub fast_break: bool,
    pub putback: bool,
    pub clutch: bool,
    pub garbage: bool,
}

/// Linear interpolation over a distance curve, flat beyond both ends.
pub fn interpolate(curve: &[CurvePoint], distance: u8) -> f64 {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return 0.0;
    };
    if distance <= first.distance {
        return first.pct;
    }
    if distance >= last.distance {
        return last.pct;
    }
    for pair in curve.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if distance <= b.distance {
            let span = f64::from(b.distance - a.distance);
            if span <= 0.0 {
                return b.pct;
            }
            let t = f64::from(distance - a.distance) / span;
            return a.pct + (b.pct - a.pct) * t;
        }
    }
    last.pct
}

pub fn zone_range(cfg: &ShotConfig, zone: ShotZone) -> DistanceRange {
    match zone {
        ShotZone::Close => cfg.close_distance,
        ShotZone::Mid => cfg.mid_distance,
        ShotZone::Three => cfg.three_distance,
    }
}

/// Zone weights for a shooter, each at least one point.
pub fn zone_weights(cfg: &ShotConfig, shooter: &Player) -> [f64; 3] {
    let r = &shooter.ratings;
    let adj = |base: f64, rating: u8| (base + cfg.zone_rating_factor * (f64::from(rating) - 70.0)).max(1.0);
    [
        adj(cfg.close_weight, r.zone_rating(ShotZone::Close)),
        adj(cfg.mid_weight, r.zone_rating(ShotZone::Mid)),
        adj(cfg.three_weight, r.zone_rating(ShotZone::Three)),
    ]
}

pub fn choose_zone(cfg: &ShotConfig, shooter: &Player, rng: &mut SimRng) -> ShotZone {
    match rng.weighted_index(&zone_weights(cfg, shooter)) {
        Some(1) => ShotZone::Mid,
        Some(2) => ShotZone::Three,
        _ => ShotZone::Close,
    }
}

pub fn choose_distance(cfg: &ShotConfig, zone: ShotZone, rng: &mut SimRng) -> u8 {
    let range = zone_range(cfg, zone);
    let d = rng.range(i32::from(range.min), i32::from(range.max));
    u8::try_from(d).unwrap_or(range.max)
}

fn split_for(cfg: &ShotConfig, dunker: DunkerType) -> &ShotSplit {
    match dunker {
        DunkerType::Frequent => &cfg.frequent_dunker,
        DunkerType::Occasional => &cfg.occasional_dunker,
        DunkerType::Rare => &cfg.rare_dunker,
    }
}

pub fn choose_kind(
    cfg: &ShotConfig,
    shooter: &Player,
    zone: ShotZone,
    distance: u8,
    rng: &mut SimRng,
) -> ShotKind {
    if zone != ShotZone::Close {
        return ShotKind::Jumper;
    }
    if distance <= cfg.rim_distance {
        let split = split_for(cfg, shooter.dunker);
        return match rng.weighted_index(&[split.layup, split.dunk, split.jumper]) {
            Some(1) => ShotKind::Dunk,
            Some(2) => ShotKind::Jumper,
            _ => ShotKind::Layup,
        };
    }
    if rng.chance(cfg.paint_layup_pct) {
        ShotKind::Layup
    } else {
        ShotKind::Jumper
    }
}

/// Draws a complete shot. Put-backs are always taken in the close zone.
pub fn choose_shot(cfg: &ShotConfig, shooter: &Player, putback: bool, rng: &mut SimRng) -> ShotSetup {
    let zone = if putback {
        ShotZone::Close
    } else {
        choose_zone(cfg, shooter, rng)
    };
    let distance = choose_distance(cfg, zone, rng);
    let kind = choose_kind(cfg, shooter, zone, distance, rng);
    ShotSetup {
        zone,
        distance,
        kind,
    }
}

/// Shooter rating relevant to the finish.
pub fn shooter_rating(shooter: &Player, setup: &ShotSetup) -> u8 {
    let r = &shooter.ratings;
    match setup.kind {
        ShotKind::Layup => r.layup,
        ShotKind::Dunk => r.standing_dunk.max(r.driving_dunk),
        ShotKind::Jumper => r.zone_rating(setup.zone),
    }
}

/// Make percentage for a shot, clamped to the configured band.
///
/// `help_defense` is the defending lineup's average rating for the zone.
pub fn make_pct(
    cfg: &EngineConfig,
    shooter: &Player,
    defender: &Player,
    help_defense: f64,
    setup: &ShotSetup,
    ctx: &ShotContext,
) -> f64 {
    let s = &cfg.shot;
    let curve = if setup.kind == ShotKind::Dunk {
        &s.dunk_curve
    } else {
        &s.base_curve
    };
    let mut pct = interpolate(curve, setup.distance);

    pct += s.rating_factor * (f64::from(shooter_rating(shooter, setup)) - s.rating_baseline);

    let matchup = f64::from(defender.ratings.zone_defense(setup.zone));
    let defense = (1.0 - s.help_defense_weight) * matchup + s.help_defense_weight * help_defense;
    pct += (-s.defender_factor * (defense - s.defender_baseline)).clamp(-s.hard_band, s.easy_band);

    let consistency = |rating: u8| {
        (s.consistency_factor * (f64::from(rating) - s.consistency_baseline))
            .clamp(-s.consistency_cap, s.consistency_cap)
    };
    pct += consistency(shooter.ratings.offensive_consistency);
    pct -= consistency(defender.ratings.defensive_consistency);

    pct -= s.fatigue_penalty * shooter.state.fatigue;
    if ctx.home {
        pct += cfg.situation.home_bonus_pct;
    }
    if ctx.fast_break {
        pct += s.fast_break_bonus;
    }
    if ctx.putback {
        pct += s.putback_bonus;
    }
    if ctx.clutch {
        pct *= if shooter.ratings.overall >= cfg.selection.star_threshold {
            cfg.situation.clutch_star_multiplier
        } else {
            cfg.situation.clutch_multiplier
        };
    }
    if ctx.garbage {
        pct *= cfg.situation.garbage_shot_multiplier;
    }
    pct.clamp(s.min_pct, s.max_pct)
}

/// Chance that a missed shot was blocked by `defender`. Threes are never blocked.
pub fn block_pct(cfg: &ShotConfig, defender: &Player, zone: ShotZone) -> f64 {
    if zone == ShotZone::Three {
        return 0.0;
    }
    (cfg.block_factor * (f64::from(defender.ratings.block) - cfg.block_baseline)).clamp(0.0, cfg.block_cap)
}

/// Share of made shots of this kind that are assisted.
pub fn assist_pct(cfg: &ShotConfig, setup: &ShotSetup) -> f64 {
    if setup.zone == ShotZone::Three {
        return cfg.assist_three_pct;
    }
    match setup.kind {
        ShotKind::Layup => cfg.assist_layup_pct,
        ShotKind::Dunk => cfg.assist_dunk_pct,
        ShotKind::Jumper => cfg.assist_jumper_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::fixtures::default_team;
    use sim_core::Conference;

    fn jumper(distance: u8, zone: ShotZone) -> ShotSetup {
        ShotSetup {
            zone,
            distance,
            kind: ShotKind::Jumper,
        }
    }

    #[test]
    fn curve_interpolates_between_breakpoints() {
        let cfg = ShotConfig::default();
        assert_eq!(interpolate(&cfg.base_curve, 0), 62.0);
        assert!((interpolate(&cfg.base_curve, 2) - 58.5).abs() < 1e-9);
        assert_eq!(interpolate(&cfg.base_curve, 28), 30.0);
        assert_eq!(interpolate(&cfg.base_curve, 40), 30.0);
        assert_eq!(interpolate(&cfg.dunk_curve, 6), 84.0);
        assert_eq!(interpolate(&[], 5), 0.0);
    }

    #[test]
    fn putbacks_stay_close() {
        let cfg = ShotConfig::default();
        let t = default_team("T", Conference::East);
        let mut rng = SimRng::new(5);
        for _ in 0..200 {
            let s = choose_shot(&cfg, &t.roster[4], true, &mut rng);
            assert_eq!(s.zone, ShotZone::Close);
            assert!(s.distance <= cfg.close_distance.max);
        }
    }

    #[test]
    fn jumpers_only_outside_the_paint() {
        let cfg = ShotConfig::default();
        let t = default_team("T", Conference::East);
        let mut rng = SimRng::new(9);
        for _ in 0..500 {
            let s = choose_shot(&cfg, &t.roster[0], false, &mut rng);
            let range = zone_range(&cfg, s.zone);
            assert!(s.distance >= range.min && s.distance <= range.max);
            if s.zone != ShotZone::Close {
                assert_eq!(s.kind, ShotKind::Jumper);
            }
            if s.kind == ShotKind::Dunk {
                assert!(s.distance <= cfg.rim_distance);
            }
        }
    }

    #[test]
    fn better_defense_lowers_the_percentage() {
        let cfg = EngineConfig::default();
        let t = default_team("T", Conference::East);
        let shooter = &t.roster[1];
        let mut weak = t.roster[6].clone();
        let mut strong = weak.clone();
        weak.ratings.perimeter_defense = 50;
        strong.ratings.perimeter_defense = 95;
        let setup = jumper(18, ShotZone::Mid);
        let ctx = ShotContext::default();
        let easy = make_pct(&cfg, shooter, &weak, 70.0, &setup, &ctx);
        let hard = make_pct(&cfg, shooter, &strong, 70.0, &setup, &ctx);
        assert!(easy > hard);
        let base = make_pct(&cfg, shooter, &t.roster[6], 70.0, &setup, &ctx);
        assert!(easy - base <= cfg.shot.easy_band + 1e-9);
    }

    #[test]
    fn garbage_time_dampens_and_fast_breaks_help() {
        let cfg = EngineConfig::default();
        let t = default_team("T", Conference::East);
        let setup = jumper(24, ShotZone::Three);
        let normal = make_pct(&cfg, &t.roster[1], &t.roster[1], 70.0, &setup, &ShotContext::default());
        let garbage = ShotContext {
            garbage: true,
            ..ShotContext::default()
        };
        let fast = ShotContext {
            fast_break: true,
            ..ShotContext::default()
        };
        assert!(make_pct(&cfg, &t.roster[1], &t.roster[1], 70.0, &setup, &garbage) < normal);
        assert!(make_pct(&cfg, &t.roster[1], &t.roster[1], 70.0, &setup, &fast) > normal);
    }

    #[test]
    fn threes_are_not_blocked() {
        let cfg = ShotConfig::default();
        let t = default_team("T", Conference::East);
        assert_eq!(block_pct(&cfg, &t.roster[4], ShotZone::Three), 0.0);
        assert!(block_pct(&cfg, &t.roster[4], ShotZone::Close) > 0.0);
    }

    proptest! {
        #[test]
        fn make_pct_stays_in_band(
            distance in 0u8..=28,
            rating in 0u8..=100,
            defense in 0u8..=100,
            fatigue in 0.0f64..=100.0,
            clutch in any::<bool>(),
            fast_break in any::<bool>(),
        ) {
            let cfg = EngineConfig::default();
            let t = default_team("T", Conference::West);
            let mut shooter = t.roster[0].clone();
            shooter.ratings.mid_range = rating;
            shooter.ratings.three_point = rating;
            shooter.ratings.inside = rating;
            shooter.state.fatigue = fatigue;
            let mut defender = t.roster[1].clone();
            defender.ratings.perimeter_defense = defense;
            defender.ratings.interior_defense = defense;
            let zone = if distance <= 8 { ShotZone::Close } else if distance <= 22 { ShotZone::Mid } else { ShotZone::Three };
            let ctx = ShotContext { clutch, fast_break, ..ShotContext::default() };
            let pct = make_pct(&cfg, &shooter, &defender, f64::from(defense), &jumper(distance, zone), &ctx);
            prop_assert!(pct >= cfg.shot.min_pct && pct <= cfg.shot.max_pct);
        }
    }
}
