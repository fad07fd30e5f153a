//! Tunable simulation constants.
//!
//! Every percentage and threshold used by the engine lives here with its
//! tuned default. The defaults reproduce the league's statistical profile and
//! are treated as a fixed contract: override them from a config file rather
//! than editing the values in code.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Inclusive range of seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: u32,
    pub max: u32,
}

impl SecondsRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Inclusive range of shot distances in feet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: u8,
    pub max: u8,
}

/// One breakpoint of a make-percentage curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub distance: u8,
    pub pct: f64,
}

const fn cp(distance: u8, pct: f64) -> CurvePoint {
    CurvePoint { distance, pct }
}

/// Layup / dunk / jumper split in percent for shots at the rim.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotSplit {
    pub layup: f64,
    pub dunk: f64,
    pub jumper: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub quarter_seconds: u32,
    pub overtime_seconds: u32,
    pub regulation_periods: u8,
    pub possession_seconds: SecondsRange,
    pub fast_break_seconds: SecondsRange,
    pub putback_seconds: SecondsRange,
    /// Time burnt by a non-shooting foul before the ball is inbounded again.
    pub side_out_seconds: SecondsRange,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            quarter_seconds: 720,
            overtime_seconds: 300,
            regulation_periods: 4,
            possession_seconds: SecondsRange::new(10, 22),
            fast_break_seconds: SecondsRange::new(3, 7),
            putback_seconds: SecondsRange::new(2, 8),
            side_out_seconds: SecondsRange::new(3, 8),
        }
    }
}

/// Ball handler selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub star_threshold: u8,
    pub star_multiplier: f64,
    /// Weight added per rating point above the weakest player on court.
    pub differential_factor: f64,
    /// Weight removed per fatigue point.
    pub fatigue_dampening: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            star_threshold: 85,
            star_multiplier: 1.6,
            differential_factor: 0.12,
            fatigue_dampening: 0.004,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    pub close_weight: f64,
    pub mid_weight: f64,
    pub three_weight: f64,
    /// Zone weight added per zone-rating point above 70.
    pub zone_rating_factor: f64,
    pub close_distance: DistanceRange,
    pub mid_distance: DistanceRange,
    pub three_distance: DistanceRange,
    /// Layups and dunks are only possible within this distance.
    pub rim_distance: u8,
    pub frequent_dunker: ShotSplit,
    pub occasional_dunker: ShotSplit,
    pub rare_dunker: ShotSplit,
    /// Floater/layup share for close shots beyond the rim distance.
    pub paint_layup_pct: f64,
    pub base_curve: Vec<CurvePoint>,
    pub dunk_curve: Vec<CurvePoint>,
    pub rating_baseline: f64,
    pub rating_factor: f64,
    pub defender_baseline: f64,
    pub defender_factor: f64,
    /// Share of the effective defense coming from the whole lineup instead of the matchup.
    pub help_defense_weight: f64,
    /// Largest bonus against weak defense.
    pub easy_band: f64,
    /// Largest penalty against strong defense.
    pub hard_band: f64,
    pub consistency_baseline: f64,
    pub consistency_factor: f64,
    pub consistency_cap: f64,
    pub fatigue_penalty: f64,
    pub fast_break_bonus: f64,
    pub putback_bonus: f64,
    pub min_pct: f64,
    pub max_pct: f64,
    pub block_baseline: f64,
    pub block_factor: f64,
    pub block_cap: f64,
    pub assist_jumper_pct: f64,
    pub assist_three_pct: f64,
    pub assist_layup_pct: f64,
    pub assist_dunk_pct: f64,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            close_weight: 38.0,
            mid_weight: 24.0,
            three_weight: 38.0,
            zone_rating_factor: 0.8,
            close_distance: DistanceRange { min: 0, max: 8 },
            mid_distance: DistanceRange { min: 9, max: 22 },
            three_distance: DistanceRange { min: 23, max: 28 },
            rim_distance: 4,
            frequent_dunker: ShotSplit {
                layup: 45.0,
                dunk: 45.0,
                jumper: 10.0,
            },
            occasional_dunker: ShotSplit {
                layup: 60.0,
                dunk: 20.0,
                jumper: 20.0,
            },
            rare_dunker: ShotSplit {
                layup: 72.0,
                dunk: 3.0,
                jumper: 25.0,
            },
            paint_layup_pct: 65.0,
            base_curve: vec![
                cp(0, 62.0),
                cp(4, 55.0),
                cp(8, 44.0),
                cp(12, 42.0),
                cp(16, 41.0),
                cp(22, 40.0),
                cp(25, 36.0),
                cp(28, 30.0),
            ],
            dunk_curve: vec![cp(0, 92.0), cp(4, 84.0)],
            rating_baseline: 75.0,
            rating_factor: 0.35,
            defender_baseline: 70.0,
            defender_factor: 0.3,
            help_defense_weight: 0.3,
            easy_band: 5.0,
            hard_band: 8.0,
            consistency_baseline: 70.0,
            consistency_factor: 0.1,
            consistency_cap: 3.0,
            fatigue_penalty: 0.06,
            fast_break_bonus: 10.0,
            putback_bonus: 4.0,
            min_pct: 5.0,
            max_pct: 95.0,
            block_baseline: 50.0,
            block_factor: 0.15,
            block_cap: 12.0,
            assist_jumper_pct: 62.0,
            assist_three_pct: 82.0,
            assist_layup_pct: 55.0,
            assist_dunk_pct: 72.0,
        }
    }
}

/// Bonus steal percentage for defenders at or above `threshold`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StealTier {
    pub threshold: u8,
    pub bonus: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnoverConfig {
    pub base_pct: f64,
    pub handler_factor: f64,
    pub pressure_factor: f64,
    pub min_pct: f64,
    pub max_pct: f64,
    /// Share of turnovers that are live-ball steals before tier bonuses.
    pub steal_base_pct: f64,
    /// Highest matching tier applies; ordered by descending threshold.
    pub steal_tiers: Vec<StealTier>,
    pub fast_break_pct: f64,
    pub bad_pass_weight: f64,
    pub travel_weight: f64,
    pub out_of_bounds_weight: f64,
}

impl Default for TurnoverConfig {
    fn default() -> Self {
        Self {
            base_pct: 12.5,
            handler_factor: 0.08,
            pressure_factor: 0.06,
            min_pct: 5.0,
            max_pct: 22.0,
            steal_base_pct: 42.0,
            steal_tiers: vec![
                StealTier {
                    threshold: 90,
                    bonus: 20.0,
                },
                StealTier {
                    threshold: 80,
                    bonus: 12.0,
                },
                StealTier {
                    threshold: 70,
                    bonus: 6.0,
                },
                StealTier {
                    threshold: 60,
                    bonus: 2.0,
                },
            ],
            fast_break_pct: 55.0,
            bad_pass_weight: 45.0,
            travel_weight: 25.0,
            out_of_bounds_weight: 30.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReboundConfig {
    pub offensive_pct: f64,
    pub close_shot_bonus: f64,
    /// Per point of lineup offensive-rebound average over the opponent's defensive average.
    pub rating_factor: f64,
    pub free_throw_offensive_pct: f64,
    /// Exponent applied to rebound ratings for the rebounder draw.
    pub exponent: f64,
    pub min_pct: f64,
    pub max_pct: f64,
}

impl Default for ReboundConfig {
    fn default() -> Self {
        Self {
            offensive_pct: 23.0,
            close_shot_bonus: 5.0,
            rating_factor: 0.15,
            free_throw_offensive_pct: 12.0,
            exponent: 2.0,
            min_pct: 5.0,
            max_pct: 45.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoulConfig {
    pub shooting_foul_pct: f64,
    pub draw_foul_factor: f64,
    pub tendency_factor: f64,
    pub close_shot_extra: f64,
    pub three_shot_scale: f64,
    /// Make percentage multiplier for a shot taken through contact.
    pub and_one_make_factor: f64,
    pub flagrant_pct: f64,
    pub charging_pct: f64,
    pub illegal_screen_pct: f64,
    pub blocking_pct: f64,
    pub reach_in_pct: f64,
    /// Team fouls in a period after which every defensive foul awards free throws.
    pub bonus_threshold: u32,
    pub foul_out_limit: u32,
    pub challenge_from_period: u8,
    pub challenge_pct: f64,
    pub challenge_success_pct: f64,
    pub free_throw_fatigue_penalty: f64,
    pub free_throw_min_pct: f64,
    pub free_throw_max_pct: f64,
}

impl Default for FoulConfig {
    fn default() -> Self {
        Self {
            shooting_foul_pct: 8.5,
            draw_foul_factor: 0.06,
            tendency_factor: 0.05,
            close_shot_extra: 4.0,
            three_shot_scale: 0.3,
            and_one_make_factor: 0.35,
            flagrant_pct: 0.25,
            charging_pct: 1.0,
            illegal_screen_pct: 0.7,
            blocking_pct: 2.0,
            reach_in_pct: 3.5,
            bonus_threshold: 5,
            foul_out_limit: 6,
            challenge_from_period: 3,
            challenge_pct: 35.0,
            challenge_success_pct: 40.0,
            free_throw_fatigue_penalty: 0.03,
            free_throw_min_pct: 30.0,
            free_throw_max_pct: 95.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    pub gain_per_second: f64,
    pub durability_factor: f64,
    pub athleticism_factor: f64,
    pub recovery_per_second: f64,
    pub quarter_break_recovery: f64,
    pub halftime_recovery: f64,
    /// Share of fatigue carried into the next game.
    pub post_game_retain: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            gain_per_second: 0.045,
            durability_factor: 0.004,
            athleticism_factor: 0.002,
            recovery_per_second: 0.08,
            quarter_break_recovery: 8.0,
            halftime_recovery: 20.0,
            post_game_retain: 0.1,
        }
    }
}

/// Minutes adjustment for athleticism at or above `min_rating`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AthleticismBand {
    pub min_rating: u8,
    pub minutes: f64,
}

/// Blowout state: margin at least `min_margin` with at most
/// `max_seconds_remaining` left in the final regulation period.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GarbageTier {
    pub min_margin: u32,
    pub max_seconds_remaining: u32,
    pub check_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    pub check_pct: f64,
    pub q1_lockout_seconds: u32,
    pub max_subs_per_check: usize,
    pub starter_stint_close: u32,
    pub starter_stint_blowout: u32,
    pub bench_stint: u32,
    pub min_rest_close: u32,
    pub min_rest_normal: u32,
    pub close_margin: u32,
    pub minutes_iron: f64,
    pub minutes_sturdy: f64,
    pub minutes_average: f64,
    pub minutes_fragile: f64,
    pub rotation_minutes_scale: f64,
    pub reserve_minutes_scale: f64,
    /// Ordered by descending `min_rating`; the first match applies.
    pub athleticism_bands: Vec<AthleticismBand>,
    /// Foul-trouble threshold per period; overtime uses the last entry.
    pub foul_trouble: Vec<u32>,
    pub foul_weight: f64,
    pub minutes_weight: f64,
    pub fatigue_weight: f64,
    pub performance_weight: f64,
    pub fatigue_threshold: f64,
    pub hot_fg_pct: f64,
    pub hot_min_attempts: u32,
    pub cold_fg_pct: f64,
    pub cold_min_attempts: u32,
    /// Outgoing priority needed before a voluntary substitution happens.
    pub sub_threshold: f64,
    pub garbage_tiers: Vec<GarbageTier>,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            check_pct: 30.0,
            q1_lockout_seconds: 150,
            max_subs_per_check: 2,
            starter_stint_close: 420,
            starter_stint_blowout: 600,
            bench_stint: 330,
            min_rest_close: 150,
            min_rest_normal: 270,
            close_margin: 8,
            minutes_iron: 38.0,
            minutes_sturdy: 35.0,
            minutes_average: 32.0,
            minutes_fragile: 28.0,
            rotation_minutes_scale: 0.65,
            reserve_minutes_scale: 0.35,
            athleticism_bands: vec![
                AthleticismBand {
                    min_rating: 90,
                    minutes: 3.0,
                },
                AthleticismBand {
                    min_rating: 80,
                    minutes: 2.0,
                },
                AthleticismBand {
                    min_rating: 70,
                    minutes: 1.0,
                },
                AthleticismBand {
                    min_rating: 60,
                    minutes: 0.0,
                },
                AthleticismBand {
                    min_rating: 50,
                    minutes: -1.5,
                },
                AthleticismBand {
                    min_rating: 0,
                    minutes: -3.0,
                },
            ],
            foul_trouble: vec![2, 3, 4, 5],
            foul_weight: 40.0,
            minutes_weight: 30.0,
            fatigue_weight: 20.0,
            performance_weight: 5.0,
            fatigue_threshold: 30.0,
            hot_fg_pct: 0.6,
            hot_min_attempts: 4,
            cold_fg_pct: 0.25,
            cold_min_attempts: 5,
            sub_threshold: 18.0,
            garbage_tiers: vec![
                GarbageTier {
                    min_margin: 30,
                    max_seconds_remaining: 720,
                    check_pct: 60.0,
                },
                GarbageTier {
                    min_margin: 25,
                    max_seconds_remaining: 360,
                    check_pct: 80.0,
                },
                GarbageTier {
                    min_margin: 20,
                    max_seconds_remaining: 180,
                    check_pct: 100.0,
                },
            ],
        }
    }
}

/// Clutch, garbage time and home court.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SituationConfig {
    pub clutch_seconds: u32,
    pub clutch_margin: u32,
    pub clutch_multiplier: f64,
    pub clutch_star_multiplier: f64,
    pub garbage_shot_multiplier: f64,
    pub home_bonus_pct: f64,
}

impl Default for SituationConfig {
    fn default() -> Self {
        Self {
            clutch_seconds: 300,
            clutch_margin: 5,
            clutch_multiplier: 0.96,
            clutch_star_multiplier: 1.03,
            garbage_shot_multiplier: 0.97,
            home_bonus_pct: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjuryConfig {
    pub per_play_probability: f64,
}

impl Default for InjuryConfig {
    fn default() -> Self {
        Self {
            per_play_probability: 0.0004,
        }
    }
}

/// Everything the game engine reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub clock: ClockConfig,
    pub selection: SelectionConfig,
    pub shot: ShotConfig,
    pub turnover: TurnoverConfig,
    pub rebound: ReboundConfig,
    pub foul: FoulConfig,
    pub fatigue: FatigueConfig,
    pub substitution: SubstitutionConfig,
    pub situation: SituationConfig,
    pub injury: InjuryConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayoffConfig {
    pub enabled: bool,
    pub play_in: bool,
    pub series_wins: u8,
}

impl Default for PlayoffConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            play_in: true,
            series_wins: 4,
        }
    }
}

/// Composite weights for MVP races.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvpWeights {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    /// Applied to true shooting above `true_shooting_baseline`.
    pub true_shooting: f64,
    pub true_shooting_baseline: f64,
    pub win_pct: f64,
    pub min_games_fraction: f64,
}

impl Default for MvpWeights {
    fn default() -> Self {
        Self {
            points: 1.0,
            rebounds: 1.2,
            assists: 1.5,
            steals: 2.0,
            blocks: 2.0,
            turnovers: 1.0,
            true_shooting: 30.0,
            true_shooting_baseline: 0.55,
            win_pct: 10.0,
            min_games_fraction: 0.6,
        }
    }
}

/// Season-level settings wrapping the engine constants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    pub engine: EngineConfig,
    pub playoffs: PlayoffConfig,
    pub mvp: MvpWeights,
    /// Keep the full event log of every regular-season game in its recap.
    pub keep_game_logs: bool,
}

impl SeasonConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        if self.playoffs.series_wins == 0 {
            return Err(config_err("playoffs.series_wins", "must be at least 1"));
        }
        let f = self.mvp.min_games_fraction;
        if !(0.0..=1.0).contains(&f) {
            return Err(config_err("mvp.min_games_fraction", "must be within [0, 1]"));
        }
        Ok(())
    }
}

fn config_err(field: &str, reason: &str) -> ValidationError {
    ValidationError::Config {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn check_pct(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && (0.0..=100.0).contains(&v) {
        Ok(())
    } else {
        Err(config_err(field, "percentage must be within [0, 100]"))
    }
}

fn check_curve(field: &str, curve: &[CurvePoint]) -> Result<(), ValidationError> {
    if curve.is_empty() {
        return Err(config_err(field, "curve needs at least one point"));
    }
    for w in curve.windows(2) {
        if w[1].distance <= w[0].distance {
            return Err(config_err(field, "distances must be strictly increasing"));
        }
        if w[1].pct > w[0].pct {
            return Err(config_err(field, "make percentage must not increase with distance"));
        }
    }
    for p in curve {
        check_pct(field, p.pct)?;
    }
    Ok(())
}

impl EngineConfig {
    /// Range checks on the constants; run before any simulation starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let c = &self.clock;
        if c.quarter_seconds == 0 || c.overtime_seconds == 0 || c.regulation_periods == 0 {
            return Err(config_err("clock", "period lengths and count must be positive"));
        }
        for (name, r) in [
            ("clock.possession_seconds", c.possession_seconds),
            ("clock.fast_break_seconds", c.fast_break_seconds),
            ("clock.putback_seconds", c.putback_seconds),
            ("clock.side_out_seconds", c.side_out_seconds),
        ] {
            if r.min == 0 || r.min > r.max {
                return Err(config_err(name, "need 0 < min <= max"));
            }
            if i32::try_from(r.max).is_err() {
                return Err(config_err(name, "max is too large"));
            }
        }

        let s = &self.shot;
        check_curve("shot.base_curve", &s.base_curve)?;
        check_curve("shot.dunk_curve", &s.dunk_curve)?;
        for (name, d) in [
            ("shot.close_distance", s.close_distance),
            ("shot.mid_distance", s.mid_distance),
            ("shot.three_distance", s.three_distance),
        ] {
            if d.min > d.max {
                return Err(config_err(name, "need min <= max"));
            }
        }
        if s.close_distance.max >= s.mid_distance.min || s.mid_distance.max >= s.three_distance.min
        {
            return Err(config_err("shot", "zone distance ranges must not overlap"));
        }
        if s.close_weight < 0.0 || s.mid_weight < 0.0 || s.three_weight < 0.0 {
            return Err(config_err("shot", "zone weights must be non-negative"));
        }
        check_pct("shot.min_pct", s.min_pct)?;
        check_pct("shot.max_pct", s.max_pct)?;
        if s.min_pct > s.max_pct {
            return Err(config_err("shot.min_pct", "must not exceed max_pct"));
        }
        if s.easy_band < 0.0 || s.hard_band < 0.0 {
            return Err(config_err("shot", "defense bands must be non-negative"));
        }
        for (name, v) in [
            ("shot.paint_layup_pct", s.paint_layup_pct),
            ("shot.assist_jumper_pct", s.assist_jumper_pct),
            ("shot.assist_three_pct", s.assist_three_pct),
            ("shot.assist_layup_pct", s.assist_layup_pct),
            ("shot.assist_dunk_pct", s.assist_dunk_pct),
            ("turnover.steal_base_pct", self.turnover.steal_base_pct),
            ("turnover.fast_break_pct", self.turnover.fast_break_pct),
            ("turnover.min_pct", self.turnover.min_pct),
            ("turnover.max_pct", self.turnover.max_pct),
            ("rebound.min_pct", self.rebound.min_pct),
            ("rebound.max_pct", self.rebound.max_pct),
            ("foul.shooting_foul_pct", self.foul.shooting_foul_pct),
            ("foul.flagrant_pct", self.foul.flagrant_pct),
            ("foul.charging_pct", self.foul.charging_pct),
            ("foul.illegal_screen_pct", self.foul.illegal_screen_pct),
            ("foul.blocking_pct", self.foul.blocking_pct),
            ("foul.reach_in_pct", self.foul.reach_in_pct),
            ("foul.challenge_pct", self.foul.challenge_pct),
            ("foul.challenge_success_pct", self.foul.challenge_success_pct),
            ("substitution.check_pct", self.substitution.check_pct),
        ] {
            check_pct(name, v)?;
        }
        if self.turnover.min_pct > self.turnover.max_pct {
            return Err(config_err("turnover.min_pct", "must not exceed max_pct"));
        }
        if self.rebound.min_pct > self.rebound.max_pct {
            return Err(config_err("rebound.min_pct", "must not exceed max_pct"));
        }
        if self.rebound.exponent <= 0.0 || !self.rebound.exponent.is_finite() {
            return Err(config_err("rebound.exponent", "must be positive"));
        }
        if self.foul.foul_out_limit == 0 || self.foul.bonus_threshold == 0 {
            return Err(config_err("foul", "limits must be positive"));
        }
        let sub = &self.substitution;
        if sub.foul_trouble.is_empty() {
            return Err(config_err("substitution.foul_trouble", "needs at least one period"));
        }
        if sub.athleticism_bands.is_empty() {
            return Err(config_err("substitution.athleticism_bands", "needs at least one band"));
        }
        for t in &sub.garbage_tiers {
            check_pct("substitution.garbage_tiers.check_pct", t.check_pct)?;
        }
        let p = self.injury.per_play_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(config_err("injury.per_play_probability", "must be within [0, 1]"));
        }
        let r = self.fatigue.post_game_retain;
        if !(0.0..=1.0).contains(&r) {
            return Err(config_err("fatigue.post_game_retain", "must be within [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EngineConfig::default().validate().unwrap();
        SeasonConfig::default().validate().unwrap();
    }

    #[test]
    fn rising_curve_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.shot.base_curve = vec![cp(0, 50.0), cp(10, 60.0)];
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ValidationError::Config { ref field, .. } if field == "shot.base_curve"));
    }

    #[test]
    fn overlapping_zones_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.shot.close_distance = DistanceRange { min: 0, max: 10 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn foul_rates_and_clock_ranges_are_bounded() {
        let breakers: [fn(&mut EngineConfig); 5] = [
            |c| c.foul.shooting_foul_pct = 120.0,
            |c| c.foul.charging_pct = -1.0,
            |c| c.foul.illegal_screen_pct = f64::NAN,
            |c| c.foul.blocking_pct = 101.0,
            |c| c.foul.reach_in_pct = 250.0,
        ];
        for breaker in breakers {
            let mut cfg = EngineConfig::default();
            breaker(&mut cfg);
            let err = cfg.validate().unwrap_err();
            assert!(matches!(err, ValidationError::Config { ref field, .. } if field.starts_with("foul.")));
        }
        let mut cfg = EngineConfig::default();
        cfg.clock.possession_seconds = SecondsRange::new(10, u32::MAX);
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(err, ValidationError::Config { ref field, .. } if field == "clock.possession_seconds")
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"foul": {"bonus_threshold": 4}, "clock": {"quarter_seconds": 600}}"#)
                .unwrap();
        assert_eq!(cfg.foul.bonus_threshold, 4);
        assert_eq!(cfg.foul.foul_out_limit, 6);
        assert_eq!(cfg.clock.quarter_seconds, 600);
        assert_eq!(cfg.clock.overtime_seconds, 300);
        assert_eq!(cfg.shot, ShotConfig::default());
    }

    #[test]
    fn zero_series_wins_is_rejected() {
        let mut cfg = SeasonConfig::default();
        cfg.playoffs.series_wins = 0;
        assert!(cfg.validate().is_err());
    }
}
