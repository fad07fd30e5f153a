#![deny(warnings)]

//! Coaching AI: rotation and substitution decisions.
//!
//! The manager is consulted at play boundaries. It ranks the five players on
//! court by how badly they need a rest (foul trouble, minutes cap, stint
//! length, fatigue, shooting form), ranks the bench by readiness and swaps the
//! best pair when the outgoing priority clears the configured threshold.
//! Blowouts switch it into garbage-time mode, which empties the bench.

use serde::{Deserialize, Serialize};
use sim_core::config::{GarbageTier, SituationConfig, SubstitutionConfig};
use sim_core::{DurabilityTier, EngineConfig, Player, RotationRole, SimRng, SubReason, Team};
use thiserror::Error;
use tracing::debug;

/// Game state as seen from one bench.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSituation {
    pub period: u8,
    pub seconds_remaining: u32,
    /// Game seconds since tip-off.
    pub elapsed: u32,
    pub regulation_periods: u8,
    /// This team's score minus the opponent's.
    pub margin: i32,
}

impl GameSituation {
    pub fn abs_margin(&self) -> u32 {
        self.margin.unsigned_abs()
    }

    /// Same clock from the other bench.
    pub fn flipped(&self) -> Self {
        Self {
            margin: -self.margin,
            ..*self
        }
    }
}

/// Highest-pressure garbage tier matching the situation, if any.
/// Only the final regulation period can be garbage time.
pub fn garbage_tier<'a>(cfg: &'a SubstitutionConfig, s: &GameSituation) -> Option<&'a GarbageTier> {
    if s.period != s.regulation_periods {
        return None;
    }
    cfg.garbage_tiers
        .iter()
        .filter(|t| s.abs_margin() >= t.min_margin && s.seconds_remaining <= t.max_seconds_remaining)
        .max_by(|a, b| a.check_pct.total_cmp(&b.check_pct))
}

/// Final period (or overtime), late, and within the clutch margin.
pub fn is_clutch(cfg: &SituationConfig, s: &GameSituation) -> bool {
    s.period >= s.regulation_periods
        && s.seconds_remaining <= cfg.clutch_seconds
        && s.abs_margin() <= cfg.clutch_margin
}

/// Target minutes for a player: durability tier, athleticism band, role scale.
pub fn minutes_budget(cfg: &SubstitutionConfig, p: &Player) -> f64 {
    let base = match p.durability_tier() {
        DurabilityTier::Iron => cfg.minutes_iron,
        DurabilityTier::Sturdy => cfg.minutes_sturdy,
        DurabilityTier::Average => cfg.minutes_average,
        DurabilityTier::Fragile => cfg.minutes_fragile,
    };
    let band = cfg
        .athleticism_bands
        .iter()
        .find(|b| p.ratings.athleticism >= b.min_rating)
        .map_or(0.0, |b| b.minutes);
    let scale = match p.role {
        RotationRole::Starter => 1.0,
        RotationRole::Rotation => cfg.rotation_minutes_scale,
        RotationRole::Reserve => cfg.reserve_minutes_scale,
    };
    ((base + band) * scale).max(0.0)
}

/// Personal fouls that count as foul trouble in `period`.
pub fn foul_trouble_threshold(cfg: &SubstitutionConfig, period: u8) -> u32 {
    let idx = usize::from(period.max(1) - 1).min(cfg.foul_trouble.len().saturating_sub(1));
    cfg.foul_trouble.get(idx).copied().unwrap_or(u32::MAX)
}

/// One lineup change, roster indices of the same team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub out: usize,
    pub into: usize,
    pub reason: SubReason,
}

#[derive(Debug, Error, PartialEq)]
pub enum SubstitutionError {
    #[error("team {team}: nobody left on the bench to replace {player}")]
    NoReplacement { team: String, player: String },
    #[error("team {team}: roster index {index} is not on court")]
    NotOnCourt { team: String, index: usize },
}

/// Rotation decisions for one team, driven by the engine constants.
pub struct SubstitutionManager<'a> {
    cfg: &'a EngineConfig,
}

impl<'a> SubstitutionManager<'a> {
    pub fn new(cfg: &'a EngineConfig) -> Self {
        Self { cfg }
    }

    fn sub_cfg(&self) -> &SubstitutionConfig {
        &self.cfg.substitution
    }

    fn is_close(&self, s: &GameSituation) -> bool {
        s.abs_margin() <= self.sub_cfg().close_margin
    }

    /// Regular play-boundary check: a probability draw, then an evaluation.
    /// Garbage time raises the draw; the opening seconds of the first period
    /// are locked.
    pub fn check(&self, team: &mut Team, s: &GameSituation, rng: &mut SimRng) -> Vec<Substitution> {
        let cfg = self.sub_cfg();
        if s.period == 1 && s.elapsed < cfg.q1_lockout_seconds {
            return Vec::new();
        }
        let pct = garbage_tier(cfg, s).map_or(cfg.check_pct, |t| t.check_pct.max(cfg.check_pct));
        if !rng.chance(pct) {
            return Vec::new();
        }
        self.evaluate(team, s)
    }

    /// Evaluation at a period break; no probability draw.
    pub fn end_of_period(&self, team: &mut Team, s: &GameSituation) -> Vec<Substitution> {
        self.evaluate(team, s)
    }

    /// Forced check after `player` picks up a foul. Sits him once his fouls
    /// reach the period's foul-trouble line and a rested replacement is
    /// available. No probability draw; the Q1 lockout still applies.
    pub fn foul_trouble(&self, team: &mut Team, player: usize, s: &GameSituation) -> Option<Substitution> {
        let cfg = self.sub_cfg();
        if s.period == 1 && s.elapsed < cfg.q1_lockout_seconds {
            return None;
        }
        if !team.is_on_court(player) {
            return None;
        }
        if team.roster[player].state.line.fouls < foul_trouble_threshold(cfg, s.period) {
            return None;
        }
        let into = self.pick_incoming(team, player, s, Mode::Normal)?;
        if !team.swap_players(player, into, s.elapsed) {
            return None;
        }
        debug!(team = %team.id, out = %team.roster[player].name, into = %team.roster[into].name, "foul trouble");
        Some(Substitution {
            out: player,
            into,
            reason: SubReason::FoulTrouble,
        })
    }

    /// Forced replacement for an injured or fouled-out player. Rest and
    /// minutes limits are ignored; only availability matters.
    pub fn replace(
        &self,
        team: &mut Team,
        out: usize,
        reason: SubReason,
        s: &GameSituation,
    ) -> Result<Substitution, SubstitutionError> {
        if !team.is_on_court(out) {
            return Err(SubstitutionError::NotOnCourt {
                team: team.id.0.clone(),
                index: out,
            });
        }
        let into = self
            .pick_incoming(team, out, s, Mode::Emergency)
            .ok_or_else(|| SubstitutionError::NoReplacement {
                team: team.id.0.clone(),
                player: team.roster[out].name.clone(),
            })?;
        if !team.swap_players(out, into, s.elapsed) {
            return Err(SubstitutionError::NoReplacement {
                team: team.id.0.clone(),
                player: team.roster[out].name.clone(),
            });
        }
        debug!(team = %team.id, out = %team.roster[out].name, into = %team.roster[into].name, ?reason, "forced substitution");
        Ok(Substitution { out, into, reason })
    }

    fn evaluate(&self, team: &mut Team, s: &GameSituation) -> Vec<Substitution> {
        let garbage = garbage_tier(self.sub_cfg(), s).is_some();
        let mode = if garbage { Mode::Garbage } else { Mode::Normal };
        let mut subs: Vec<Substitution> = Vec::new();
        for _ in 0..self.sub_cfg().max_subs_per_check {
            let mut best: Option<(f64, usize, SubReason)> = None;
            for &i in &team.on_court {
                if subs.iter().any(|x| x.into == i) {
                    continue;
                }
                let p = &team.roster[i];
                let scored = if garbage {
                    garbage_priority(p)
                } else {
                    self.out_priority(p, s)
                };
                if let Some((prio, reason)) = scored {
                    if best.map_or(true, |(b, _, _)| prio > b) {
                        best = Some((prio, i, reason));
                    }
                }
            }
            let Some((prio, out, reason)) = best else { break };
            if !garbage && prio < self.sub_cfg().sub_threshold {
                break;
            }
            let Some(into) = self.pick_incoming(team, out, s, mode) else {
                break;
            };
            if garbage && garbage_readiness(&team.roster[out]) >= garbage_readiness(&team.roster[into]) {
                break;
            }
            if !team.swap_players(out, into, s.elapsed) {
                break;
            }
            debug!(team = %team.id, out = %team.roster[out].name, into = %team.roster[into].name, ?reason, prio, "substitution");
            subs.push(Substitution { out, into, reason });
        }
        subs
    }

    /// How badly an on-court player needs to sit, with the dominant reason.
    /// `None` when nothing argues for a change.
    pub fn out_priority(&self, p: &Player, s: &GameSituation) -> Option<(f64, SubReason)> {
        let cfg = self.sub_cfg();
        let mut parts: Vec<(f64, SubReason)> = Vec::with_capacity(5);

        let fouls = p.state.line.fouls;
        let threshold = foul_trouble_threshold(cfg, s.period);
        if fouls >= threshold {
            let mut w = cfg.foul_weight * f64::from(1 + fouls - threshold);
            if fouls + 1 >= self.cfg.foul.foul_out_limit {
                w *= 2.0;
            }
            parts.push((w, SubReason::FoulTrouble));
        }

        let budget = minutes_budget(cfg, p) * 60.0;
        let played = f64::from(p.state.seconds_played);
        if played >= budget {
            parts.push((cfg.minutes_weight * (1.0 + (played - budget) / 300.0), SubReason::MinutesLimit));
        }

        let max_stint = if p.state.starter {
            if self.is_close(s) {
                cfg.starter_stint_close
            } else {
                cfg.starter_stint_blowout
            }
        } else {
            cfg.bench_stint
        };
        let stint = p.stint_seconds(s.elapsed);
        if max_stint > 0 && stint >= max_stint {
            parts.push((
                cfg.minutes_weight * f64::from(stint) / f64::from(max_stint),
                SubReason::StintLimit,
            ));
        }

        if p.state.fatigue >= cfg.fatigue_threshold {
            parts.push((cfg.fatigue_weight * p.state.fatigue / 50.0, SubReason::Fatigue));
        }

        let line = &p.state.line;
        let attempts = line.field_goals_attempted();
        let pct = line.field_goal_pct().unwrap_or(0.0);
        if attempts >= cfg.cold_min_attempts && pct <= cfg.cold_fg_pct {
            parts.push((cfg.performance_weight, SubReason::Performance));
        } else if attempts >= cfg.hot_min_attempts && pct >= cfg.hot_fg_pct {
            parts.push((-cfg.performance_weight, SubReason::Performance));
        }

        let total: f64 = parts.iter().map(|(w, _)| w).sum();
        let reason = parts
            .iter()
            .filter(|(w, _)| *w > 0.0)
            .fold(None::<(f64, SubReason)>, |acc, &(w, r)| match acc {
                Some((bw, _)) if bw >= w => acc,
                _ => Some((w, r)),
            })
            .map(|(_, r)| r)?;
        (total > 0.0).then_some((total, reason))
    }

    /// How ready a bench player is to check in; `None` if not eligible.
    pub fn readiness(&self, p: &Player, s: &GameSituation) -> Option<f64> {
        if !p.is_available() {
            return None;
        }
        let cfg = self.sub_cfg();
        let min_rest = if self.is_close(s) {
            cfg.min_rest_close
        } else {
            cfg.min_rest_normal
        };
        if let Some(rest) = p.rest_seconds(s.elapsed) {
            if rest < min_rest {
                return None;
            }
        }
        if f64::from(p.state.seconds_played) >= minutes_budget(cfg, p) * 60.0 {
            return None;
        }
        let mut score = f64::from(p.ratings.overall) + (100.0 - p.state.fatigue) * 0.2;
        if p.state.starter {
            score += 8.0;
        }
        if p.state.line.fouls >= foul_trouble_threshold(cfg, s.period) {
            score -= cfg.foul_weight;
        }
        Some(score)
    }

    fn pick_incoming(&self, team: &Team, out: usize, s: &GameSituation, mode: Mode) -> Option<usize> {
        let slot = team.roster[out].position.slot();
        let mut same: Option<(f64, usize)> = None;
        let mut any: Option<(f64, usize)> = None;
        for i in team.available_bench() {
            let p = &team.roster[i];
            let score = match mode {
                Mode::Normal => self.readiness(p, s),
                Mode::Garbage => garbage_readiness(p),
                Mode::Emergency => Some(f64::from(p.ratings.overall) - p.state.fatigue * 0.2),
            };
            let Some(score) = score else { continue };
            if any.map_or(true, |(b, _)| score > b) {
                any = Some((score, i));
            }
            if p.position.slot() == slot && same.map_or(true, |(b, _)| score > b) {
                same = Some((score, i));
            }
        }
        same.or(any).map(|(_, i)| i)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    Garbage,
    Emergency,
}

/// In a blowout the regulars come out, best players first.
fn garbage_priority(p: &Player) -> Option<(f64, SubReason)> {
    let overall = f64::from(p.ratings.overall);
    match p.role {
        RotationRole::Starter => Some((200.0 + overall, SubReason::GarbageTime)),
        RotationRole::Rotation => Some((100.0 + overall, SubReason::GarbageTime)),
        RotationRole::Reserve => None,
    }
}

/// Deepest bench first; starters stay seated.
fn garbage_readiness(p: &Player) -> Option<f64> {
    if !p.is_available() || p.role == RotationRole::Starter || p.state.starter {
        return None;
    }
    let depth = if p.role == RotationRole::Reserve { 100.0 } else { 0.0 };
    Some(depth + 100.0 - f64::from(p.ratings.overall))
}
