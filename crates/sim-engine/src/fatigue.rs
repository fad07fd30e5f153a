//! Fatigue and minutes accounting.

use sim_core::config::FatigueConfig;
use sim_core::{Player, Team};

/// Fatigue gained per second on court. Low durability and athleticism tire faster.
pub fn gain_per_second(cfg: &FatigueConfig, p: &Player) -> f64 {
    let durability = 70.0 - f64::from(p.ratings.durability);
    let athleticism = 70.0 - f64::from(p.ratings.athleticism);
    let scale = 1.0 + cfg.durability_factor * durability + cfg.athleticism_factor * athleticism;
    cfg.gain_per_second * scale.max(0.25)
}

/// Runs `span` seconds for a team: minutes and fatigue for the five on court,
/// recovery for the bench.
pub fn accrue(cfg: &FatigueConfig, team: &mut Team, span: u32) {
    let secs = f64::from(span);
    for (i, p) in team.roster.iter_mut().enumerate() {
        if team.on_court.contains(&i) {
            p.state.seconds_played += span;
            p.state.fatigue = (p.state.fatigue + gain_per_second(cfg, p) * secs).min(100.0);
        } else {
            p.state.fatigue = (p.state.fatigue - cfg.recovery_per_second * secs).max(0.0);
        }
    }
}

/// Recovery during the break after a period.
pub fn period_break(cfg: &FatigueConfig, team: &mut Team, halftime: bool) {
    let amount = if halftime {
        cfg.halftime_recovery
    } else {
        cfg.quarter_break_recovery
    };
    for p in &mut team.roster {
        p.state.fatigue = (p.state.fatigue - amount).max(0.0);
    }
}
