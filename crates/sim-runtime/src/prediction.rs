//! Championship odds by repeated full-season simulation.

use serde::{Deserialize, Serialize};
use sim_core::{derive_seed, League, ScheduleEntry, SeasonConfig, TeamId, ValidationError};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::error::RunError;
use crate::season::simulate_season;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub team: TeamId,
    pub championships: u32,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Every team, most titles first, ties by name.
    pub rankings: Vec<PredictionEntry>,
    pub total_simulations: u32,
    pub base_seed: u64,
    pub elapsed_ms: u64,
}

impl PredictionResult {
    pub fn entry(&self, team: &TeamId) -> Option<&PredictionEntry> {
        self.rankings.iter().find(|e| &e.team == team)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionProgress {
    pub completed: u32,
    pub total: u32,
    pub last_champion: TeamId,
}

/// Runs `count` seasons, the `i`-th seeded with `derive_seed(base_seed, i)`,
/// and tallies champions. Game logs are never kept. Cancellation is checked
/// between runs and between games inside a run.
pub fn run_prediction(
    league: &League,
    schedule: &[ScheduleEntry],
    cfg: &SeasonConfig,
    count: u32,
    base_seed: u64,
    on_progress: &mut dyn FnMut(&PredictionProgress),
    cancel: &CancelToken,
) -> Result<PredictionResult, RunError> {
    if !cfg.playoffs.enabled {
        return Err(ValidationError::Config {
            field: "playoffs.enabled".into(),
            reason: "predictions need a champion".into(),
        }
        .into());
    }
    let mut cfg = cfg.clone();
    cfg.keep_game_logs = false;
    let started = Instant::now();
    info!(count, base_seed, "prediction started");

    let mut titles: BTreeMap<TeamId, u32> =
        league.teams.iter().map(|t| (t.id.clone(), 0)).collect();
    for i in 0..count {
        if cancel.is_cancelled() {
            info!(completed = i, "prediction aborted");
            return Err(RunError::Aborted);
        }
        let seed = derive_seed(base_seed, u64::from(i));
        let season = simulate_season(league, schedule, &cfg, seed, &mut |_| {}, cancel)?;
        let Some(champion) = season.champion else {
            return Err(RunError::Worker(format!("season {seed} ended without a champion")));
        };
        *titles.entry(champion.clone()).or_default() += 1;
        debug!(run = i, seed, champion = %champion, "prediction run done");
        on_progress(&PredictionProgress {
            completed: i + 1,
            total: count,
            last_champion: champion,
        });
    }

    let mut rankings: Vec<PredictionEntry> = titles
        .into_iter()
        .map(|(team, championships)| PredictionEntry {
            team,
            championships,
            percentage: if count == 0 {
                0.0
            } else {
                100.0 * f64::from(championships) / f64::from(count)
            },
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.championships
            .cmp(&a.championships)
            .then_with(|| a.team.cmp(&b.team))
    });
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(count, elapsed_ms, "prediction complete");
    Ok(PredictionResult {
        rankings,
        total_simulations: count,
        base_seed,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::fixtures::{sample_league, sample_schedule};

    fn inputs() -> (League, Vec<ScheduleEntry>, SeasonConfig) {
        let league = sample_league(10);
        let schedule = sample_schedule(&league, 2);
        let mut cfg = SeasonConfig::default();
        cfg.playoffs.series_wins = 2;
        (league, schedule, cfg)
    }

    #[test]
    fn ten_runs_from_seed_seven_repeat_exactly() {
        let (league, schedule, cfg) = inputs();
        let mut progress = Vec::new();
        let a = run_prediction(
            &league,
            &schedule,
            &cfg,
            10,
            7,
            &mut |p| progress.push(p.completed),
            &CancelToken::new(),
        )
        .unwrap();
        let b = run_prediction(&league, &schedule, &cfg, 10, 7, &mut |_| {}, &CancelToken::new())
            .unwrap();
        assert_eq!(a.rankings, b.rankings);
        assert_eq!(a.total_simulations, 10);
        assert_eq!(progress, (1..=10).collect::<Vec<_>>());
        assert_eq!(a.rankings.len(), league.teams.len());
        let titles: u32 = a.rankings.iter().map(|e| e.championships).sum();
        assert_eq!(titles, 10);
        let pct: f64 = a.rankings.iter().map(|e| e.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
        assert!(a
            .rankings
            .windows(2)
            .all(|w| w[0].championships > w[1].championships
                || (w[0].championships == w[1].championships && w[0].team < w[1].team)));
    }

    #[test]
    fn run_i_matches_a_season_seeded_the_same_way() {
        let (league, schedule, cfg) = inputs();
        let p = run_prediction(&league, &schedule, &cfg, 1, 40, &mut |_| {}, &CancelToken::new())
            .unwrap();
        let season =
            simulate_season(&league, &schedule, &cfg, 40, &mut |_| {}, &CancelToken::new())
                .unwrap();
        let champion = season.champion.unwrap();
        assert_eq!(p.entry(&champion).map(|e| e.championships), Some(1));
        assert_eq!(p.rankings[0].team, champion);
    }

    #[test]
    fn cancelled_before_start_aborts() {
        let (league, schedule, cfg) = inputs();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = run_prediction(&league, &schedule, &cfg, 3, 1, &mut |_| {}, &cancel).unwrap_err();
        assert_eq!(err, RunError::Aborted);
    }

    #[test]
    fn needs_playoffs() {
        let (league, schedule, mut cfg) = inputs();
        cfg.playoffs.enabled = false;
        let err = run_prediction(&league, &schedule, &cfg, 1, 1, &mut |_| {}, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, RunError::Invalid(ValidationError::Config { .. })));
    }
}
