//! Regular season loop followed by the postseason.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_league, validate_schedule, Conference, EngineConfig, GameResult, League,
    ScheduleEntry, SeasonConfig, Side, SimRng, TeamId,
};
use sim_engine::simulate_game;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::error::RunError;
use crate::mvp::{self, MvpEntry};
use crate::playoffs::{run_playoffs, GameRunner, PlayoffBracketResult};
use crate::standings::{conference_standings, Records, StandingEntry};
use crate::stats::SeasonStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonPhase {
    RegularSeason,
    Playoffs,
}

/// Reported after every game, regular season and postseason alike.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonProgress {
    pub phase: SeasonPhase,
    pub games_played: usize,
    pub scheduled_games: usize,
}

/// Top scorer line shown in a recap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performer {
    pub name: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecap {
    pub date: NaiveDate,
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    pub final_period: u8,
    pub home_top: Option<Performer>,
    pub away_top: Option<Performer>,
    /// Full game, only when `keep_game_logs` is set.
    pub result: Option<GameResult>,
}

impl GameRecap {
    fn new(date: NaiveDate, r: &GameResult, keep_log: bool) -> Self {
        let top = |side| {
            r.box_score.side(side).top_scorer().map(|p| Performer {
                name: p.name.clone(),
                points: p.stats.points,
                rebounds: p.stats.rebounds,
                assists: p.stats.assists,
            })
        };
        Self {
            date,
            home: r.home.clone(),
            away: r.away.clone(),
            home_score: r.home_score,
            away_score: r.away_score,
            final_period: r.final_period,
            home_top: top(Side::Home),
            away_top: top(Side::Away),
            result: keep_log.then(|| r.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub seed: u64,
    pub east: Vec<StandingEntry>,
    pub west: Vec<StandingEntry>,
    pub records: Records,
    pub stats: SeasonStats,
    pub recaps: Vec<GameRecap>,
    pub playoffs: Option<PlayoffBracketResult>,
    pub champion: Option<TeamId>,
    pub mvp: Option<MvpEntry>,
    /// Regular-season and postseason games combined.
    pub games_played: usize,
}

impl SeasonResult {
    pub fn standings(&self, conference: Conference) -> &[StandingEntry] {
        match conference {
            Conference::East => &self.east,
            Conference::West => &self.west,
        }
    }
}

/// Plays games on the season's private league copy and single stream.
struct LeagueRunner<'a> {
    league: League,
    engine: &'a EngineConfig,
    rng: SimRng,
    cancel: &'a CancelToken,
    on_progress: &'a mut dyn FnMut(&SeasonProgress),
    phase: SeasonPhase,
    games_played: usize,
    scheduled_games: usize,
}

impl GameRunner for LeagueRunner<'_> {
    fn play(&mut self, home: &TeamId, away: &TeamId) -> Result<GameResult, RunError> {
        if self.cancel.is_cancelled() {
            info!(games = self.games_played, "season aborted");
            return Err(RunError::Aborted);
        }
        let (h, a) = match (self.league.index_of(home), self.league.index_of(away)) {
            (Some(h), Some(a)) => (h, a),
            _ => {
                return Err(RunError::Worker(format!(
                    "unknown matchup {home} vs {away}"
                )))
            }
        };
        let (home_team, away_team) = self.league.pair_mut(h, a).ok_or_else(|| {
            RunError::Worker(format!("{home} cannot play itself"))
        })?;
        let result = simulate_game(home_team, away_team, self.engine, &mut self.rng)?;
        self.games_played += 1;
        (self.on_progress)(&SeasonProgress {
            phase: self.phase,
            games_played: self.games_played,
            scheduled_games: self.scheduled_games,
        });
        Ok(result)
    }
}

/// Simulates a regular season and, when enabled, the play-in and playoffs.
///
/// Inputs are validated up front and the league is cloned, so the caller's
/// teams are never touched. The same `seed` and inputs always produce the
/// same result. Cancellation is checked before each game and yields
/// [`RunError::Aborted`] without a partial result.
pub fn simulate_season(
    league: &League,
    schedule: &[ScheduleEntry],
    cfg: &SeasonConfig,
    seed: u64,
    on_progress: &mut dyn FnMut(&SeasonProgress),
    cancel: &CancelToken,
) -> Result<SeasonResult, RunError> {
    cfg.validate()?;
    validate_league(league, cfg.playoffs.enabled)?;
    validate_schedule(league, schedule)?;
    info!(seed, teams = league.teams.len(), games = schedule.len(), "season started");

    let mut runner = LeagueRunner {
        league: league.clone(),
        engine: &cfg.engine,
        rng: SimRng::new(seed),
        cancel,
        on_progress,
        phase: SeasonPhase::RegularSeason,
        games_played: 0,
        scheduled_games: schedule.len(),
    };
    let mut records = Records::for_league(league);
    let mut stats = SeasonStats::new();
    let mut recaps = Vec::with_capacity(schedule.len());

    for entry in schedule {
        let r = runner.play(&entry.home, &entry.away)?;
        records.record_game(&r);
        stats.record_game(&r);
        debug!(date = %entry.date, home = %r.home, away = %r.away, home_score = r.home_score, away_score = r.away_score, "game final");
        recaps.push(GameRecap::new(entry.date, &r, cfg.keep_game_logs));
    }

    let mvp = mvp::season_mvp(&stats, &records, &cfg.mvp);
    let playoffs = if cfg.playoffs.enabled {
        runner.phase = SeasonPhase::Playoffs;
        Some(run_playoffs(league, &records, cfg, &mut runner)?)
    } else {
        None
    };
    let champion = playoffs.as_ref().map(|p| p.champion.clone());
    info!(
        seed,
        games = runner.games_played,
        champion = champion.as_ref().map(TeamId::as_str).unwrap_or("-"),
        "season complete"
    );
    Ok(SeasonResult {
        seed,
        east: conference_standings(league, &records, Conference::East),
        west: conference_standings(league, &records, Conference::West),
        records,
        stats,
        recaps,
        playoffs,
        champion,
        mvp,
        games_played: runner.games_played,
    })
}
