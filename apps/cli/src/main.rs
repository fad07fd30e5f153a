#![deny(warnings)]

//! Command line front end: single games, full seasons and championship odds.

mod render;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use sim_core::fixtures::{sample_league, sample_schedule};
use sim_core::{League, ScheduleEntry, SeasonConfig, TeamId};
use sim_runtime::{HostHandle, HostMessage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("HOOPSIM_GIT_SHA"),
    " ",
    env!("HOOPSIM_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "hoopsim", version, long_version = LONG_VERSION, about = "Possession-level basketball league simulator")]
struct Cli {
    /// YAML file overriding engine, playoff and MVP constants.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Roster CSV or league JSON. Without it a 20-team demo league is used.
    #[arg(long, global = true)]
    roster: Option<PathBuf>,
    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one game.
    Game {
        /// Home team id; defaults to the first team in the league.
        home: Option<String>,
        /// Away team id; defaults to the second team in the league.
        away: Option<String>,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the full play-by-play.
        #[arg(long)]
        plays: bool,
    },
    /// Simulate a regular season and playoffs.
    Season {
        /// Schedule file (`YYYY-MM-DD,HOME,AWAY` per line).
        #[arg(long)]
        schedule: Option<PathBuf>,
        /// Home-and-away round robin passes when no schedule file is given.
        #[arg(long)]
        rounds: Option<usize>,
        /// Random when omitted; the seed used is logged.
        #[arg(long)]
        seed: Option<u64>,
        /// Rows per leaderboard.
        #[arg(long, default_value_t = 5)]
        leaders: usize,
    },
    /// Championship odds from repeated seasons.
    Predict {
        #[arg(long)]
        schedule: Option<PathBuf>,
        #[arg(long)]
        rounds: Option<usize>,
        #[arg(long, default_value_t = 100)]
        count: u32,
        /// Run `i` uses `seed + i`.
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn load_config(path: Option<&Path>) -> Result<SeasonConfig> {
    let cfg: SeasonConfig = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", p.display()))?
        }
        None => SeasonConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn load_league(path: Option<&Path>) -> Result<League> {
    match path {
        Some(p) => Ok(data_pipeline::load_league_file(p)?),
        None => Ok(sample_league(10)),
    }
}

fn load_schedule(league: &League, path: Option<&Path>, rounds: Option<usize>) -> Result<Vec<ScheduleEntry>> {
    match path {
        Some(p) => Ok(data_pipeline::load_schedule_file(p)?),
        None => {
            // Two passes of the circle method give every pairing home and away.
            let n = league.teams.len() + league.teams.len() % 2;
            let rounds = rounds.unwrap_or(2 * n.saturating_sub(1));
            Ok(sample_schedule(league, rounds))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Drains a worker's messages, logging progress every `every` updates.
fn follow<P: std::fmt::Debug, T>(handle: HostHandle<P, T>, every: usize) -> Result<T> {
    let mut seen = 0usize;
    for msg in handle.messages() {
        match msg {
            HostMessage::Started { seed } => info!(seed, "run started"),
            HostMessage::Progress(p) => {
                seen += 1;
                if seen % every.max(1) == 0 {
                    info!(progress = ?p, "running");
                } else {
                    debug!(progress = ?p, "running");
                }
            }
            HostMessage::Completed(t) => return Ok(t),
            HostMessage::Failed(e) => return Err(e.into()),
            HostMessage::Aborted => bail!("run aborted"),
        }
    }
    Err(anyhow!("worker stopped without a result"))
}

fn run_game(league: League, cfg: &SeasonConfig, home: Option<String>, away: Option<String>, seed: u64, plays: bool, json: bool) -> Result<()> {
    let pick = |given: Option<String>, fallback: usize| -> Result<usize> {
        match given {
            Some(id) => league
                .index_of(&TeamId::from(id.as_str()))
                .ok_or_else(|| anyhow!("no team {id} in the league")),
            None if league.teams.len() > fallback => Ok(fallback),
            None => bail!("league needs at least two teams"),
        }
    };
    let (h, a) = (pick(home, 0)?, pick(away, 1)?);
    let mut league = league;
    let (home_team, away_team) = league
        .pair_mut(h, a)
        .ok_or_else(|| anyhow!("a team cannot play itself"))?;
    info!(home = %home_team.id, away = %away_team.id, seed, "tip-off");
    let result = sim_engine::simulate_game_seeded(home_team, away_team, &cfg.engine, seed)?;
    if json {
        return print_json(&result);
    }
    if plays {
        print!("{}", render::play_by_play(&result));
        println!();
    }
    print!("{}", render::box_score(&result));
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    let league = load_league(cli.roster.as_deref())?;
    info!(teams = league.teams.len(), "league ready");

    match cli.command {
        Command::Game {
            home,
            away,
            seed,
            plays,
        } => run_game(league, &cfg, home, away, seed, plays, cli.json)?,
        Command::Season {
            schedule,
            rounds,
            seed,
            leaders,
        } => {
            let schedule = load_schedule(&league, schedule.as_deref(), rounds)?;
            let handle = sim_runtime::start_season(league, schedule, cfg, seed)?;
            let result = follow(handle, 100)?;
            if cli.json {
                return print_json(&result);
            }
            print!("{}", render::season_summary(&result));
            for (title, stat) in [
                ("Points", sim_runtime::PlayerStat::Points),
                ("Rebounds", sim_runtime::PlayerStat::Rebounds),
                ("Assists", sim_runtime::PlayerStat::Assists),
            ] {
                let min_games = result.recaps.len() as u32 / 20;
                let rows = result.stats.player_leaders(stat, leaders, min_games);
                print!("{}", render::leaders(title, &rows));
            }
            let defense = result
                .stats
                .team_leaders(sim_runtime::TeamStat::PointsAllowed, leaders);
            print!("{}", render::leaders("Fewest points allowed", &defense));
            println!("Seed: {}", result.seed);
        }
        Command::Predict {
            schedule,
            rounds,
            count,
            seed,
        } => {
            let schedule = load_schedule(&league, schedule.as_deref(), rounds)?;
            let handle = sim_runtime::start_prediction(league, schedule, cfg, count, seed)?;
            let result = follow(handle, 10)?;
            if cli.json {
                return print_json(&result);
            }
            print!("{}", render::odds(&result));
        }
    }
    Ok(())
}
