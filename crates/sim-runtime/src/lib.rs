#![deny(warnings)]

//! Season orchestration on top of the game engine.
//!
//! A season run owns a private copy of the league, plays the schedule on one
//! seeded stream, keeps records and stats current after every game and then
//! runs the play-in and playoff bracket. The prediction runner repeats whole
//! seasons with derived seeds; `host` moves either job onto a worker thread.

pub mod cancel;
pub mod error;
pub mod host;
pub mod mvp;
pub mod playoffs;
pub mod prediction;
pub mod season;
pub mod standings;
pub mod stats;

pub use cancel::CancelToken;
pub use error::RunError;
pub use host::{start_prediction, start_season, HostHandle, HostMessage};
pub use mvp::MvpEntry;
pub use playoffs::{PlayoffBracketResult, PlayoffStatus, SeriesResult};
pub use prediction::{run_prediction, PredictionEntry, PredictionProgress, PredictionResult};
pub use season::{simulate_season, GameRecap, SeasonPhase, SeasonProgress, SeasonResult};
pub use standings::{conference_standings, Records, StandingEntry, TeamRecord};
pub use stats::{LeaderEntry, PlayerStat, SeasonStats, TeamStat};

#[cfg(test)]
pub(crate) mod testing {
    use sim_core::{BoxScore, GameResult, League, ScoreSnapshot, TeamBox, TeamId};

    /// A finished 100-90 game without an event log. The first roster slot
    /// scores every point and the five starters play the whole game.
    pub fn scripted_result(league: &League, home: &TeamId, away: &TeamId, home_wins: bool) -> GameResult {
        let (home_score, away_score) = if home_wins { (100, 90) } else { (90, 100) };
        let team_box = |id: &TeamId, points: u32| {
            let mut team = league.team(id).expect("team in league").clone();
            team.reset_for_game();
            for p in team.roster.iter_mut().take(5) {
                p.state.seconds_played = 2880;
            }
            team.roster[0].state.line.points = points;
            TeamBox::from_team(&team)
        };
        let final_score = ScoreSnapshot {
            home: home_score,
            away: away_score,
        };
        GameResult {
            home: home.clone(),
            away: away.clone(),
            home_score,
            away_score,
            period_scores: vec![final_score],
            events: Vec::new(),
            score_snapshots: Vec::new(),
            time_snapshots: Vec::new(),
            box_score: BoxScore {
                home: team_box(home, home_score),
                away: team_box(away, away_score),
            },
            winner: if home_wins { home.clone() } else { away.clone() },
            final_period: 4,
            regulation_periods: 4,
            seed: 0,
        }
    }
}
