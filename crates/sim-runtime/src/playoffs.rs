//! Play-in tournament, conference brackets and the finals.

use serde::{Deserialize, Serialize};
use sim_core::config::MvpWeights;
use sim_core::{Conference, GameResult, League, SeasonConfig, TeamId, ValidationError};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::RunError;
use crate::mvp::{self, MvpEntry};
use crate::standings::{compare_records, conference_standings, Records, TeamRecord};
use crate::stats::SeasonStats;

/// Plays one game between two league teams. The season loop implements it
/// on top of the engine; tests script the outcomes.
pub trait GameRunner {
    fn play(&mut self, home: &TeamId, away: &TeamId) -> Result<GameResult, RunError>;
}

/// Home sides of a best-of-seven: 2-2-1-1-1, from the higher seed's view.
const SEVEN_GAME_HOSTS: [bool; 7] = [true, true, false, false, true, false, true];

/// Whether the higher seed hosts game `game` (0-based) of a best-of-`max_games`.
/// Other series lengths alternate, higher seed first.
pub fn higher_seed_hosts(game: usize, max_games: usize) -> bool {
    if max_games == SEVEN_GAME_HOSTS.len() {
        SEVEN_GAME_HOSTS[game % SEVEN_GAME_HOSTS.len()]
    } else {
        game % 2 == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffRound {
    FirstRound,
    Semifinals,
    ConferenceFinals,
    Finals,
}

/// Where a team's season ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffStatus {
    MissedPlayoffs,
    EliminatedPlayIn,
    EliminatedFirstRound,
    EliminatedSemifinals,
    EliminatedConferenceFinals,
    RunnerUp,
    Champion,
}

impl PlayoffStatus {
    fn eliminated_in(round: PlayoffRound) -> Self {
        match round {
            PlayoffRound::FirstRound => PlayoffStatus::EliminatedFirstRound,
            PlayoffRound::Semifinals => PlayoffStatus::EliminatedSemifinals,
            PlayoffRound::ConferenceFinals => PlayoffStatus::EliminatedConferenceFinals,
            PlayoffRound::Finals => PlayoffStatus::RunnerUp,
        }
    }
}

/// Condensed line of a postseason game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffGame {
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: TeamId,
    pub final_period: u8,
}

impl PlayoffGame {
    fn from_result(r: &GameResult) -> Self {
        Self {
            home: r.home.clone(),
            away: r.away.clone(),
            home_score: r.home_score,
            away_score: r.away_score,
            winner: r.winner.clone(),
            final_period: r.final_period,
        }
    }

    pub fn loser(&self) -> &TeamId {
        if self.winner == self.home {
            &self.away
        } else {
            &self.home
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayInResult {
    /// 7 hosts 8; the winner is the 7 seed.
    pub seven_eight: PlayoffGame,
    /// 9 hosts 10; the loser is out.
    pub nine_ten: PlayoffGame,
    /// Loser of 7/8 hosts winner of 9/10 for the 8 seed.
    pub decider: PlayoffGame,
    pub seventh_seed: TeamId,
    pub eighth_seed: TeamId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub round: PlayoffRound,
    pub higher_seed: TeamId,
    pub lower_seed: TeamId,
    pub games: Vec<PlayoffGame>,
    pub higher_wins: u8,
    pub lower_wins: u8,
    pub winner: TeamId,
    pub mvp: Option<MvpEntry>,
}

impl SeriesResult {
    pub fn loser(&self) -> &TeamId {
        if self.winner == self.higher_seed {
            &self.lower_seed
        } else {
            &self.higher_seed
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConferenceBracket {
    pub conference: Conference,
    pub play_in: Option<PlayInResult>,
    /// Playoff seeds 1 to 8, after the play-in.
    pub seeds: Vec<TeamId>,
    /// 1v8, 4v5, 3v6, 2v7.
    pub first_round: Vec<SeriesResult>,
    pub semifinals: Vec<SeriesResult>,
    pub final_series: SeriesResult,
}

impl ConferenceBracket {
    pub fn champion(&self) -> &TeamId {
        &self.final_series.winner
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracketResult {
    pub east: ConferenceBracket,
    pub west: ConferenceBracket,
    pub finals: SeriesResult,
    pub champion: TeamId,
    pub finals_mvp: Option<MvpEntry>,
    pub statuses: BTreeMap<TeamId, PlayoffStatus>,
    /// Postseason totals, play-in included.
    pub stats: SeasonStats,
}

struct Postseason<'a, R: GameRunner> {
    runner: &'a mut R,
    series_wins: u8,
    weights: &'a MvpWeights,
    statuses: BTreeMap<TeamId, PlayoffStatus>,
    stats: SeasonStats,
}

impl<R: GameRunner> Postseason<'_, R> {
    fn game(&mut self, home: &TeamId, away: &TeamId) -> Result<(GameResult, PlayoffGame), RunError> {
        let r = self.runner.play(home, away)?;
        self.stats.record_game(&r);
        let summary = PlayoffGame::from_result(&r);
        Ok((r, summary))
    }

    fn play_in(&mut self, table: &[TeamId]) -> Result<PlayInResult, RunError> {
        let (_, seven_eight) = self.game(&table[6], &table[7])?;
        let (_, nine_ten) = self.game(&table[8], &table[9])?;
        let (_, decider) = self.game(seven_eight.loser(), &nine_ten.winner)?;
        self.statuses
            .insert(nine_ten.loser().clone(), PlayoffStatus::EliminatedPlayIn);
        self.statuses
            .insert(decider.loser().clone(), PlayoffStatus::EliminatedPlayIn);
        debug!(seven = %seven_eight.winner, eight = %decider.winner, "play-in decided");
        Ok(PlayInResult {
            seventh_seed: seven_eight.winner.clone(),
            eighth_seed: decider.winner.clone(),
            seven_eight,
            nine_ten,
            decider,
        })
    }

    /// Plays until one side reaches `series_wins`; returns the result and
    /// the series' own stats.
    fn series(
        &mut self,
        round: PlayoffRound,
        higher: &TeamId,
        lower: &TeamId,
    ) -> Result<(SeriesResult, SeasonStats), RunError> {
        let need = self.series_wins.max(1);
        let max_games = usize::from(need) * 2 - 1;
        let mut stats = SeasonStats::new();
        let mut games = Vec::new();
        let (mut hw, mut lw) = (0u8, 0u8);
        while hw < need && lw < need {
            let (home, away) = if higher_seed_hosts(games.len(), max_games) {
                (higher, lower)
            } else {
                (lower, higher)
            };
            let (r, summary) = self.game(home, away)?;
            stats.record_game(&r);
            if &summary.winner == higher {
                hw += 1;
            } else {
                lw += 1;
            }
            games.push(summary);
        }
        let winner = if hw == need { higher } else { lower };
        let mvp = mvp::series_mvp(&stats, winner, self.weights);
        let result = SeriesResult {
            round,
            higher_seed: higher.clone(),
            lower_seed: lower.clone(),
            games,
            higher_wins: hw,
            lower_wins: lw,
            winner: winner.clone(),
            mvp,
        };
        self.statuses
            .insert(result.loser().clone(), PlayoffStatus::eliminated_in(round));
        info!(?round, winner = %result.winner, higher = hw, lower = lw, "series over");
        Ok((result, stats))
    }

    fn conference(
        &mut self,
        league: &League,
        records: &Records,
        conference: Conference,
        play_in: bool,
    ) -> Result<ConferenceBracket, RunError> {
        let table: Vec<TeamId> = conference_standings(league, records, conference)
            .into_iter()
            .map(|e| e.team)
            .collect();
        let needed = if play_in { 10 } else { 8 };
        if table.len() < needed {
            return Err(ValidationError::ConferenceTooSmall {
                conference,
                size: table.len(),
                min: needed,
            }
            .into());
        }
        let play_in = if play_in { Some(self.play_in(&table)?) } else { None };
        let mut seeds: Vec<TeamId> = table.iter().take(8).cloned().collect();
        if let Some(p) = &play_in {
            seeds.truncate(6);
            seeds.push(p.seventh_seed.clone());
            seeds.push(p.eighth_seed.clone());
        }

        let mut first_round = Vec::new();
        for (h, l) in [(0, 7), (3, 4), (2, 5), (1, 6)] {
            first_round.push(self.series(PlayoffRound::FirstRound, &seeds[h], &seeds[l])?.0);
        }
        let seed_of = |t: &TeamId| seeds.iter().position(|s| s == t).unwrap_or(usize::MAX);
        let ordered = |a: &TeamId, b: &TeamId| {
            if seed_of(a) <= seed_of(b) {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            }
        };
        let mut semifinals = Vec::new();
        for pair in first_round.chunks(2) {
            let (h, l) = ordered(&pair[0].winner, &pair[1].winner);
            semifinals.push(self.series(PlayoffRound::Semifinals, &h, &l)?.0);
        }
        let (h, l) = ordered(&semifinals[0].winner, &semifinals[1].winner);
        let final_series = self.series(PlayoffRound::ConferenceFinals, &h, &l)?.0;
        Ok(ConferenceBracket {
            conference,
            play_in,
            seeds,
            first_round,
            semifinals,
            final_series,
        })
    }
}

/// Finals home court: better record, then point differential, then name.
fn finals_order<'a>(records: &Records, a: &'a TeamId, b: &'a TeamId) -> (&'a TeamId, &'a TeamId) {
    let empty = TeamRecord::default();
    let ra = records.get(a).unwrap_or(&empty);
    let rb = records.get(b).unwrap_or(&empty);
    match compare_records((a, ra), (b, rb)) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    }
}

/// Runs the whole postseason: East bracket, West bracket, then the finals.
pub fn run_playoffs<R: GameRunner>(
    league: &League,
    records: &Records,
    cfg: &SeasonConfig,
    runner: &mut R,
) -> Result<PlayoffBracketResult, RunError> {
    let mut post = Postseason {
        runner,
        series_wins: cfg.playoffs.series_wins,
        weights: &cfg.mvp,
        statuses: league
            .teams
            .iter()
            .map(|t| (t.id.clone(), PlayoffStatus::MissedPlayoffs))
            .collect(),
        stats: SeasonStats::new(),
    };
    let east = post.conference(league, records, Conference::East, cfg.playoffs.play_in)?;
    let west = post.conference(league, records, Conference::West, cfg.playoffs.play_in)?;
    let (higher, lower) = finals_order(records, east.champion(), west.champion());
    let (finals, finals_stats) = post.series(PlayoffRound::Finals, higher, lower)?;
    let champion = finals.winner.clone();
    post.statuses.insert(champion.clone(), PlayoffStatus::Champion);
    let finals_mvp = mvp::finals_mvp(&finals_stats, &cfg.mvp);
    info!(champion = %champion, "playoffs complete");
    Ok(PlayoffBracketResult {
        east,
        west,
        finals,
        champion,
        finals_mvp,
        statuses: post.statuses,
        stats: post.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted_result;
    use proptest::prelude::*;
    use sim_core::fixtures::sample_league;

    /// Outcomes decided by a rule over (home, away); every game is logged.
    struct Scripted<F> {
        league: League,
        home_wins: F,
        played: Vec<(TeamId, TeamId)>,
    }

    impl<F: FnMut(&TeamId, &TeamId) -> bool> GameRunner for Scripted<F> {
        fn play(&mut self, home: &TeamId, away: &TeamId) -> Result<GameResult, RunError> {
            self.played.push((home.clone(), away.clone()));
            let win = (self.home_wins)(home, away);
            Ok(scripted_result(&self.league, home, away, win))
        }
    }

    /// Standings follow the team number: E01 best, E10 worst.
    fn ranked_records(league: &League) -> Records {
        let mut records = Records::for_league(league);
        for (i, t) in league.teams.iter().enumerate() {
            let n = (i % 10) as u32;
            records.teams.insert(
                t.id.clone(),
                TeamRecord {
                    wins: 30 - n,
                    losses: 10 + n,
                    ..TeamRecord::default()
                },
            );
        }
        records
    }

    fn id(s: &str) -> TeamId {
        s.into()
    }

    #[test]
    fn seven_game_series_follows_two_two_one_one_one() {
        let league = sample_league(10);
        let mut runner = Scripted {
            league: league.clone(),
            home_wins: |_: &TeamId, _: &TeamId| true,
            played: Vec::new(),
        };
        let weights = MvpWeights::default();
        let mut post = Postseason {
            runner: &mut runner,
            series_wins: 4,
            weights: &weights,
            statuses: BTreeMap::new(),
            stats: SeasonStats::new(),
        };
        let (s, _) = post
            .series(PlayoffRound::FirstRound, &id("E01"), &id("E08"))
            .unwrap();
        let hosts: Vec<bool> = s.games.iter().map(|g| g.home == id("E01")).collect();
        assert_eq!(hosts, SEVEN_GAME_HOSTS);
        assert_eq!((s.higher_wins, s.lower_wins), (4, 3));
        assert_eq!(s.winner, id("E01"));
        assert_eq!(s.mvp.as_ref().map(|m| &m.team), Some(&id("E01")));
        assert_eq!(post.statuses[&id("E08")], PlayoffStatus::EliminatedFirstRound);
    }

    #[test]
    fn sweep_stops_at_four() {
        let league = sample_league(10);
        let higher = id("W02");
        let mut runner = Scripted {
            league: league.clone(),
            home_wins: |h: &TeamId, _: &TeamId| h.as_str() == "W02",
            played: Vec::new(),
        };
        let weights = MvpWeights::default();
        let mut post = Postseason {
            runner: &mut runner,
            series_wins: 4,
            weights: &weights,
            statuses: BTreeMap::new(),
            stats: SeasonStats::new(),
        };
        // W02 only wins at home, so the lower seed takes games three and four.
        let (s, _) = post
            .series(PlayoffRound::Semifinals, &higher, &id("W03"))
            .unwrap();
        assert_eq!(s.games.len(), 7);
        assert_eq!(s.winner, higher);

        let mut runner = Scripted {
            league,
            home_wins: |_: &TeamId, a: &TeamId| a.as_str() != "W02",
            played: Vec::new(),
        };
        let mut post = Postseason {
            runner: &mut runner,
            series_wins: 4,
            weights: &weights,
            statuses: BTreeMap::new(),
            stats: SeasonStats::new(),
        };
        let (s, _) = post
            .series(PlayoffRound::Semifinals, &higher, &id("W03"))
            .unwrap();
        assert_eq!((s.higher_wins, s.lower_wins), (4, 0));
        assert_eq!(s.games.len(), 4);
    }

    #[test]
    fn eighth_seed_goes_to_the_seven_eight_loser_when_it_wins_the_decider() {
        let league = sample_league(10);
        let records = ranked_records(&league);
        let mut runner = Scripted {
            league: league.clone(),
            home_wins: |_: &TeamId, _: &TeamId| true,
            played: Vec::new(),
        };
        let cfg = SeasonConfig::default();
        let bracket = run_playoffs(&league, &records, &cfg, &mut runner).unwrap();
        let p = bracket.east.play_in.as_ref().unwrap();
        assert_eq!((&p.seven_eight.home, &p.seven_eight.away), (&id("E07"), &id("E08")));
        assert_eq!(p.seventh_seed, id("E07"));
        assert_eq!(p.nine_ten.winner, id("E09"));
        assert_eq!((&p.decider.home, &p.decider.away), (&id("E08"), &id("E09")));
        assert_eq!(p.eighth_seed, id("E08"));
        assert_eq!(bracket.east.seeds[6], id("E07"));
        assert_eq!(bracket.east.seeds[7], id("E08"));
        assert_eq!(bracket.statuses[&id("E09")], PlayoffStatus::EliminatedPlayIn);
        assert_eq!(bracket.statuses[&id("E10")], PlayoffStatus::EliminatedPlayIn);
        assert_eq!(bracket.statuses[&id("E08")], PlayoffStatus::EliminatedFirstRound);
    }

    #[test]
    fn road_teams_sweeping_the_play_in_reshuffle_the_seeds() {
        let league = sample_league(10);
        let records = ranked_records(&league);
        let mut games = 0;
        let mut runner = Scripted {
            league: league.clone(),
            // Road teams win the East play-in, home teams everything after.
            home_wins: move |_: &TeamId, _: &TeamId| {
                games += 1;
                games > 3
            },
            played: Vec::new(),
        };
        let cfg = SeasonConfig::default();
        let bracket = run_playoffs(&league, &records, &cfg, &mut runner).unwrap();
        let p = bracket.east.play_in.as_ref().unwrap();
        assert_eq!(p.seventh_seed, id("E08"));
        assert_eq!(p.nine_ten.winner, id("E10"));
        assert_eq!((&p.decider.home, &p.decider.away), (&id("E07"), &id("E10")));
        assert_eq!(p.eighth_seed, id("E10"));
        assert_eq!(bracket.statuses[&id("E07")], PlayoffStatus::EliminatedPlayIn);
        assert_eq!(bracket.statuses[&id("E09")], PlayoffStatus::EliminatedPlayIn);
    }

    #[test]
    fn home_court_carries_the_top_seeds_to_the_title() {
        let league = sample_league(10);
        let records = ranked_records(&league);
        let mut runner = Scripted {
            league: league.clone(),
            home_wins: |_: &TeamId, _: &TeamId| true,
            played: Vec::new(),
        };
        let cfg = SeasonConfig::default();
        let bracket = run_playoffs(&league, &records, &cfg, &mut runner).unwrap();

        let firsts: Vec<(&str, &str)> = bracket
            .east
            .first_round
            .iter()
            .map(|s| (s.higher_seed.as_str(), s.lower_seed.as_str()))
            .collect();
        assert_eq!(firsts, [("E01", "E08"), ("E04", "E05"), ("E03", "E06"), ("E02", "E07")]);
        assert_eq!(bracket.east.semifinals[0].higher_seed, id("E01"));
        assert_eq!(bracket.east.semifinals[0].lower_seed, id("E04"));
        assert_eq!(bracket.east.semifinals[1].higher_seed, id("E02"));
        assert_eq!(bracket.east.champion(), &id("E01"));
        assert_eq!(bracket.west.champion(), &id("W01"));

        // Equal records and differentials: name decides finals home court.
        assert_eq!(bracket.finals.higher_seed, id("E01"));
        assert_eq!(bracket.champion, id("E01"));
        assert_eq!(bracket.statuses[&id("W01")], PlayoffStatus::RunnerUp);
        assert_eq!(bracket.statuses[&id("E01")], PlayoffStatus::Champion);
        assert_eq!(bracket.statuses[&id("E04")], PlayoffStatus::EliminatedSemifinals);
        assert_eq!(bracket.statuses[&id("E02")], PlayoffStatus::EliminatedConferenceFinals);
        assert_eq!(bracket.finals_mvp.as_ref().map(|m| &m.team), Some(&id("E01")));
        // 6 play-in games and 15 series, every one of them seven games.
        assert_eq!(runner.played.len(), 6 + 15 * 7);
    }

    #[test]
    fn without_play_in_seeds_seven_and_eight_come_straight_from_the_table() {
        let league = sample_league(10);
        let records = ranked_records(&league);
        let mut runner = Scripted {
            league: league.clone(),
            home_wins: |_: &TeamId, _: &TeamId| true,
            played: Vec::new(),
        };
        let mut cfg = SeasonConfig::default();
        cfg.playoffs.play_in = false;
        cfg.playoffs.series_wins = 1;
        let bracket = run_playoffs(&league, &records, &cfg, &mut runner).unwrap();
        assert!(bracket.east.play_in.is_none());
        assert_eq!(bracket.east.seeds[7], id("E08"));
        assert_eq!(bracket.statuses[&id("E09")], PlayoffStatus::MissedPlayoffs);
        assert_eq!(runner.played.len(), 15);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn every_bracket_has_one_champion_and_eliminates_the_rest(
            outcomes in prop::collection::vec(any::<bool>(), 111),
            series_wins in 1u8..=4,
        ) {
            let league = sample_league(10);
            let records = ranked_records(&league);
            let mut next = 0usize;
            let mut runner = Scripted {
                league: league.clone(),
                home_wins: move |_: &TeamId, _: &TeamId| {
                    next += 1;
                    outcomes[(next - 1) % outcomes.len()]
                },
                played: Vec::new(),
            };
            let mut cfg = SeasonConfig::default();
            cfg.playoffs.series_wins = series_wins;
            let bracket = run_playoffs(&league, &records, &cfg, &mut runner).unwrap();

            prop_assert_eq!(bracket.statuses.len(), league.teams.len());
            let count = |status: PlayoffStatus| bracket.statuses.values().filter(|&&s| s == status).count();
            prop_assert_eq!(count(PlayoffStatus::Champion), 1);
            prop_assert_eq!(bracket.statuses[&bracket.champion], PlayoffStatus::Champion);
            prop_assert_eq!(count(PlayoffStatus::RunnerUp), 1);
            prop_assert_eq!(count(PlayoffStatus::EliminatedConferenceFinals), 2);
            prop_assert_eq!(count(PlayoffStatus::EliminatedSemifinals), 4);
            prop_assert_eq!(count(PlayoffStatus::EliminatedFirstRound), 8);
            prop_assert_eq!(count(PlayoffStatus::EliminatedPlayIn), 4);
            prop_assert_eq!(count(PlayoffStatus::MissedPlayoffs), 0);
            prop_assert_eq!(&bracket.finals.winner, &bracket.champion);

            let series = bracket
                .east
                .first_round
                .iter()
                .chain(&bracket.east.semifinals)
                .chain([&bracket.east.final_series])
                .chain(&bracket.west.first_round)
                .chain(&bracket.west.semifinals)
                .chain([&bracket.west.final_series, &bracket.finals]);
            for s in series {
                prop_assert_eq!(s.higher_wins.max(s.lower_wins), series_wins);
                prop_assert!(s.higher_wins.min(s.lower_wins) < series_wins);
                prop_assert_eq!(s.games.len(), usize::from(s.higher_wins + s.lower_wins));
                prop_assert_ne!(bracket.statuses[&s.winner], PlayoffStatus::EliminatedPlayIn);
            }
        }
    }
}
