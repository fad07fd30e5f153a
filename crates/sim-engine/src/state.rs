//! Mutable state of one game in progress: both teams, the clock and the log.

use sim_ai::GameSituation;
use sim_core::{EventKind, GameEvent, PlayerRef, ScoreSnapshot, Side, Team, TimeSnapshot};

use crate::error::SimError;

/// Event log with the score and clock recorded alongside every entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameLog {
    pub events: Vec<GameEvent>,
    pub scores: Vec<ScoreSnapshot>,
    pub times: Vec<TimeSnapshot>,
}

impl GameLog {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Both teams borrowed for the duration of one game.
pub struct GameContext<'t> {
    home: &'t mut Team,
    away: &'t mut Team,
    pub period: u8,
    pub seconds_remaining: u32,
    /// Game seconds since tip-off.
    pub elapsed: u32,
    pub regulation_periods: u8,
    log: GameLog,
}

impl<'t> GameContext<'t> {
    pub fn new(home: &'t mut Team, away: &'t mut Team, regulation_periods: u8) -> Self {
        Self {
            home,
            away,
            period: 0,
            seconds_remaining: 0,
            elapsed: 0,
            regulation_periods,
            log: GameLog::default(),
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &*self.home,
            Side::Away => &*self.away,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Home => &mut *self.home,
            Side::Away => &mut *self.away,
        }
    }

    /// `(side, other side)` borrowed mutably at once.
    pub fn sides_mut(&mut self, side: Side) -> (&mut Team, &mut Team) {
        match side {
            Side::Home => (&mut *self.home, &mut *self.away),
            Side::Away => (&mut *self.away, &mut *self.home),
        }
    }

    pub fn score(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            home: self.home.game.score,
            away: self.away.game.score,
        }
    }

    /// Score of `side` minus the opponent's.
    pub fn margin(&self, side: Side) -> i32 {
        let s = self.score();
        let diff = i64::from(s.home) - i64::from(s.away);
        let diff = i32::try_from(diff).unwrap_or(0);
        match side {
            Side::Home => diff,
            Side::Away => -diff,
        }
    }

    pub fn situation(&self, side: Side) -> GameSituation {
        GameSituation {
            period: self.period,
            seconds_remaining: self.seconds_remaining,
            elapsed: self.elapsed,
            regulation_periods: self.regulation_periods,
            margin: self.margin(side),
        }
    }

    pub fn is_overtime(&self) -> bool {
        self.period > self.regulation_periods
    }

    /// Opens `period` with `seconds` on the clock.
    pub fn start_period(&mut self, period: u8, seconds: u32) {
        self.period = period;
        self.seconds_remaining = seconds;
        self.home.start_period();
        self.away.start_period();
    }

    /// Runs the clock for `span` seconds.
    pub fn advance(&mut self, span: u32) -> Result<(), SimError> {
        self.seconds_remaining =
            self.seconds_remaining
                .checked_sub(span)
                .ok_or(SimError::ClockUnderflow {
                    period: self.period,
                    seconds_remaining: self.seconds_remaining,
                    span,
                })?;
        self.elapsed += span;
        Ok(())
    }

    /// Appends an event stamped with the current score and clock.
    pub fn push(&mut self, kind: EventKind) {
        self.log.events.push(GameEvent {
            period: self.period,
            seconds_remaining: self.seconds_remaining,
            kind,
        });
        let score = self.score();
        self.log.scores.push(score);
        self.log.times.push(TimeSnapshot {
            period: self.period,
            seconds_remaining: self.seconds_remaining,
        });
    }

    /// Credits points to a player and updates plus-minus for all ten on court.
    pub fn add_points(&mut self, scorer: PlayerRef, points: u32) {
        let delta = i32::try_from(points).unwrap_or(i32::MAX);
        let (team, opp) = self.sides_mut(scorer.side);
        team.add_points(scorer.index, points);
        for &i in &team.on_court {
            team.roster[i].state.plus_minus += delta;
        }
        for &i in &opp.on_court {
            opp.roster[i].state.plus_minus -= delta;
        }
    }

    /// Roster index of the player guarding lineup slot of `player`.
    pub fn matchup(&self, player: PlayerRef) -> Option<usize> {
        let slot = self
            .team(player.side)
            .on_court
            .iter()
            .position(|&i| i == player.index)?;
        let opp = self.team(player.side.other());
        opp.on_court.get(slot).or_else(|| opp.on_court.first()).copied()
    }

    pub fn into_log(self) -> GameLog {
        self.log
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }
}
