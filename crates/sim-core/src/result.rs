//! Structured game output: event log, snapshots and box score.
//!
//! Events are language-neutral; rendering them into sentences belongs to the
//! presentation layer.

use serde::{Deserialize, Serialize};

use crate::player::{Position, ShotZone, StatLine};
use crate::team::{Team, TeamId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// A player by side and roster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub side: Side,
    pub index: usize,
}

impl PlayerRef {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotKind {
    Layup,
    Dunk,
    Jumper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnoverKind {
    Stolen,
    BadPass,
    Travel,
    OutOfBounds,
    OffensiveFoul,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoulKind {
    Shooting,
    Flagrant,
    Charging,
    IllegalScreen,
    Blocking,
    ReachIn,
}

impl FoulKind {
    pub fn is_offensive(self) -> bool {
        matches!(self, FoulKind::Charging | FoulKind::IllegalScreen)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubReason {
    Fatigue,
    FoulTrouble,
    MinutesLimit,
    StintLimit,
    Performance,
    GarbageTime,
    Injury,
    FouledOut,
    Rest,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    JumpBall {
        home: PlayerRef,
        away: PlayerRef,
        winner: Side,
    },
    ShotMade {
        shooter: PlayerRef,
        zone: ShotZone,
        shot: ShotKind,
        distance: u8,
        points: u32,
        assist: Option<PlayerRef>,
        fast_break: bool,
    },
    ShotMissed {
        shooter: PlayerRef,
        zone: ShotZone,
        shot: ShotKind,
        distance: u8,
        blocked_by: Option<PlayerRef>,
    },
    FreeThrow {
        shooter: PlayerRef,
        made: bool,
        attempt: u8,
        of: u8,
    },
    Rebound {
        player: PlayerRef,
        offensive: bool,
    },
    Turnover {
        player: PlayerRef,
        kind: TurnoverKind,
    },
    Steal {
        player: PlayerRef,
        from: PlayerRef,
        fast_break: bool,
    },
    Foul {
        player: PlayerRef,
        on: PlayerRef,
        kind: FoulKind,
        /// Defense was already past the team-foul limit, so free throws follow.
        in_bonus: bool,
    },
    Challenge {
        side: Side,
        kind: FoulKind,
        overturned: bool,
    },
    FoulOut {
        player: PlayerRef,
    },
    Injury {
        player: PlayerRef,
    },
    Substitution {
        out: PlayerRef,
        into: PlayerRef,
        reason: SubReason,
    },
    PeriodEnd {
        period: u8,
        home: u32,
        away: u32,
    },
    OvertimeStart {
        period: u8,
    },
    FullTime {
        home: u32,
        away: u32,
        periods: u8,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub period: u8,
    pub seconds_remaining: u32,
    pub kind: EventKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub home: u32,
    pub away: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSnapshot {
    pub period: u8,
    pub seconds_remaining: u32,
}

/// One row of a box score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub name: String,
    pub position: Position,
    pub starter: bool,
    pub seconds_played: u32,
    pub plus_minus: i32,
    pub injured: bool,
    pub fouled_out: bool,
    pub stats: StatLine,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub team: TeamId,
    pub players: Vec<PlayerLine>,
    pub totals: StatLine,
}

impl TeamBox {
    /// Snapshot of a team's post-game state; rows follow roster order.
    pub fn from_team(team: &Team) -> Self {
        let players: Vec<PlayerLine> = team
            .roster
            .iter()
            .map(|p| PlayerLine {
                name: p.name.clone(),
                position: p.position,
                starter: p.state.starter,
                seconds_played: p.state.seconds_played,
                plus_minus: p.state.plus_minus,
                injured: p.state.injured,
                fouled_out: p.state.fouled_out,
                stats: p.state.line.clone(),
            })
            .collect();
        let mut totals = StatLine::default();
        for p in &players {
            totals.accumulate(&p.stats);
        }
        Self {
            team: team.id.clone(),
            players,
            totals,
        }
    }

    /// Highest scoring row, ties to the earlier roster slot.
    pub fn top_scorer(&self) -> Option<&PlayerLine> {
        self.players
            .iter()
            .rev()
            .max_by_key(|p| p.stats.points)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub home: TeamBox,
    pub away: TeamBox,
}

impl BoxScore {
    pub fn side(&self, side: Side) -> &TeamBox {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn player(&self, r: PlayerRef) -> Option<&PlayerLine> {
        self.side(r.side).players.get(r.index)
    }
}

/// Everything a finished game produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    /// Cumulative score at the end of each period.
    pub period_scores: Vec<ScoreSnapshot>,
    pub events: Vec<GameEvent>,
    pub score_snapshots: Vec<ScoreSnapshot>,
    pub time_snapshots: Vec<TimeSnapshot>,
    pub box_score: BoxScore,
    pub winner: TeamId,
    /// Equal to `regulation_periods` unless overtime was played.
    pub final_period: u8,
    #[serde(default = "default_regulation_periods")]
    pub regulation_periods: u8,
    pub seed: u64,
}

fn default_regulation_periods() -> u8 {
    4
}

impl GameResult {
    pub fn winner_side(&self) -> Side {
        if self.home_score > self.away_score {
            Side::Home
        } else {
            Side::Away
        }
    }

    pub fn loser(&self) -> &TeamId {
        match self.winner_side() {
            Side::Home => &self.away,
            Side::Away => &self.home,
        }
    }

    pub fn team(&self, side: Side) -> &TeamId {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    pub fn margin(&self) -> u32 {
        self.home_score.abs_diff(self.away_score)
    }

    pub fn overtime_periods(&self) -> u8 {
        self.final_period.saturating_sub(self.regulation_periods)
    }

    /// Score and clock after event `k`, for replaying a prefix of the game.
    pub fn state_at(&self, k: usize) -> Option<(ScoreSnapshot, TimeSnapshot)> {
        Some((*self.score_snapshots.get(k)?, *self.time_snapshots.get(k)?))
    }
}
