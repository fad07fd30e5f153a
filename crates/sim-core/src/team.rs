//! Teams own their roster and the per-game lineup/score state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::player::{Player, RotationRole};

/// Team identifier, usually a short name such as "Celtics" or "BOS".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        TeamId(s.to_string())
    }
}

impl From<String> for TeamId {
    fn from(s: String) -> Self {
        TeamId(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub const ALL: [Conference; 2] = [Conference::East, Conference::West];
}

/// Score and foul bookkeeping reset at tip-off.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamGameState {
    pub score: u32,
    /// Team fouls in the current period, drives the bonus.
    pub period_fouls: u32,
    /// Points scored in each period played so far.
    pub period_points: Vec<u32>,
    pub challenge_available: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub conference: Conference,
    pub roster: Vec<Player>,
    /// Roster indices of the five starters.
    pub starters: Vec<usize>,
    /// Roster indices of the five on court; lineup slot `i` guards the opponent's slot `i`.
    #[serde(default)]
    pub on_court: Vec<usize>,
    #[serde(default)]
    pub game: TeamGameState,
}

impl Team {
    /// Builds a team; starters are the players flagged [`RotationRole::Starter`],
    /// topped up by overall rating when fewer than five are flagged.
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        conference: Conference,
        roster: Vec<Player>,
    ) -> Self {
        let starters = default_starters(&roster);
        Self {
            id,
            name: name.into(),
            conference,
            roster,
            starters,
            on_court: Vec::new(),
            game: TeamGameState::default(),
        }
    }

    /// Clears game counters and sends the starters out for the tip.
    pub fn reset_for_game(&mut self) {
        for p in &mut self.roster {
            p.reset_for_game();
        }
        self.game = TeamGameState {
            challenge_available: true,
            ..TeamGameState::default()
        };
        self.on_court.clear();
        for &i in &self.starters {
            if let Some(p) = self.roster.get_mut(i) {
                p.state.starter = true;
                p.enter_court(0);
                self.on_court.push(i);
            }
        }
    }

    /// Opens a new period: team fouls reset, a fresh period score slot.
    pub fn start_period(&mut self) {
        self.game.period_fouls = 0;
        self.game.period_points.push(0);
    }

    /// Credits `points` to roster player `idx` and the team score.
    pub fn add_points(&mut self, idx: usize, points: u32) {
        if let Some(p) = self.roster.get_mut(idx) {
            p.state.line.points += points;
        }
        self.game.score += points;
        if let Some(last) = self.game.period_points.last_mut() {
            *last += points;
        }
    }

    pub fn is_on_court(&self, idx: usize) -> bool {
        self.on_court.contains(&idx)
    }

    /// Roster indices not on court, regardless of availability.
    pub fn bench(&self) -> Vec<usize> {
        (0..self.roster.len())
            .filter(|i| !self.on_court.contains(i))
            .collect()
    }

    /// Bench players who may check in.
    pub fn available_bench(&self) -> Vec<usize> {
        self.bench()
            .into_iter()
            .filter(|&i| self.roster[i].is_available())
            .collect()
    }

    /// Replaces `out` with `into` in the same lineup slot. Returns false and
    /// leaves the lineup untouched if the swap is not legal.
    pub fn swap_players(&mut self, out: usize, into: usize, now: u32) -> bool {
        let Some(slot) = self.on_court.iter().position(|&i| i == out) else {
            return false;
        };
        if self.on_court.contains(&into) {
            return false;
        }
        match self.roster.get(into) {
            Some(p) if p.is_available() => {}
            _ => return false,
        }
        self.roster[out].leave_court(now);
        self.roster[into].enter_court(now);
        self.on_court[slot] = into;
        true
    }

    /// Mean of a rating over the players currently on court.
    pub fn lineup_average(&self, rating: impl Fn(&Player) -> u8) -> f64 {
        if self.on_court.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .on_court
            .iter()
            .map(|&i| f64::from(rating(&self.roster[i])))
            .sum();
        sum / self.on_court.len() as f64
    }

    /// Post-game cleanup: everyone off the floor, fatigue decayed to `retain` of its value.
    pub fn finish_game(&mut self, now: u32, fatigue_retain: f64) {
        for &i in &self.on_court {
            self.roster[i].leave_court(now);
        }
        self.on_court.clear();
        for p in &mut self.roster {
            p.state.on_court = false;
            p.state.stint_start = None;
            p.state.fatigue = (p.state.fatigue * fatigue_retain).clamp(0.0, 100.0);
        }
    }

    pub fn player_index(&self, name: &str) -> Option<usize> {
        self.roster.iter().position(|p| p.name == name)
    }
}

fn default_starters(roster: &[Player]) -> Vec<usize> {
    let mut starters: Vec<usize> = roster
        .iter()
        .enumerate()
        .filter(|(_, p)| p.role == RotationRole::Starter)
        .map(|(i, _)| i)
        .take(5)
        .collect();
    if starters.len() < 5 {
        let mut rest: Vec<usize> = (0..roster.len()).filter(|i| !starters.contains(i)).collect();
        rest.sort_by(|&a, &b| {
            roster[b]
                .ratings
                .overall
                .cmp(&roster[a].ratings.overall)
                .then(a.cmp(&b))
        });
        starters.extend(rest.into_iter().take(5 - starters.len()));
    }
    starters
}
