//! Players: static ratings plus the mutable per-game state the engine drives.

use serde::{Deserialize, Serialize};

use crate::TeamId;

/// Court position as listed on a roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    /// Rotation slot used to pair outgoing and incoming players.
    pub fn slot(self) -> RotationSlot {
        match self {
            Position::PG | Position::SG => RotationSlot::Guard,
            Position::SF => RotationSlot::Wing,
            Position::PF | Position::C => RotationSlot::Big,
        }
    }

    /// Parses roster spellings such as `PG`, `G`, `F-C` or `Center`.
    /// Hyphenated positions use the first listed one.
    pub fn parse(raw: &str) -> Option<Self> {
        let first = raw.trim().split(['-', '/']).next()?.trim().to_ascii_uppercase();
        match first.as_str() {
            "PG" | "POINT GUARD" => Some(Position::PG),
            "SG" | "G" | "GUARD" | "SHOOTING GUARD" => Some(Position::SG),
            "SF" | "F" | "FORWARD" | "SMALL FORWARD" => Some(Position::SF),
            "PF" | "POWER FORWARD" => Some(Position::PF),
            "C" | "CENTER" | "CENTRE" => Some(Position::C),
            _ => None,
        }
    }
}

/// Coarse grouping of positions for like-for-like substitutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationSlot {
    Guard,
    Wing,
    Big,
}

/// Aptitude for finishing at the rim; drives the layup/dunk/jumper split near the basket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DunkerType {
    /// Throws it down whenever the lane opens.
    Frequent,
    Occasional,
    /// Almost never dunks.
    Rare,
}

impl DunkerType {
    /// Tier from the better of the standing and driving dunk ratings.
    pub fn from_dunk_ratings(standing: u8, driving: u8) -> Self {
        match standing.max(driving) {
            80..=u8::MAX => DunkerType::Frequent,
            55..=79 => DunkerType::Occasional,
            _ => DunkerType::Rare,
        }
    }
}

/// Durability tier; each tier maps to a minutes budget in the substitution config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurabilityTier {
    Iron,
    Sturdy,
    Average,
    Fragile,
}

impl DurabilityTier {
    pub fn from_rating(durability: u8) -> Self {
        match durability {
            90..=u8::MAX => DurabilityTier::Iron,
            80..=89 => DurabilityTier::Sturdy,
            65..=79 => DurabilityTier::Average,
            _ => DurabilityTier::Fragile,
        }
    }
}

/// Where a player sits in the coach's depth chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationRole {
    Starter,
    #[default]
    Rotation,
    Reserve,
}

/// Shot zone used for shot selection and box score splits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotZone {
    Close,
    Mid,
    Three,
}

impl ShotZone {
    pub fn points(self) -> u32 {
        match self {
            ShotZone::Three => 3,
            ShotZone::Close | ShotZone::Mid => 2,
        }
    }
}

/// Static ratings on a 0-100 scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub overall: u8,
    pub inside: u8,
    pub mid_range: u8,
    pub three_point: u8,
    pub free_throw: u8,
    pub interior_defense: u8,
    pub perimeter_defense: u8,
    pub offensive_rebound: u8,
    pub defensive_rebound: u8,
    pub assist: u8,
    pub steal: u8,
    pub block: u8,
    pub layup: u8,
    pub standing_dunk: u8,
    pub driving_dunk: u8,
    pub athleticism: u8,
    pub durability: u8,
    pub offensive_consistency: u8,
    pub defensive_consistency: u8,
    pub draw_foul: u8,
    pub foul_tendency: u8,
}

impl Default for Ratings {
    fn default() -> Self {
        Self {
            overall: 75,
            inside: 70,
            mid_range: 70,
            three_point: 70,
            free_throw: 75,
            interior_defense: 70,
            perimeter_defense: 70,
            offensive_rebound: 60,
            defensive_rebound: 65,
            assist: 65,
            steal: 65,
            block: 60,
            layup: 70,
            standing_dunk: 55,
            driving_dunk: 60,
            athleticism: 70,
            durability: 80,
            offensive_consistency: 70,
            defensive_consistency: 70,
            draw_foul: 60,
            foul_tendency: 50,
        }
    }
}

impl Ratings {
    /// Every rating with its field name, for validation reports.
    pub fn named(&self) -> [(&'static str, u8); 21] {
        [
            ("overall", self.overall),
            ("inside", self.inside),
            ("mid_range", self.mid_range),
            ("three_point", self.three_point),
            ("free_throw", self.free_throw),
            ("interior_defense", self.interior_defense),
            ("perimeter_defense", self.perimeter_defense),
            ("offensive_rebound", self.offensive_rebound),
            ("defensive_rebound", self.defensive_rebound),
            ("assist", self.assist),
            ("steal", self.steal),
            ("block", self.block),
            ("layup", self.layup),
            ("standing_dunk", self.standing_dunk),
            ("driving_dunk", self.driving_dunk),
            ("athleticism", self.athleticism),
            ("durability", self.durability),
            ("offensive_consistency", self.offensive_consistency),
            ("defensive_consistency", self.defensive_consistency),
            ("draw_foul", self.draw_foul),
            ("foul_tendency", self.foul_tendency),
        ]
    }

    pub fn zone_rating(&self, zone: ShotZone) -> u8 {
        match zone {
            ShotZone::Close => self.inside,
            ShotZone::Mid => self.mid_range,
            ShotZone::Three => self.three_point,
        }
    }

    /// Defensive rating that applies to shots from `zone`.
    pub fn zone_defense(&self, zone: ShotZone) -> u8 {
        match zone {
            ShotZone::Close => self.interior_defense,
            ShotZone::Mid | ShotZone::Three => self.perimeter_defense,
        }
    }

    pub fn defense(&self) -> f64 {
        (f64::from(self.interior_defense) + f64::from(self.perimeter_defense)) / 2.0
    }
}

/// Counting stats for one game or accumulated over many.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub points: u32,
    pub rebounds: u32,
    pub offensive_rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub close_made: u32,
    pub close_attempts: u32,
    pub mid_made: u32,
    pub mid_attempts: u32,
    pub three_made: u32,
    pub three_attempts: u32,
    pub ft_made: u32,
    pub ft_attempts: u32,
}

impl StatLine {
    pub fn field_goals_made(&self) -> u32 {
        self.close_made + self.mid_made + self.three_made
    }

    pub fn field_goals_attempted(&self) -> u32 {
        self.close_attempts + self.mid_attempts + self.three_attempts
    }

    /// Counts a field goal attempt. Points are credited separately.
    pub fn record_shot(&mut self, zone: ShotZone, made: bool) {
        let (m, a) = match zone {
            ShotZone::Close => (&mut self.close_made, &mut self.close_attempts),
            ShotZone::Mid => (&mut self.mid_made, &mut self.mid_attempts),
            ShotZone::Three => (&mut self.three_made, &mut self.three_attempts),
        };
        *a += 1;
        if made {
            *m += 1;
        }
    }

    pub fn record_free_throw(&mut self, made: bool) {
        self.ft_attempts += 1;
        if made {
            self.ft_made += 1;
        }
    }

    pub fn accumulate(&mut self, other: &StatLine) {
        self.points += other.points;
        self.rebounds += other.rebounds;
        self.offensive_rebounds += other.offensive_rebounds;
        self.assists += other.assists;
        self.steals += other.steals;
        self.blocks += other.blocks;
        self.turnovers += other.turnovers;
        self.fouls += other.fouls;
        self.close_made += other.close_made;
        self.close_attempts += other.close_attempts;
        self.mid_made += other.mid_made;
        self.mid_attempts += other.mid_attempts;
        self.three_made += other.three_made;
        self.three_attempts += other.three_attempts;
        self.ft_made += other.ft_made;
        self.ft_attempts += other.ft_attempts;
    }

    pub fn field_goal_pct(&self) -> Option<f64> {
        let att = self.field_goals_attempted();
        (att > 0).then(|| f64::from(self.field_goals_made()) / f64::from(att))
    }

    pub fn three_point_pct(&self) -> Option<f64> {
        (self.three_attempts > 0)
            .then(|| f64::from(self.three_made) / f64::from(self.three_attempts))
    }

    pub fn free_throw_pct(&self) -> Option<f64> {
        (self.ft_attempts > 0).then(|| f64::from(self.ft_made) / f64::from(self.ft_attempts))
    }

    /// True shooting percentage: points / (2 * (FGA + 0.44 * FTA)).
    pub fn true_shooting(&self) -> Option<f64> {
        let denom = 2.0
            * (f64::from(self.field_goals_attempted()) + 0.44 * f64::from(self.ft_attempts));
        (denom > 0.0).then(|| f64::from(self.points) / denom)
    }
}

/// Mutable state of a player inside one game. Times are elapsed game seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameState {
    pub line: StatLine,
    pub seconds_played: u32,
    pub stint_start: Option<u32>,
    pub benched_at: Option<u32>,
    /// 0 (fresh) to 100 (exhausted).
    pub fatigue: f64,
    pub on_court: bool,
    pub injured: bool,
    pub starter: bool,
    pub fouled_out: bool,
    pub plus_minus: i32,
}

/// A rostered player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Position,
    pub team: TeamId,
    pub ratings: Ratings,
    pub dunker: DunkerType,
    #[serde(default)]
    pub role: RotationRole,
    #[serde(default)]
    pub state: PlayerGameState,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Position, team: TeamId, ratings: Ratings) -> Self {
        let dunker = DunkerType::from_dunk_ratings(ratings.standing_dunk, ratings.driving_dunk);
        Self {
            name: name.into(),
            position,
            team,
            ratings,
            dunker,
            role: RotationRole::default(),
            state: PlayerGameState::default(),
        }
    }

    /// Clears per-game counters. Fatigue carries over from the last game.
    pub fn reset_for_game(&mut self) {
        let fatigue = self.state.fatigue;
        self.state = PlayerGameState {
            fatigue,
            ..PlayerGameState::default()
        };
    }

    pub fn is_available(&self) -> bool {
        !self.state.injured && !self.state.fouled_out
    }

    pub fn durability_tier(&self) -> DurabilityTier {
        DurabilityTier::from_rating(self.ratings.durability)
    }

    /// Seconds on court in the current stint, zero when benched.
    pub fn stint_seconds(&self, now: u32) -> u32 {
        match (self.state.on_court, self.state.stint_start) {
            (true, Some(start)) => now.saturating_sub(start),
            _ => 0,
        }
    }

    /// Seconds since last checked out; `None` if the player has not sat yet.
    pub fn rest_seconds(&self, now: u32) -> Option<u32> {
        if self.state.on_court {
            return Some(0);
        }
        self.state.benched_at.map(|at| now.saturating_sub(at))
    }

    pub fn enter_court(&mut self, now: u32) {
        self.state.on_court = true;
        self.state.stint_start = Some(now);
    }

    pub fn leave_court(&mut self, now: u32) {
        self.state.on_court = false;
        self.state.stint_start = None;
        self.state.benched_at = Some(now);
    }
}
