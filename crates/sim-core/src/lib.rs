#![deny(warnings)]

//! Core domain model for the basketball league simulator.
//!
//! This crate defines the serializable types shared by every simulation
//! layer (players, teams, schedules, game results), the deterministic RNG,
//! the tunable engine constants and the validation run before a simulation
//! starts.

pub mod config;
pub mod fixtures;
pub mod league;
pub mod player;
pub mod result;
pub mod rng;
pub mod team;
pub mod validate;

pub use config::{EngineConfig, SeasonConfig};
pub use league::{pair_mut, League, ScheduleEntry};
pub use player::{
    DunkerType, DurabilityTier, Player, PlayerGameState, Position, Ratings, RotationRole,
    RotationSlot, ShotZone, StatLine,
};
pub use result::{
    BoxScore, EventKind, FoulKind, GameEvent, GameResult, PlayerLine, PlayerRef, ScoreSnapshot,
    ShotKind, Side, SubReason, TeamBox, TimeSnapshot, TurnoverKind,
};
pub use rng::{derive_seed, SimRng};
pub use team::{Conference, Team, TeamGameState, TeamId};
pub use validate::{validate_league, validate_schedule, validate_team, ValidationError};
