#![deny(warnings)]

//! Possession-level game engine.
//!
//! [`simulate_game`] drives a game from the opening tip to full time: the
//! period clock, the possession arrow, overtime, fatigue and the rotation
//! checks. Each play is handed to the [`PossessionResolver`], which draws
//! fouls, turnovers, shots and rebounds from the game's single RNG stream
//! and records every outcome in the event log together with the score and
//! clock at that moment.

pub mod error;
pub mod fatigue;
pub mod foul;
pub mod game;
pub mod possession;
pub mod rebound;
pub mod shot;
pub mod state;

pub use error::SimError;
pub use game::{simulate_game, simulate_game_seeded};
pub use possession::{NextPlay, PlayKind, PossessionResolver};
pub use state::{GameContext, GameLog};
