use sim_ai::SubstitutionError;
use sim_core::ValidationError;
use thiserror::Error;

/// Fatal problems inside a game. None of these are retried: the run that
/// produced one is abandoned.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("team {team} cannot field five players: {reason}")]
    ShortHanded { team: String, reason: String },
    #[error("clock underflow in period {period}: {seconds_remaining}s left, play took {span}s")]
    ClockUnderflow {
        period: u8,
        seconds_remaining: u32,
        span: u32,
    },
    #[error("team {team} has an invalid lineup: {reason}")]
    InvalidLineup { team: String, reason: String },
}

impl From<SubstitutionError> for SimError {
    fn from(err: SubstitutionError) -> Self {
        match err {
            SubstitutionError::NoReplacement { team, player } => SimError::ShortHanded {
                team,
                reason: format!("no replacement for {player}"),
            },
            SubstitutionError::NotOnCourt { team, index } => SimError::InvalidLineup {
                team,
                reason: format!("roster index {index} is not on court"),
            },
        }
    }
}
