//! Error types for the game core.

use crate::protocol::RoundPhase;
use thiserror::Error;

/// Rejected move configuration. Checked before any round starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Not enough parameters!\nPlease pass at least 3 parameters.\nExample: fair-rps rock paper scissors")]
    TooFewMoves { count: usize },

    #[error("Invalid properties!\nTotal amount should be odd!\nExample: fair-rps rock paper scissors lizard Spock")]
    EvenMoveCount { count: usize },

    #[error("Invalid properties!\nParameters must be unique (`{name}` appears more than once)")]
    DuplicateMove { name: String },
}

/// Errors from the commitment engine and round controller
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No commitment has been made yet")]
    NoCommitmentYet,

    #[error("A commitment already exists for this round")]
    AlreadyCommitted,

    #[error("Move {position} is outside 1..={count}")]
    MoveOutOfRange { position: usize, count: usize },

    #[error("Cannot {action} while the round is {phase}")]
    OrderingViolation {
        phase: RoundPhase,
        action: &'static str,
    },

    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Secret key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Contract violations indicate a bug in the caller, never user input
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            GameError::NoCommitmentYet
                | GameError::AlreadyCommitted
                | GameError::OrderingViolation { .. }
        )
    }
}
