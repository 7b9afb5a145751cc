//! Fair RPS Core Library
//!
//! Rock-paper-scissors generalized to any odd number of moves, where the
//! computer commits to its move with an HMAC before the human picks and
//! reveals the key afterwards so the round can be audited.

pub mod console;
pub mod crypto;
pub mod error;
pub mod games;
pub mod protocol;

pub use console::{play_round, RulesTable, SessionEnd};
pub use crypto::{verify_digest, Commitment, CommitmentEngine, DigestAlgorithm, Opening, SecretKey};
pub use error::{ConfigError, GameError};
pub use games::{CircularJudge, GameJudge, MoveIndex, MoveSet, Rules};
pub use protocol::{Outcome, Round, RoundId, RoundPhase, RoundReport, Step};
