//! Fair commitment engine: pick, commit, reveal.
//!
//! The engine is the only holder of the chosen move and the HMAC key between
//! `commit` and `reveal`. It deliberately has no getter for either.

use super::commitment::{Commitment, DigestAlgorithm, SecretKey};
use crate::error::GameError;
use crate::games::{GameJudge, MoveIndex};
use crate::protocol::Outcome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Source of the opponent's move. Gameplay randomness only; the HMAC key
/// always comes from the OS entropy source.
pub trait MoveSource {
    /// Pick a move among `count` moves
    fn pick(&mut self, count: usize) -> Result<MoveIndex, GameError>;
}

/// Uniform pick from the thread-local generator
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomMoves;

impl MoveSource for RandomMoves {
    fn pick(&mut self, count: usize) -> Result<MoveIndex, GameError> {
        if count == 0 {
            return Err(GameError::MoveOutOfRange { position: 1, count });
        }
        Ok(MoveIndex::from_offset(rand::thread_rng().gen_range(0..count)))
    }
}

/// Always picks the same 1-based position. For scripted rounds and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedMove(pub usize);

impl MoveSource for FixedMove {
    fn pick(&mut self, count: usize) -> Result<MoveIndex, GameError> {
        MoveIndex::new(self.0, count).ok_or(GameError::MoveOutOfRange {
            position: self.0,
            count,
        })
    }
}

/// Opened commitment: the key and the move it was committed to
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub key: SecretKey,
    pub move_index: MoveIndex,
}

impl fmt::Debug for Opening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opening")
            .field("key", &self.key.to_hex())
            .field("move_index", &self.move_index)
            .finish()
    }
}

/// Engine-private state after commit
struct Sealed {
    key: SecretKey,
    move_index: MoveIndex,
    commitment: Commitment,
    revealed: bool,
}

/// One engine per round
pub struct CommitmentEngine<S = RandomMoves> {
    algorithm: DigestAlgorithm,
    source: S,
    sealed: Option<Sealed>,
}

impl CommitmentEngine<RandomMoves> {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self::with_source(algorithm, RandomMoves)
    }
}

impl<S: MoveSource> CommitmentEngine<S> {
    pub fn with_source(algorithm: DigestAlgorithm, source: S) -> Self {
        Self {
            algorithm,
            source,
            sealed: None,
        }
    }

    /// Pick the opponent's move among `count` and commit to it.
    ///
    /// Only the public commitment leaves the engine. A second call fails
    /// rather than re-rolling the move.
    pub fn commit(&mut self, count: usize) -> Result<Commitment, GameError> {
        if self.sealed.is_some() {
            return Err(GameError::AlreadyCommitted);
        }

        let move_index = self.source.pick(count)?;
        let key = SecretKey::generate()?;
        let commitment = Commitment::new(self.algorithm, &key, move_index)?;
        debug!(algorithm = %self.algorithm, moves = count, "Committed to opponent move");

        self.sealed = Some(Sealed {
            key,
            move_index,
            commitment,
            revealed: false,
        });
        Ok(commitment)
    }

    /// Public commitment, if one was made
    pub fn commitment(&self) -> Option<Commitment> {
        self.sealed.as_ref().map(|s| s.commitment)
    }

    pub fn is_revealed(&self) -> bool {
        self.sealed.as_ref().is_some_and(|s| s.revealed)
    }

    /// Open the commitment. Repeated calls return the same opening.
    pub fn reveal(&mut self) -> Result<Opening, GameError> {
        let sealed = self.sealed.as_mut().ok_or(GameError::NoCommitmentYet)?;
        if !sealed.revealed {
            sealed.revealed = true;
            debug!("Revealed commitment key");
        }
        Ok(Opening {
            key: sealed.key.clone(),
            move_index: sealed.move_index,
        })
    }

    /// Judge `human` against the sealed move, then open the commitment.
    ///
    /// The outcome is fixed before the key leaves the engine.
    pub fn settle<J: GameJudge>(
        &mut self,
        human: MoveIndex,
        judge: &J,
    ) -> Result<(Outcome, Opening), GameError> {
        let sealed = self.sealed.as_ref().ok_or(GameError::NoCommitmentYet)?;
        let outcome = judge.judge(human, sealed.move_index);
        let opening = self.reveal()?;
        Ok((outcome, opening))
    }

    /// Check an opening against a published commitment
    pub fn verify(commitment: &Commitment, key: &SecretKey, claimed: MoveIndex) -> bool {
        commitment.verify(key, claimed)
    }
}

impl<S: MoveSource> fmt::Debug for CommitmentEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitmentEngine")
            .field("algorithm", &self.algorithm)
            .field("commitment", &self.sealed.as_ref().map(|s| s.commitment))
            .field("revealed", &self.is_revealed())
            .finish_non_exhaustive()
    }
}
