//! Cryptographic primitives for the fair-play protocol.
//!
//! This module provides:
//! - DigestAlgorithm, SecretKey and Commitment for the HMAC commit-reveal scheme
//! - CommitmentEngine, which owns the opponent's move until it is revealed

mod commitment;
mod engine;

pub use commitment::{verify_digest, Commitment, DigestAlgorithm, SecretKey};
pub use engine::{CommitmentEngine, FixedMove, MoveSource, Opening, RandomMoves};
