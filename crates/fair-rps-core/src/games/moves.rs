//! Validated move configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 1-based position of a move in the configured list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveIndex(usize);

impl MoveIndex {
    /// Create from a 1-based position, if it is in `1..=count`
    pub fn new(position: usize, count: usize) -> Option<Self> {
        (1..=count).contains(&position).then_some(Self(position))
    }

    /// Create from a 0-based offset
    pub fn from_offset(offset: usize) -> Self {
        Self(offset + 1)
    }

    /// 1-based position
    pub fn get(&self) -> usize {
        self.0
    }

    /// 0-based offset into the move list
    pub fn offset(&self) -> usize {
        self.0 - 1
    }

    /// Canonical message bytes for commitment: the decimal 1-based index
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }
}

impl fmt::Display for MoveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered list of unique move names, odd length, at least three
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveSet {
    names: Vec<String>,
}

impl MoveSet {
    pub const MIN_MOVES: usize = 3;

    /// Validate a configuration. Rules are checked in order and the first
    /// violation is reported.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let count = names.len();

        if count < Self::MIN_MOVES {
            return Err(ConfigError::TooFewMoves { count });
        }
        if count % 2 == 0 {
            return Err(ConfigError::EvenMoveCount { count });
        }

        let mut seen = HashSet::with_capacity(count);
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateMove { name: name.clone() });
            }
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a validated set
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name at a 1-based index
    pub fn name(&self, index: MoveIndex) -> &str {
        &self.names[index.offset()]
    }

    /// Parse a 1-based menu number
    pub fn index(&self, position: usize) -> Option<MoveIndex> {
        MoveIndex::new(position, self.len())
    }

    pub fn indices(&self) -> impl Iterator<Item = MoveIndex> + '_ {
        (0..self.names.len()).map(MoveIndex::from_offset)
    }
}
