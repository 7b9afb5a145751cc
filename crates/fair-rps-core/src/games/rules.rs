//! Win/lose/draw relation over an odd number of moves.
//!
//! Moves sit on a circle in configuration order. Each move is beaten by the
//! (N-1)/2 moves that follow it (wrapping around) and beats the (N-1)/2 moves
//! that precede it. For rock, paper, scissors this gives the classic cycle:
//! paper beats rock, scissors beats paper, rock beats scissors.

use super::traits::GameJudge;
use super::{MoveIndex, MoveSet};
use crate::protocol::Outcome;
use serde::Serialize;
use std::collections::HashMap;

/// Complete relation, built once per game and read-only afterwards
#[derive(Clone, Debug, Serialize)]
pub struct Rules {
    names: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
    /// 0-based offsets each move beats
    defeats: Vec<Vec<usize>>,
    /// Row-major N x N standings, row move against column move
    #[serde(skip)]
    table: Vec<Outcome>,
}

impl Rules {
    /// Build the relation for a validated move set
    pub fn new(moves: &MoveSet) -> Self {
        Self::from_names(moves.names())
    }

    /// Build from raw names. The caller guarantees an odd count >= 3 and
    /// unique names; anything else yields a meaningless relation.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let n = names.len();
        let half = n / 2;

        let names: Vec<String> = names.iter().map(|s| s.as_ref().to_string()).collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(p, name)| (name.clone(), p))
            .collect();

        let defeats: Vec<Vec<usize>> = (0..n)
            .map(|p| (half + 1..n).map(|step| (p + step) % n).collect())
            .collect();

        let mut table = vec![Outcome::Draw; n * n];
        for (row, beaten) in defeats.iter().enumerate() {
            for &col in beaten {
                table[row * n + col] = Outcome::Win;
                table[col * n + row] = Outcome::Lose;
            }
        }

        Self {
            names,
            positions,
            defeats,
            table,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names of the moves `name` beats, in circle order
    pub fn defeats(&self, name: &str) -> Option<Vec<&str>> {
        let p = *self.positions.get(name)?;
        Some(self.defeats[p].iter().map(|&q| self.names[q].as_str()).collect())
    }

    /// Does `a` beat `b`?
    pub fn beats(&self, a: MoveIndex, b: MoveIndex) -> bool {
        self.standing(a, b) == Outcome::Win
    }

    /// O(1) lookup: `row` played against `col`
    pub fn standing(&self, row: MoveIndex, col: MoveIndex) -> Outcome {
        self.table[row.offset() * self.names.len() + col.offset()]
    }

    /// Standing by move names, if both are configured
    pub fn standing_by_name(&self, row: &str, col: &str) -> Option<Outcome> {
        let r = *self.positions.get(row)?;
        let c = *self.positions.get(col)?;
        Some(self.table[r * self.names.len() + c])
    }
}

impl GameJudge for Rules {
    fn judge(&self, mine: MoveIndex, theirs: MoveIndex) -> Outcome {
        self.standing(mine, theirs)
    }
}
