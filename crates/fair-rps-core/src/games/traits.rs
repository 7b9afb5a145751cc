//! Game traits.

use super::MoveIndex;
use crate::protocol::Outcome;

/// Decides a pairing of two moves, from the first move's perspective
pub trait GameJudge {
    /// Outcome for `mine` played against `theirs`
    fn judge(&self, mine: MoveIndex, theirs: MoveIndex) -> Outcome;
}

/// Pure arithmetic judge over the circular distance of two positions.
///
/// diff = (N + mine - theirs) mod N: zero is a draw, 1..=(N-1)/2 a win,
/// anything larger a loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircularJudge {
    count: usize,
}

impl CircularJudge {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl GameJudge for CircularJudge {
    fn judge(&self, mine: MoveIndex, theirs: MoveIndex) -> Outcome {
        let n = self.count;
        let diff = (n + mine.get() - theirs.get()) % n;
        if diff == 0 {
            Outcome::Draw
        } else if diff <= n / 2 {
            Outcome::Win
        } else {
            Outcome::Lose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge(n: usize, mine: usize, theirs: usize) -> Outcome {
        CircularJudge::new(n).judge(
            MoveIndex::new(mine, n).unwrap(),
            MoveIndex::new(theirs, n).unwrap(),
        )
    }

    #[test]
    fn test_paper_beats_rock() {
        // diff = (3 + 2 - 1) % 3 = 1
        assert_eq!(judge(3, 2, 1), Outcome::Win);
    }

    #[test]
    fn test_lizard_loses_to_rock() {
        // diff = (5 + 4 - 1) % 5 = 3, half = 2
        assert_eq!(judge(5, 4, 1), Outcome::Lose);
    }

    #[test]
    fn test_same_move_draws() {
        for n in [3, 5, 7, 9] {
            for i in 1..=n {
                assert_eq!(judge(n, i, i), Outcome::Draw);
            }
        }
    }

    #[test]
    fn test_outcome_counts_are_balanced() {
        for n in [3usize, 5, 7, 9] {
            for mine in 1..=n {
                let wins = (1..=n).filter(|&t| judge(n, mine, t) == Outcome::Win).count();
                let losses = (1..=n).filter(|&t| judge(n, mine, t) == Outcome::Lose).count();
                assert_eq!(wins, n / 2);
                assert_eq!(losses, n / 2);
            }
        }
    }
}
