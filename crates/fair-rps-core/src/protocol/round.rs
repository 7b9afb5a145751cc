//! Round controller: Idle -> Committed -> AwaitingHumanMove -> Resolved.

use super::types::{Outcome, RoundId, RoundPhase};
use crate::crypto::{Commitment, CommitmentEngine, DigestAlgorithm, MoveSource, Opening, RandomMoves};
use crate::error::GameError;
use crate::games::{CircularJudge, MoveIndex, MoveSet};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

pub const HELP_TOKEN: &str = "?";
pub const EXIT_TOKEN: &str = "0";

/// One line of human input, classified
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputToken {
    Help,
    Exit,
    Move(MoveIndex),
    Invalid(String),
}

impl InputToken {
    pub fn parse(line: &str, moves: &MoveSet) -> Self {
        let line = line.trim();
        if line == HELP_TOKEN {
            return InputToken::Help;
        }
        match line.parse::<usize>() {
            Ok(0) => InputToken::Exit,
            Ok(position) => moves
                .index(position)
                .map(InputToken::Move)
                .unwrap_or_else(|| InputToken::Invalid(line.to_string())),
            Err(_) => InputToken::Invalid(line.to_string()),
        }
    }
}

/// Numbered move menu shown while waiting for the human
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<(String, String)>,
}

impl Menu {
    pub fn new(moves: &MoveSet) -> Self {
        let mut entries: Vec<(String, String)> = moves
            .indices()
            .map(|i| (i.to_string(), moves.name(i).to_string()))
            .collect();
        entries.push((EXIT_TOKEN.to_string(), "Exit".to_string()));
        entries.push((HELP_TOKEN.to_string(), "Help".to_string()));
        Self { entries }
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available moves:")?;
        for (key, label) in &self.entries {
            writeln!(f, "{} - {}", key, label)?;
        }
        Ok(())
    }
}

/// Everything disclosed at the end of a round, surfaced together
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round_id: RoundId,
    pub human_move: MoveIndex,
    pub human_name: String,
    pub opponent_move: MoveIndex,
    pub opponent_name: String,
    pub outcome: Outcome,
    pub commitment: Commitment,
    pub opening: Opening,
}

impl RoundReport {
    /// Re-run the audit a skeptical human would do
    pub fn verify(&self) -> bool {
        self.commitment.verify(&self.opening.key, self.opening.move_index)
            && self.opening.move_index == self.opponent_move
    }
}

/// Result of feeding one line to the round
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Show the rules matrix; the turn is not consumed
    Help,
    /// Leave without resolving the round
    Exit,
    /// Unrecognized input; show the menu again
    Invalid(String),
    /// The round is over
    Resolved(Box<RoundReport>),
}

/// A single round against the computer
pub struct Round<'g, S = RandomMoves> {
    id: RoundId,
    moves: &'g MoveSet,
    judge: CircularJudge,
    engine: CommitmentEngine<S>,
    phase: RoundPhase,
}

impl<'g> Round<'g, RandomMoves> {
    pub fn new(moves: &'g MoveSet, algorithm: DigestAlgorithm) -> Self {
        Self::with_engine(moves, CommitmentEngine::new(algorithm))
    }
}

impl<'g, S: MoveSource> Round<'g, S> {
    pub fn with_engine(moves: &'g MoveSet, engine: CommitmentEngine<S>) -> Self {
        Self {
            id: RoundId::new(),
            moves,
            judge: CircularJudge::new(moves.len()),
            engine,
            phase: RoundPhase::Idle,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    fn require(&self, expected: RoundPhase, action: &'static str) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::OrderingViolation {
                phase: self.phase,
                action,
            })
        }
    }

    /// Idle -> Committed. Returns the commitment to show the human.
    pub fn start(&mut self) -> Result<Commitment, GameError> {
        self.require(RoundPhase::Idle, "start a round")?;
        let commitment = self.engine.commit(self.moves.len())?;
        self.phase = RoundPhase::Committed;
        info!(round_id = %self.id, digest = %commitment, "Round started");
        Ok(commitment)
    }

    /// Committed -> AwaitingHumanMove. May be called again to reprint.
    pub fn menu(&mut self) -> Result<Menu, GameError> {
        match self.phase {
            RoundPhase::Committed => {
                self.phase = RoundPhase::AwaitingHumanMove;
                debug!(round_id = %self.id, "Awaiting human move");
            }
            RoundPhase::AwaitingHumanMove => {}
            phase => {
                return Err(GameError::OrderingViolation {
                    phase,
                    action: "present the menu",
                })
            }
        }
        Ok(Menu::new(self.moves))
    }

    /// Handle one line of human input
    pub fn submit(&mut self, line: &str) -> Result<Step, GameError> {
        self.require(RoundPhase::AwaitingHumanMove, "submit a move")?;

        match InputToken::parse(line, self.moves) {
            InputToken::Help => Ok(Step::Help),
            InputToken::Exit => {
                info!(round_id = %self.id, "Human left before moving");
                Ok(Step::Exit)
            }
            InputToken::Invalid(raw) => {
                debug!(round_id = %self.id, input = %raw, "Ignoring unrecognized input");
                Ok(Step::Invalid(raw))
            }
            InputToken::Move(human) => self.resolve(human).map(|r| Step::Resolved(Box::new(r))),
        }
    }

    /// Judge the human move against the sealed one, then open the commitment
    fn resolve(&mut self, human: MoveIndex) -> Result<RoundReport, GameError> {
        let commitment = self.engine.commitment().ok_or(GameError::NoCommitmentYet)?;
        let (outcome, opening) = self.engine.settle(human, &self.judge)?;
        self.phase = RoundPhase::Resolved;
        info!(round_id = %self.id, ?outcome, "Round resolved");

        Ok(RoundReport {
            round_id: self.id,
            human_move: human,
            human_name: self.moves.name(human).to_string(),
            opponent_move: opening.move_index,
            opponent_name: self.moves.name(opening.move_index).to_string(),
            outcome,
            commitment,
            opening,
        })
    }
}

impl<S: MoveSource> fmt::Debug for Round<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round")
            .field("id", &self.id)
            .field("moves", &self.moves.len())
            .field("phase", &self.phase)
            .field("engine", &self.engine)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::FixedMove;
    use crate::games::Rules;

    fn classic() -> MoveSet {
        MoveSet::new(["rock", "paper", "scissors"]).unwrap()
    }

    fn five() -> MoveSet {
        MoveSet::new(["rock", "paper", "scissors", "lizard", "Spock"]).unwrap()
    }

    fn play(moves: &MoveSet, opponent: usize, line: &str) -> RoundReport {
        let engine = CommitmentEngine::with_source(DigestAlgorithm::default(), FixedMove(opponent));
        let mut round = Round::with_engine(moves, engine);
        round.start().unwrap();
        round.menu().unwrap();
        match round.submit(line).unwrap() {
            Step::Resolved(report) => *report,
            other => panic!("expected resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_paper_beats_rock() {
        let report = play(&classic(), 1, "2");
        assert_eq!(report.human_name, "paper");
        assert_eq!(report.opponent_name, "rock");
        assert_eq!(report.outcome, Outcome::Win);
        assert!(report.verify());
    }

    #[test]
    fn test_lizard_loses_to_rock() {
        let report = play(&five(), 1, "4");
        assert_eq!(report.human_name, "lizard");
        assert_eq!(report.outcome, Outcome::Lose);
    }

    #[test]
    fn test_same_move_draws() {
        for moves in [classic(), five()] {
            for i in 1..=moves.len() {
                assert_eq!(play(&moves, i, &i.to_string()).outcome, Outcome::Draw);
            }
        }
    }

    #[test]
    fn test_outcome_agrees_with_rules() {
        let moves = five();
        let rules = Rules::new(&moves);
        for opponent in 1..=5 {
            for human in 1..=5 {
                let report = play(&moves, opponent, &human.to_string());
                assert_eq!(
                    Some(report.outcome),
                    rules.standing_by_name(&report.human_name, &report.opponent_name)
                );
            }
        }
    }

    #[test]
    fn test_help_and_invalid_keep_waiting() {
        let moves = classic();
        let mut round = Round::new(&moves, DigestAlgorithm::HmacSha256);
        round.start().unwrap();
        round.menu().unwrap();

        assert_eq!(round.submit("?").unwrap(), Step::Help);
        assert_eq!(
            round.submit("rock").unwrap(),
            Step::Invalid("rock".to_string())
        );
        assert_eq!(round.submit("4").unwrap(), Step::Invalid("4".to_string()));
        assert_eq!(round.submit("-1").unwrap(), Step::Invalid("-1".to_string()));
        assert_eq!(round.phase(), RoundPhase::AwaitingHumanMove);

        assert!(matches!(round.submit(" 3 \n").unwrap(), Step::Resolved(_)));
        assert_eq!(round.phase(), RoundPhase::Resolved);
    }

    #[test]
    fn test_exit_leaves_round_unresolved() {
        let moves = classic();
        let mut round = Round::new(&moves, DigestAlgorithm::default());
        round.start().unwrap();
        round.menu().unwrap();
        assert_eq!(round.submit("0").unwrap(), Step::Exit);
        assert_eq!(round.phase(), RoundPhase::AwaitingHumanMove);
    }

    #[test]
    fn test_submit_before_commit_is_ordering_violation() {
        let moves = classic();
        let mut round = Round::new(&moves, DigestAlgorithm::default());
        let err = round.submit("1").unwrap_err();
        assert!(err.is_defect());
        assert!(matches!(
            err,
            GameError::OrderingViolation {
                phase: RoundPhase::Idle,
                ..
            }
        ));
    }

    #[test]
    fn test_submit_before_menu_is_ordering_violation() {
        let moves = classic();
        let mut round = Round::new(&moves, DigestAlgorithm::default());
        round.start().unwrap();
        assert!(matches!(
            round.submit("1"),
            Err(GameError::OrderingViolation {
                phase: RoundPhase::Committed,
                ..
            })
        ));
    }

    #[test]
    fn test_resolved_round_is_terminal() {
        let moves = classic();
        let mut round = Round::new(&moves, DigestAlgorithm::default());
        round.start().unwrap();
        round.menu().unwrap();
        round.submit("1").unwrap();

        assert!(round.start().is_err());
        assert!(round.menu().is_err());
        assert!(round.submit("2").is_err());
    }

    #[test]
    fn test_input_token_parse() {
        let moves = classic();
        assert_eq!(InputToken::parse("?", &moves), InputToken::Help);
        assert_eq!(InputToken::parse("0", &moves), InputToken::Exit);
        assert_eq!(
            InputToken::parse("2", &moves),
            InputToken::Move(MoveIndex::new(2, 3).unwrap())
        );
        assert_eq!(
            InputToken::parse("", &moves),
            InputToken::Invalid(String::new())
        );
        assert_eq!(
            InputToken::parse("2.5", &moves),
            InputToken::Invalid("2.5".to_string())
        );
    }

    #[test]
    fn test_menu_rendering() {
        let menu = Menu::new(&classic());
        assert_eq!(
            menu.to_string(),
            "Available moves:\n1 - rock\n2 - paper\n3 - scissors\n0 - Exit\n? - Help\n"
        );
    }

    #[test]
    fn test_out_of_range_opponent_keeps_round_idle() {
        let moves = classic();
        let engine = CommitmentEngine::with_source(DigestAlgorithm::default(), FixedMove(4));
        let mut round = Round::with_engine(&moves, engine);
        assert!(matches!(
            round.start(),
            Err(GameError::MoveOutOfRange { position: 4, count: 3 })
        ));
        assert_eq!(round.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_debug_does_not_leak_opponent_move() {
        let moves = classic();
        let engine = CommitmentEngine::with_source(DigestAlgorithm::default(), FixedMove(2));
        let mut round = Round::with_engine(&moves, engine);
        round.start().unwrap();
        let rendered = format!("{:?}", round);
        assert!(!rendered.contains("paper"));
        assert!(!rendered.contains("move_index"));
    }
}
