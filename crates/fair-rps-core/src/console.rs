//! Line-oriented console session for one round.
//!
//! Generic over the reader and writer so the binary can hand in stdin/stdout
//! and tests can hand in byte buffers.

use crate::crypto::MoveSource;
use crate::error::GameError;
use crate::games::{MoveIndex, Rules};
use crate::protocol::{Round, RoundReport, Step};
use std::fmt;
use std::io::{BufRead, Write};
use tracing::warn;

pub const PROMPT: &str = "Enter your move: ";
const CORNER: &str = " v You / Computer > ";

/// How the session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Resolved(Box<RoundReport>),
    /// The human chose Exit
    Exited,
    /// Input ended before a decision
    InputClosed,
}

/// Help matrix: one row and column per move, cells from the row move's side
pub struct RulesTable<'a> {
    rules: &'a Rules,
}

impl<'a> RulesTable<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Self { rules }
    }

    fn border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
        write!(f, "+")?;
        for w in widths {
            write!(f, "{}+", "-".repeat(w + 2))?;
        }
        writeln!(f)
    }

    fn row<'s>(
        f: &mut fmt::Formatter<'_>,
        widths: &[usize],
        cells: impl Iterator<Item = &'s str>,
    ) -> fmt::Result {
        write!(f, "|")?;
        for (cell, w) in cells.zip(widths) {
            write!(f, " {:<width$} |", cell, width = *w)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RulesTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.rules.names();
        let mut widths = vec![CORNER.len()];
        widths.extend(names.iter().map(|n| n.chars().count().max(4)));

        Self::border(f, &widths)?;
        Self::row(
            f,
            &widths,
            std::iter::once(CORNER).chain(names.iter().map(String::as_str)),
        )?;
        Self::border(f, &widths)?;
        for (r, name) in names.iter().enumerate() {
            let row = MoveIndex::from_offset(r);
            let cells = (0..names.len())
                .map(|c| self.rules.standing(row, MoveIndex::from_offset(c)).as_str());
            Self::row(f, &widths, std::iter::once(name.as_str()).chain(cells))?;
        }
        Self::border(f, &widths)
    }
}

/// Play one round over `input` / `output`.
///
/// The digest is written before any input is read. The computer's move and
/// the key are written only after a valid human move has been accepted.
/// Lines that are not valid UTF-8 count as invalid input.
pub fn play_round<S, R, W>(
    round: &mut Round<'_, S>,
    rules: &Rules,
    mut input: R,
    output: &mut W,
) -> Result<SessionEnd, GameError>
where
    S: MoveSource,
    R: BufRead,
    W: Write,
{
    let commitment = round.start()?;
    writeln!(output, "HMAC: {}", commitment.digest_hex())?;

    let menu = round.menu()?;
    write!(output, "{}", menu)?;
    writeln!(output, "{}", PROMPT)?;
    output.flush()?;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        match round.submit(&line)? {
            Step::Help => {
                write!(output, "{}", RulesTable::new(rules))?;
                writeln!(output, "{}", PROMPT)?;
            }
            Step::Invalid(_) => {
                write!(output, "{}", menu)?;
                writeln!(output, "{}", PROMPT)?;
            }
            Step::Exit => return Ok(SessionEnd::Exited),
            Step::Resolved(report) => {
                writeln!(output, "Your move: {}", report.human_name)?;
                writeln!(output, "Computer move: {}", report.opponent_name)?;
                writeln!(output, "{}", report.outcome.sentence())?;
                writeln!(output, "HMAC key: {}", report.opening.key.to_hex())?;
                output.flush()?;
                return Ok(SessionEnd::Resolved(report));
            }
        }
        output.flush()?;
    }

    warn!(round_id = %round.id(), "Input closed before a move was made");
    Ok(SessionEnd::InputClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CommitmentEngine, DigestAlgorithm, FixedMove};
    use crate::games::MoveSet;
    use crate::protocol::Outcome;
    use std::io::{self, Cursor};
    use std::sync::{Arc, Mutex};

    fn run(names: &[&str], opponent: usize, script: &str) -> (SessionEnd, String) {
        run_bytes(names, opponent, script.as_bytes())
    }

    fn run_bytes(names: &[&str], opponent: usize, script: &[u8]) -> (SessionEnd, String) {
        let moves = MoveSet::new(names.iter().copied()).unwrap();
        let rules = Rules::new(&moves);
        let engine = CommitmentEngine::with_source(DigestAlgorithm::default(), FixedMove(opponent));
        let mut round = Round::with_engine(&moves, engine);
        let mut out = Vec::new();
        let end = play_round(&mut round, &rules, Cursor::new(script), &mut out).unwrap();
        (end, String::from_utf8(out).unwrap())
    }

    /// Shared sink for captured log output
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_transcript_for_winning_move() {
        let (end, out) = run(&["rock", "paper", "scissors"], 1, "2\n");
        let report = match end {
            SessionEnd::Resolved(report) => report,
            other => panic!("unexpected end: {:?}", other),
        };
        assert_eq!(report.outcome, Outcome::Win);

        let expected_tail = format!(
            "Your move: paper\nComputer move: rock\nYou win!\nHMAC key: {}\n",
            report.opening.key.to_hex()
        );
        assert!(out.starts_with(&format!("HMAC: {}\n", report.commitment.digest_hex())));
        assert!(out.ends_with(&expected_tail));
    }

    #[test]
    fn test_nothing_disclosed_before_move() {
        let (end, out) = run(&["rock", "paper", "scissors"], 3, "?\nbogus\n1\n");
        let report = match end {
            SessionEnd::Resolved(report) => report,
            other => panic!("unexpected end: {:?}", other),
        };

        let (before, after) = out.split_at(out.find("Your move:").unwrap());
        let key_hex = report.opening.key.to_hex();
        assert!(!before.contains(&key_hex));
        assert!(!before.contains("Computer move"));
        assert!(after.contains(&key_hex));
        assert!(report.verify());
    }

    #[test]
    fn test_help_prints_matrix_without_consuming_turn() {
        let (end, out) = run(&["rock", "paper", "scissors"], 1, "?\n1\n");
        assert!(matches!(end, SessionEnd::Resolved(_)));
        assert!(out.contains(CORNER));
        assert!(out.contains("| paper "));
        assert!(out.contains("DRAW"));
        assert!(out.contains("It's a draw!"));
    }

    #[test]
    fn test_invalid_input_reprints_menu() {
        let (end, out) = run(&["rock", "paper", "scissors"], 1, "9\nlizard\n0\n");
        assert_eq!(end, SessionEnd::Exited);
        assert_eq!(out.matches("Available moves:").count(), 3);
        assert!(!out.contains("HMAC key"));
    }

    #[test]
    fn test_undecodable_line_reprompts() {
        let (end, out) = run_bytes(&["rock", "paper", "scissors"], 1, b"\xff\xfe\n2\n");
        let report = match end {
            SessionEnd::Resolved(report) => report,
            other => panic!("unexpected end: {:?}", other),
        };
        assert_eq!(report.human_name, "paper");
        assert_eq!(out.matches("Available moves:").count(), 2);
        assert!(out.contains("You win!"));
    }

    #[test]
    fn test_trace_logs_keep_round_secrets() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let moves = MoveSet::new(["rock", "paper", "scissors"]).unwrap();
        let rules = Rules::new(&moves);
        let engine = CommitmentEngine::with_source(DigestAlgorithm::default(), FixedMove(3));
        let mut round = Round::with_engine(&moves, engine);
        let mut out = Vec::new();
        let end = tracing::subscriber::with_default(subscriber, || {
            play_round(&mut round, &rules, Cursor::new("?\n1\n"), &mut out)
        })
        .unwrap();
        let report = match end {
            SessionEnd::Resolved(report) => report,
            other => panic!("unexpected end: {:?}", other),
        };

        let captured = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(captured.contains("Round started"));
        assert!(captured.contains("Round resolved"));
        assert!(!captured.contains(&report.opening.key.to_hex()));
        assert!(!captured.contains("scissors"));
    }

    #[test]
    fn test_input_closed_without_move() {
        let (end, out) = run(&["rock", "paper", "scissors"], 1, "");
        assert_eq!(end, SessionEnd::InputClosed);
        assert!(out.starts_with("HMAC: "));
        assert!(!out.contains("HMAC key"));
    }

    #[test]
    fn test_rules_table_rows() {
        let moves = MoveSet::new(["rock", "paper", "scissors"]).unwrap();
        let rules = Rules::new(&moves);
        let table = RulesTable::new(&rules).to_string();
        let lines: Vec<&str> = table.lines().collect();

        // border, header, border, three rows, border
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[3],
            format!("| {:<20} | DRAW | LOSE  | WIN      |", "rock")
        );
        assert_eq!(
            lines[4],
            format!("| {:<20} | WIN  | DRAW  | LOSE     |", "paper")
        );
    }
}
