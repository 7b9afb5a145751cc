//! Fair RPS console game
//!
//! Plays one round of N-move rock-paper-scissors against the computer. The
//! computer's move is committed with an HMAC before the human picks, and the
//! key is printed afterwards. `fair-rps verify` audits a finished round.

use clap::{Args, Parser, Subcommand};
use fair_rps_core::{
    play_round, verify_digest, DigestAlgorithm, GameError, MoveSet, Round, Rules, SecretKey,
    SessionEnd,
};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    name = "fair-rps",
    version,
    about,
    args_conflicts_with_subcommands = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    play: PlayArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a revealed key against the digest shown at the start of a round
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Move names in circle order; an odd number, at least three, all distinct
    #[arg(value_name = "MOVE")]
    moves: Vec<String>,

    /// Keyed hash used for the commitment
    #[arg(
        long,
        env = "FAIR_RPS_ALGORITHM",
        default_value = "hmac-sha3-256",
        value_parser = parse_algorithm
    )]
    algorithm: DigestAlgorithm,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Digest printed as `HMAC:` at the start of the round
    #[arg(long)]
    digest: String,

    /// Key printed as `HMAC key:` at the end of the round
    #[arg(long)]
    key: String,

    /// 1-based number of the computer's move
    #[arg(long = "move", value_name = "INDEX")]
    move_index: usize,

    #[arg(
        long,
        env = "FAIR_RPS_ALGORITHM",
        default_value = "hmac-sha3-256",
        value_parser = parse_algorithm
    )]
    algorithm: DigestAlgorithm,
}

fn parse_algorithm(s: &str) -> Result<DigestAlgorithm, String> {
    s.parse().map_err(|e: GameError| e.to_string())
}

fn play(args: PlayArgs) -> ExitCode {
    let moves = match MoveSet::new(args.moves) {
        Ok(moves) => moves,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let rules = Rules::new(&moves);
    let mut round = Round::new(&moves, args.algorithm);
    info!(round_id = %round.id(), moves = moves.len(), algorithm = %args.algorithm, "Starting round");

    let stdin = io::stdin();
    let stdout = io::stdout();
    match play_round(&mut round, &rules, stdin.lock(), &mut stdout.lock()) {
        Ok(SessionEnd::Resolved(report)) => {
            info!(round_id = %report.round_id, outcome = ?report.outcome, "Round finished");
            ExitCode::SUCCESS
        }
        Ok(SessionEnd::Exited) | Ok(SessionEnd::InputClosed) => ExitCode::SUCCESS,
        Err(e) => {
            error!(round_id = %round.id(), defect = e.is_defect(), "Round aborted: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn verify(args: VerifyArgs) -> Result<bool, GameError> {
    let key = SecretKey::from_hex(&args.key)?;
    let digest = hex::decode(args.digest.trim())?;
    Ok(verify_digest(&digest, args.algorithm, key.as_bytes(), args.move_index))
}

fn main() -> ExitCode {
    // Logs go to stderr so the game transcript on stdout stays clean
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Verify(args)) => match verify(args) {
            Ok(true) => {
                println!("Verified");
                ExitCode::SUCCESS
            }
            Ok(false) => {
                println!("Mismatch");
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        None => play(cli.play),
    }
}
