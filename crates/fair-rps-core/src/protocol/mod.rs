//! Round protocol types and controller.

mod round;
mod types;

pub use round::{InputToken, Menu, Round, RoundReport, Step, EXIT_TOKEN, HELP_TOKEN};
pub use types::{Outcome, RoundId, RoundPhase};
