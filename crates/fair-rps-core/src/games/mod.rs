//! Move configuration and game rules.

mod moves;
mod rules;
mod traits;

pub use moves::{MoveIndex, MoveSet};
pub use rules::Rules;
pub use traits::{CircularJudge, GameJudge};
