//! Player actors.
//!
//! Every player owns a thread that serves freezes and waits for the dealer's
//! verdict. Automated players get a second thread that generates key presses.

mod automated;
mod player;
mod signal;

pub use automated::AutomatedPlayer;
pub use player::{ActorPhase, Outcome, Player};
pub use signal::Signal;
