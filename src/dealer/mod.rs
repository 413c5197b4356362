//! Game orchestration.
//!
//! [`Dealer::run`] drives the whole game on the calling thread and spawns one
//! thread per player plus one automation thread per automated player. A
//! [`DealerHandle`] stays usable from any thread for input, observation, and
//! termination.

mod countdown;
#[allow(clippy::module_inception)]
mod dealer;
mod winners;

pub use countdown::Countdown;
pub use dealer::{Dealer, DealerHandle, DealerPhase, GameOutcome};
pub use winners::winners;
