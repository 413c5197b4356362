//! Claim relation between players and slots.
//!
//! A player builds a [`Claim`] one slot at a time. When it reaches the set
//! size the player joins the [`ClaimQueue`]; the dealer drains the queue in
//! arrival order, so simultaneous claims are judged in submission order.

mod claim;
mod queue;

pub use claim::{Claim, ClaimToggle};
pub use queue::ClaimQueue;
