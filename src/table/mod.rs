//! The board of face-up cards.
//!
//! - [`Slot`]: one position, with its card and token set behind one lock
//! - [`Board`]: every slot plus the reverse card index

mod slot;
mod board;

pub use slot::{Slot, TokenSet};
pub use board::{Board, Hint, RemovedCard, TokenToggle};
