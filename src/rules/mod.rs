//! Set rule oracle.
//!
//! The engine treats the rule as a black box behind `SetOracle`:
//! - validate a completed claim
//! - enumerate valid sets (hints, automated players, game-over detection)
//!
//! `FeatureOracle` is the standard all-same-or-all-different rule.

pub mod oracle;
pub mod features;

pub use oracle::{CardSet, SetOracle};
pub use features::FeatureOracle;
