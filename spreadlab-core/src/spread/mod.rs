//! Spread construction: strike selection, quote-path reconstruction, and
//! exit resolution.

pub mod builder;
pub mod outcome;

pub use builder::{select_strikes, SpreadBuilder, SpreadRequest};
pub use outcome::{BuildContext, BuildOutcome};
