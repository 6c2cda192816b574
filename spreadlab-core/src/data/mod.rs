//! Price feed abstraction and the in-memory fixture implementation.

pub mod feed;
pub mod memory;

pub use feed::{FeedError, OptionQuote, OptionRight, PriceFeed, UnderlyingTick};
pub use memory::MemoryFeed;
