//! PriceFeed trait and structured error types.
//!
//! The trait abstracts over the historical price/quote store so the engine
//! can be driven by a database-backed store in production and by an
//! in-memory fixture in tests. The store's query layer is not part of this
//! crate; the engine only sees ordered series.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One minute of the underlying index series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingTick {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// One minute of a single option contract's quote series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub time: NaiveTime,
    pub bid: f64,
    pub ask: f64,
    /// Underlying index price recorded alongside the quote.
    pub underlying: f64,
}

/// Option right, wire-encoded as the store's single-letter convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionRight {
    #[serde(rename = "P")]
    Put,
    #[serde(rename = "C")]
    Call,
}

impl OptionRight {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionRight::Put => "P",
            OptionRight::Call => "C",
        }
    }
}

/// Structured errors surfaced by a price feed.
///
/// All data is static history, so there are no retry semantics: a failed
/// lookup fails identically on retry and the run fails fast.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("no underlying data between {start} and {end}")]
    EmptyUnderlying { start: NaiveDate, end: NaiveDate },

    #[error("unsupported filter expression: {0}")]
    UnsupportedFilter(String),
}

/// Read-only access to the historical store.
///
/// Implementations return series in strictly increasing time order. `Send +
/// Sync` is required because the runner may fan days out across threads.
pub trait PriceFeed: Send + Sync {
    /// Ordered underlying series over a date range, restricted to a
    /// time-of-day window. `filter` is an opaque store-side condition
    /// expression ("" for none); the store decides its meaning.
    fn underlying_series(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        filter: &str,
    ) -> Result<Vec<UnderlyingTick>, FeedError>;

    /// Ordered quote series for one contract on one date, from `from_time`
    /// to the end of the session.
    fn option_quotes(
        &self,
        date: NaiveDate,
        from_time: NaiveTime,
        right: OptionRight,
        strike: f64,
    ) -> Result<Vec<OptionQuote>, FeedError>;
}
