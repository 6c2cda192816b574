//! Explicit result type for spread construction.
//!
//! Callers branch on the variant instead of probing an empty collection:
//! `NoData` and `InvalidEntry` are routine skips, `Failed` is an unexpected
//! condition that is reported but never aborts a day or run.

use crate::domain::{SpreadType, StopLossPolicy, Trade};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// What came out of a `SpreadBuilder::build` call.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// A fully resolved trade, ready for reservation/capacity checks.
    Opened(Trade),
    /// The two legs' quote series had no overlapping minutes.
    NoData,
    /// Entry credit below `-width`: a data-quality failure, rejected at
    /// construction.
    InvalidEntry { entry_price: f64, width: f64 },
    /// Unexpected failure during pricing/resolution, with full parameter
    /// context for diagnostics.
    Failed(BuildContext),
}

impl BuildOutcome {
    pub fn is_opened(&self) -> bool {
        matches!(self, BuildOutcome::Opened(_))
    }
}

/// Parameter dump attached to a `Failed` outcome.
#[derive(Debug, Clone, Serialize)]
pub struct BuildContext {
    pub message: String,
    pub spread_type: SpreadType,
    pub underlying_price: f64,
    pub entry_time: NaiveDateTime,
    pub width: f64,
    pub offset: f64,
    pub stop_loss_policy: StopLossPolicy,
    pub take_profit_level: f64,
    pub strikes: (f64, f64),
    pub slippage: f64,
    pub commission: f64,
}

impl fmt::Display for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {} (underlying {}, strikes {}/{}, width {}, offset {}, \
             stop_loss {}, take_profit {}, slippage {}, commission {})",
            self.message,
            self.spread_type,
            self.entry_time,
            self.underlying_price,
            self.strikes.0,
            self.strikes.1,
            self.width,
            self.offset,
            self.stop_loss_policy,
            self.take_profit_level,
            self.slippage,
            self.commission,
        )
    }
}
