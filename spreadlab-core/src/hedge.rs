//! Box-hedge planning.
//!
//! A hedge is an opposite-side spread opened against a live primary trade
//! with the primary's strikes swapped, so the pair boxes in the loss. The
//! planner only decides WHETHER and WHEN to hedge; construction goes
//! through the ordinary `SpreadBuilder` with forced strikes.

use crate::config::HedgePolicy;
use crate::domain::{SpreadType, Trade};
use chrono::{NaiveDateTime, NaiveTime};

/// A planned hedge entry, ready to hand to the builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeRequest {
    pub spread_type: SpreadType,
    pub entry_time: NaiveDateTime,
    /// Hedge short leg = primary long leg, and vice versa.
    pub forced_short: f64,
    pub forced_long: f64,
}

/// Decide whether `primary` warrants a hedge under `policy`.
///
/// `BreakEvenBox` triggers at the primary's first break-even breach, if
/// any. `TimeBox` triggers at the strategy's window end when the primary
/// is still open at that minute.
pub fn plan_hedge(
    primary: &Trade,
    policy: HedgePolicy,
    window_end: NaiveTime,
) -> Option<HedgeRequest> {
    let entry_time = match policy {
        HedgePolicy::None => return None,
        HedgePolicy::BreakEvenBox => primary.break_even_time?,
        HedgePolicy::TimeBox => {
            let at = primary.entry_time.date().and_time(window_end);
            if at < primary.exit_time {
                at
            } else {
                return None;
            }
        }
    };

    Some(HedgeRequest {
        spread_type: primary.spread_type.opposite(),
        entry_time,
        forced_short: primary.long_strike(),
        forced_long: primary.short_strike(),
    })
}
