//! Per-minute spread price reconstruction from raw leg quotes.
//!
//! Prices follow the credit seller's sign convention: a healthy credit
//! spread prices negative, and `-width` is the worst case.

use serde::{Deserialize, Serialize};

/// Option price increment on the simulated exchange.
pub const PRICE_TICK: f64 = 0.05;

/// What to do with a reconstructed price that comes out positive (a debit,
/// impossible for this credit structure).
///
/// The two historical builder revisions disagreed on this; both behaviors
/// are kept behind this flag rather than unified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteInvalidationPolicy {
    /// Keep the positive price as-is.
    #[default]
    Keep,
    /// Treat the quote as invalidated and force the price to `-width`.
    ForceMaxLoss,
}

/// Quotes for both legs at one minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegQuotes {
    pub short_bid: f64,
    pub short_ask: f64,
    pub long_bid: f64,
    pub long_ask: f64,
}

impl LegQuotes {
    fn is_all_zero(&self) -> bool {
        self.short_bid == 0.0
            && self.short_ask == 0.0
            && self.long_bid == 0.0
            && self.long_ask == 0.0
    }
}

/// Round to the nearest exchange tick.
pub fn round_to_tick(price: f64) -> f64 {
    (price / PRICE_TICK).round() * PRICE_TICK
}

/// Round to 2 decimal places (ledger precision).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place (take-profit threshold precision).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Reconstruct the spread's fill price for one minute.
///
/// All-zero quotes on both legs mean no liquidity; the price is forced to
/// `-width`, the worst case for the credit seller. Otherwise the mid of the
/// two legs' bid/ask differences is tick-rounded, slipped, and rounded to
/// ledger precision.
pub fn spread_price(
    quotes: LegQuotes,
    width: f64,
    slippage: f64,
    policy: QuoteInvalidationPolicy,
) -> f64 {
    if quotes.is_all_zero() {
        return -width;
    }

    let short_bid = quotes.short_bid.max(0.0);
    let short_ask = quotes.short_ask.max(0.0);
    let long_bid = quotes.long_bid.max(0.0);
    let long_ask = quotes.long_ask.max(0.0);

    let raw = ((long_ask - short_ask) + (long_bid - short_bid)) / 2.0;
    let price = round2(round_to_tick(raw) + slippage);

    if policy == QuoteInvalidationPolicy::ForceMaxLoss && price > 0.0 {
        return -width;
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_quotes_force_max_loss() {
        let quotes = LegQuotes {
            short_bid: 0.0,
            short_ask: 0.0,
            long_bid: 0.0,
            long_ask: 0.0,
        };
        let price = spread_price(quotes, 10.0, 0.05, QuoteInvalidationPolicy::Keep);
        assert_eq!(price, -10.0);
    }

    #[test]
    fn negative_quotes_clamp_to_zero() {
        let quotes = LegQuotes {
            short_bid: -1.0,
            short_ask: 5.4,
            long_bid: 0.0,
            long_ask: 0.1,
        };
        // short_bid clamps to 0: raw = ((0.1 - 5.4) + (0.0 - 0.0)) / 2 = -2.65
        let price = spread_price(quotes, 10.0, 0.0, QuoteInvalidationPolicy::Keep);
        assert_eq!(price, -2.65);
    }

    #[test]
    fn mid_price_with_tick_and_slippage() {
        // short 5.40/5.60, long 0.10/0.20:
        // raw = ((0.20 - 5.60) + (0.10 - 5.40)) / 2 = -5.35
        // tick-round -5.35 → -5.35, + 0.05 slippage → -5.30
        let quotes = LegQuotes {
            short_bid: 5.40,
            short_ask: 5.60,
            long_bid: 0.10,
            long_ask: 0.20,
        };
        let price = spread_price(quotes, 10.0, 0.05, QuoteInvalidationPolicy::Keep);
        assert_eq!(price, -5.30);
    }

    #[test]
    fn tick_rounding_snaps_to_nickels() {
        assert_eq!(round_to_tick(-5.37), -5.35);
        assert_eq!(round_to_tick(-5.33), -5.35);
        assert_eq!(round_to_tick(1.02), 1.0);
        assert_eq!(round_to_tick(0.0), 0.0);
    }

    #[test]
    fn positive_price_kept_by_default() {
        // Inverted quotes produce a positive (debit) price.
        let quotes = LegQuotes {
            short_bid: 0.10,
            short_ask: 0.20,
            long_bid: 5.40,
            long_ask: 5.60,
        };
        let price = spread_price(quotes, 10.0, 0.0, QuoteInvalidationPolicy::Keep);
        assert!(price > 0.0);
    }

    #[test]
    fn positive_price_forced_under_invalidation_policy() {
        let quotes = LegQuotes {
            short_bid: 0.10,
            short_ask: 0.20,
            long_bid: 5.40,
            long_ask: 5.60,
        };
        let price = spread_price(quotes, 10.0, 0.0, QuoteInvalidationPolicy::ForceMaxLoss);
        assert_eq!(price, -10.0);
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round2(-5.456), -5.46);
        assert_eq!(round1(-0.545), -0.5); // threshold precision
        assert_eq!(round1(-5.45 * 0.1), -0.5);
    }
}
