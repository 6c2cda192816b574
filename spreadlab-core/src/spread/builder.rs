//! SpreadBuilder — materializes one credit spread from raw option quotes.
//!
//! Given an entry minute and strategy parameters, the builder selects
//! strikes, joins both legs' quote series, reconstructs the spread's price
//! path, and resolves the exit (break-even stop, take-profit, or expiry) in
//! one pass. The returned `Trade` carries its exit up front; the simulator
//! only flips its status when the clock gets there.

use crate::data::{FeedError, OptionQuote, OptionRight, PriceFeed};
use crate::domain::{Outcome, SpreadType, StopLossPolicy, Trade, TradeStatus};
use crate::pricing::{round1, round2, spread_price, LegQuotes, QuoteInvalidationPolicy};
use crate::session::{early_stop_cutoff, forced_expiry_time};
use chrono::{NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use thiserror::Error;

use super::outcome::{BuildContext, BuildOutcome};

/// Strikes are quoted on a 5-point grid.
const STRIKE_STEP: f64 = 5.0;

/// Inputs for one build call.
#[derive(Debug, Clone)]
pub struct SpreadRequest {
    pub spread_type: SpreadType,
    /// Underlying price at the entry minute.
    pub current_price: f64,
    /// Final underlying price of the session, used when quotes stop early.
    pub session_eod_price: f64,
    pub entry_time: NaiveDateTime,
    pub width: f64,
    pub offset: f64,
    pub stop_loss_policy: StopLossPolicy,
    pub take_profit_level: f64,
    /// Set by the hedge coordinator to reuse a primary trade's strikes.
    pub forced_strikes: Option<(f64, f64)>,
}

/// Select (short, long) strikes for a spread at the given underlying price.
///
/// The short leg snaps to the 5-point grid and is shifted by `offset`
/// toward the money for puts and away for calls (credit-seeking
/// convention); the long leg sits `width` points further from the price.
pub fn select_strikes(
    spread_type: SpreadType,
    current_price: f64,
    offset: f64,
    width: f64,
) -> (f64, f64) {
    let grid = (current_price / STRIKE_STEP).round() * STRIKE_STEP;
    match spread_type {
        SpreadType::PutSpread => {
            let short = grid + offset;
            (short, short - width)
        }
        SpreadType::CallSpread => {
            let short = grid - offset;
            (short, short + width)
        }
    }
}

#[derive(Debug, Error)]
enum BuildError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("{0}")]
    Inconsistent(String),
}

/// One minute of the joined, priced spread path.
#[derive(Debug, Clone, Copy)]
struct PathRow {
    time: NaiveTime,
    underlying: f64,
    price: f64,
}

pub struct SpreadBuilder<'a> {
    feed: &'a dyn PriceFeed,
    slippage: f64,
    commission: f64,
    invalid_quote_policy: QuoteInvalidationPolicy,
}

impl<'a> SpreadBuilder<'a> {
    pub fn new(
        feed: &'a dyn PriceFeed,
        slippage: f64,
        commission: f64,
        invalid_quote_policy: QuoteInvalidationPolicy,
    ) -> Self {
        Self {
            feed,
            slippage,
            commission,
            invalid_quote_policy,
        }
    }

    /// Build and fully resolve one spread. Never panics or propagates: any
    /// internal failure is reported as `BuildOutcome::Failed` with the full
    /// parameter context.
    pub fn build(&self, req: &SpreadRequest) -> BuildOutcome {
        let strikes = req.forced_strikes.unwrap_or_else(|| {
            select_strikes(req.spread_type, req.current_price, req.offset, req.width)
        });

        match self.build_inner(req, strikes) {
            Ok(outcome) => outcome,
            Err(err) => BuildOutcome::Failed(BuildContext {
                message: err.to_string(),
                spread_type: req.spread_type,
                underlying_price: req.current_price,
                entry_time: req.entry_time,
                width: req.width,
                offset: req.offset,
                stop_loss_policy: req.stop_loss_policy,
                take_profit_level: req.take_profit_level,
                strikes,
                slippage: self.slippage,
                commission: self.commission,
            }),
        }
    }

    fn build_inner(
        &self,
        req: &SpreadRequest,
        strikes: (f64, f64),
    ) -> Result<BuildOutcome, BuildError> {
        let (short_strike, long_strike) = strikes;
        let right = match req.spread_type {
            SpreadType::PutSpread => OptionRight::Put,
            SpreadType::CallSpread => OptionRight::Call,
        };
        let date = req.entry_time.date();
        let from_time = req.entry_time.time();

        let short_leg = self
            .feed
            .option_quotes(date, from_time, right, short_strike)?;
        let long_leg = self
            .feed
            .option_quotes(date, from_time, right, long_strike)?;

        let path = self.join_legs(&short_leg, &long_leg, req.width);
        if path.is_empty() {
            return Ok(BuildOutcome::NoData);
        }

        let entry_price = path[0].price;
        if entry_price < -req.width {
            return Ok(BuildOutcome::InvalidEntry {
                entry_price,
                width: req.width,
            });
        }

        let (max_loss, break_even_level) = match req.spread_type {
            SpreadType::PutSpread => (
                -round2(((short_strike - long_strike) + entry_price) * 100.0),
                round2(short_strike + entry_price),
            ),
            SpreadType::CallSpread => (
                -round2(((long_strike - short_strike) + entry_price) * 100.0),
                round2(short_strike - entry_price),
            ),
        };
        let max_profit = round2(-entry_price * 100.0);

        // First-breach scans over the joined path.
        let breached = |underlying: f64| match req.spread_type {
            SpreadType::PutSpread => underlying < break_even_level,
            SpreadType::CallSpread => underlying > break_even_level,
        };
        let break_even_minutes: Vec<NaiveTime> = path
            .iter()
            .filter(|row| breached(row.underlying))
            .map(|row| row.time)
            .collect();
        let break_even_first = break_even_minutes.first().copied();

        let take_profit_threshold = round1(entry_price * req.take_profit_level);
        let take_profit_first = path
            .iter()
            .find(|row| row.price > take_profit_threshold)
            .map(|row| row.time);

        // Exit precedence. Under the break-even policy the earlier trigger
        // wins; ties go to take-profit. Under the expire policy a breach is
        // recorded but never exits.
        let last_row = path[path.len() - 1];
        let (exit_minute, mut outcome) = match req.stop_loss_policy {
            StopLossPolicy::BreakEven => match (break_even_first, take_profit_first) {
                (Some(be), Some(tp)) if be < tp => (be, Outcome::StopLoss),
                (Some(_), Some(tp)) => (tp, Outcome::TakeProfit),
                (Some(be), None) => (be, Outcome::StopLoss),
                (None, Some(tp)) => (tp, Outcome::TakeProfit),
                (None, None) => (last_row.time, Outcome::Expire),
            },
            StopLossPolicy::Expire => match take_profit_first {
                Some(tp) => (tp, Outcome::TakeProfit),
                None => (last_row.time, Outcome::Expire),
            },
        };

        let mut exit_price = path
            .iter()
            .find(|row| row.time == exit_minute)
            .map(|row| row.price)
            .ok_or_else(|| {
                BuildError::Inconsistent(format!(
                    "exit minute {exit_minute} missing from joined series"
                ))
            })?;
        let mut exit_time = date.and_time(exit_minute);

        // Short-history override: quotes that stop before the cutoff can't
        // carry the position to expiry, so the session's final underlying
        // price decides the outcome.
        if last_row.time < early_stop_cutoff() {
            let settles_worthless = match req.spread_type {
                SpreadType::PutSpread => req.session_eod_price > short_strike,
                SpreadType::CallSpread => req.session_eod_price < short_strike,
            };
            if settles_worthless {
                exit_time = date.and_time(last_row.time);
                outcome = Outcome::TakeProfit;
                exit_price = round1(entry_price * req.take_profit_level);
            } else {
                exit_time = date.and_time(forced_expiry_time());
                outcome = Outcome::Expire;
                exit_price = -req.width;
            }
        }

        let mut pnl = -round2((entry_price - exit_price) * 100.0 + self.commission);
        if pnl < max_loss {
            pnl = max_loss - self.commission;
        }
        if pnl > max_profit {
            pnl = max_profit - self.commission;
        }

        Ok(BuildOutcome::Opened(Trade {
            spread_type: req.spread_type,
            width: req.width,
            offset: req.offset,
            stop_loss_policy: req.stop_loss_policy,
            take_profit_level: req.take_profit_level,
            strikes,
            max_loss,
            max_profit,
            break_even_level,
            break_even_time: break_even_first.map(|t| date.and_time(t)),
            break_even_times: break_even_minutes
                .into_iter()
                .map(|t| date.and_time(t))
                .collect(),
            entry_time: req.entry_time,
            entry_price,
            exit_time,
            exit_price,
            pnl,
            outcome,
            status: TradeStatus::Active,
            strategy: String::new(),
        }))
    }

    /// Inner-join the two legs on timestamp and price each joined minute.
    /// Minutes present on only one leg are dropped.
    fn join_legs(&self, short_leg: &[OptionQuote], long_leg: &[OptionQuote], width: f64) -> Vec<PathRow> {
        let long_by_time: HashMap<NaiveTime, &OptionQuote> =
            long_leg.iter().map(|q| (q.time, q)).collect();

        short_leg
            .iter()
            .filter_map(|short| {
                long_by_time.get(&short.time).map(|long| PathRow {
                    time: short.time,
                    underlying: short.underlying,
                    price: spread_price(
                        LegQuotes {
                            short_bid: short.bid,
                            short_ask: short.ask,
                            long_bid: long.bid,
                            long_ask: long.ask,
                        },
                        width,
                        self.slippage,
                        self.invalid_quote_policy,
                    ),
                })
            })
            .collect()
    }
}
