//! Minute-resolution simulation loop.
//!
//! One run walks every business day in the range, minute by minute from
//! session open to close. Each minute iterates the strategies in declared
//! order, and each strategy's turn runs three steps: its entry check, its
//! due hedge entries, then a global close sweep. The sweep runs inside
//! the per-strategy iteration, so a trade closing at minute T frees its
//! strikes and capacity slot before the next strategy's entry check at
//! that same minute. The order is part of the engine's determinism
//! contract.

pub mod runtime;

pub use runtime::{PendingHedge, StrategyRuntime};

use crate::book::TradeBook;
use crate::config::{SimulationSettings, StrategyConfig};
use crate::data::{FeedError, PriceFeed};
use crate::domain::{StrategyId, Trade, TradeStatus};
use crate::hedge::plan_hedge;
use crate::reservation::StrikeReservation;
use crate::session::{business_days, session_end, session_minutes, session_start};
use crate::spread::{BuildOutcome, SpreadBuilder, SpreadRequest};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a finished run produces. Warnings are collected here rather
/// than printed; the caller decides what to surface.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// All trades, in entry order, every one `Closed`.
    pub trades: Vec<Trade>,
    pub diagnostics: Vec<String>,
    /// Business days that had underlying data.
    pub days_processed: usize,
}

/// Trades and warnings from a single session day.
#[derive(Debug, Clone, Default)]
pub struct DayResult {
    pub trades: Vec<Trade>,
    pub diagnostics: Vec<String>,
    /// False when the day had no underlying data and was skipped.
    pub had_data: bool,
}

pub struct Simulator<'a> {
    feed: &'a dyn PriceFeed,
    settings: SimulationSettings,
    strategies: Vec<StrategyConfig>,
}

impl<'a> Simulator<'a> {
    pub fn new(
        feed: &'a dyn PriceFeed,
        settings: SimulationSettings,
        strategies: Vec<StrategyConfig>,
    ) -> Self {
        Self {
            feed,
            settings,
            strategies,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Resolve each strategy's entry candidates up front. Fails fast if the
    /// run range has no underlying data at all.
    pub fn prepare(&self) -> Result<Vec<StrategyRuntime>, FeedError> {
        let coverage = self.feed.underlying_series(
            self.settings.start_date,
            self.settings.end_date,
            session_start(),
            session_end(),
            "",
        )?;
        if coverage.is_empty() {
            return Err(FeedError::EmptyUnderlying {
                start: self.settings.start_date,
                end: self.settings.end_date,
            });
        }

        self.strategies
            .iter()
            .map(|config| {
                StrategyRuntime::prepare(
                    config.clone(),
                    self.feed,
                    self.settings.start_date,
                    self.settings.end_date,
                )
            })
            .collect()
    }

    /// Run the whole date range serially.
    pub fn run(&self) -> Result<SimulationResult, FeedError> {
        let runtimes = self.prepare()?;
        let mut trades = Vec::new();
        let mut diagnostics = Vec::new();
        let mut days_processed = 0;

        for day in business_days(self.settings.start_date, self.settings.end_date) {
            let mut day_result = self.run_day(&runtimes, day)?;
            diagnostics.append(&mut day_result.diagnostics);
            if day_result.had_data {
                days_processed += 1;
            }
            trades.append(&mut day_result.trades);
        }

        Ok(SimulationResult {
            trades,
            diagnostics,
            days_processed,
        })
    }

    /// Simulate one session day. Days are independent: no position survives
    /// a session close, so this is the unit of parallelism.
    pub fn run_day(
        &self,
        runtimes: &[StrategyRuntime],
        day: NaiveDate,
    ) -> Result<DayResult, FeedError> {
        let mut result = DayResult::default();

        let series =
            self.feed
                .underlying_series(day, day, session_start(), session_end(), "")?;
        let Some(last_tick) = series.last() else {
            result.diagnostics.push(format!("{day}: no underlying data, day skipped"));
            return Ok(result);
        };
        result.had_data = true;
        let session_eod_price = last_tick.price;
        let prices: BTreeMap<NaiveDateTime, f64> = series
            .into_iter()
            .map(|tick| (tick.timestamp, tick.price))
            .collect();

        let builder = SpreadBuilder::new(
            self.feed,
            self.settings.slippage,
            self.settings.commission,
            self.settings.invalid_quote_policy,
        );
        let mut book = TradeBook::new(runtimes.len());
        let mut reservation = StrikeReservation::new();
        let mut pending_hedges: Vec<PendingHedge> = Vec::new();

        for now in session_minutes(day) {
            for (index, runtime) in runtimes.iter().enumerate() {
                let sid = StrategyId(index);
                self.open_check(
                    &builder,
                    runtime,
                    sid,
                    now,
                    session_eod_price,
                    &mut book,
                    &mut reservation,
                    &mut pending_hedges,
                    &mut result.diagnostics,
                );
                self.hedge_check(
                    &builder,
                    &runtime.config,
                    sid,
                    now,
                    session_eod_price,
                    &prices,
                    &mut book,
                    &mut reservation,
                    &mut pending_hedges,
                    &mut result.diagnostics,
                );
                // Sweep inside the strategy iteration: strikes freed here
                // are available to the next strategy this same minute.
                for id in book.close_due(now) {
                    let trade = book.trade(id);
                    reservation.release(
                        trade.spread_type,
                        &[trade.short_strike(), trade.long_strike()],
                    );
                }
            }
        }

        debug_assert!(book
            .trades()
            .iter()
            .all(|t| t.status == TradeStatus::Closed));
        result.trades = book.into_trades();
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn open_check(
        &self,
        builder: &SpreadBuilder<'_>,
        runtime: &StrategyRuntime,
        sid: StrategyId,
        now: NaiveDateTime,
        session_eod_price: f64,
        book: &mut TradeBook,
        reservation: &mut StrikeReservation,
        pending_hedges: &mut Vec<PendingHedge>,
        diagnostics: &mut Vec<String>,
    ) {
        let config = &runtime.config;
        if book.active_count(sid) >= config.max_active_positions {
            return;
        }
        let Some(current_price) = runtime.entry_price_at(now) else {
            return;
        };

        let request = SpreadRequest {
            spread_type: config.spread_type,
            current_price,
            session_eod_price,
            entry_time: now,
            width: config.width,
            offset: config.offset,
            stop_loss_policy: config.stop_loss_policy,
            take_profit_level: config.take_profit_level,
            forced_strikes: None,
        };

        match builder.build(&request) {
            BuildOutcome::Opened(mut trade) => {
                let legs = [trade.short_strike(), trade.long_strike()];
                if reservation.any_reserved(config.spread_type, &legs) {
                    return;
                }
                reservation.reserve(config.spread_type, &legs);
                trade.strategy = config.name.clone();
                if let Some(request) = plan_hedge(&trade, config.hedge_policy, config.window_end)
                {
                    pending_hedges.push(PendingHedge {
                        request,
                        strategy: sid,
                    });
                }
                book.open(trade, sid);
            }
            BuildOutcome::NoData => {}
            BuildOutcome::InvalidEntry { entry_price, width } => {
                diagnostics.push(format!(
                    "{now}: {} entry credit {entry_price} below -{width}, rejected",
                    config.name
                ));
            }
            BuildOutcome::Failed(context) => {
                diagnostics.push(format!("{now}: {} build failed: {context}", config.name));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn hedge_check(
        &self,
        builder: &SpreadBuilder<'_>,
        config: &StrategyConfig,
        sid: StrategyId,
        now: NaiveDateTime,
        session_eod_price: f64,
        prices: &BTreeMap<NaiveDateTime, f64>,
        book: &mut TradeBook,
        reservation: &mut StrikeReservation,
        pending_hedges: &mut Vec<PendingHedge>,
        diagnostics: &mut Vec<String>,
    ) {
        let mut index = 0;
        while index < pending_hedges.len() {
            let pending = &pending_hedges[index];
            if pending.strategy != sid || pending.request.entry_time > now {
                index += 1;
                continue;
            }
            let hedge = pending_hedges.swap_remove(index);

            if book.active_count(sid) >= config.max_active_positions {
                diagnostics.push(format!(
                    "{now}: {} hedge skipped, no capacity",
                    config.name
                ));
                continue;
            }

            // Last known underlying price at or before the hedge minute.
            let current_price = prices
                .range(..=now)
                .next_back()
                .map(|(_, &price)| price)
                .unwrap_or(session_eod_price);
            let width = (hedge.request.forced_short - hedge.request.forced_long).abs();

            let request = SpreadRequest {
                spread_type: hedge.request.spread_type,
                current_price,
                session_eod_price,
                entry_time: hedge.request.entry_time,
                width,
                offset: config.offset,
                stop_loss_policy: config.stop_loss_policy,
                take_profit_level: config.take_profit_level,
                forced_strikes: Some((hedge.request.forced_short, hedge.request.forced_long)),
            };

            match builder.build(&request) {
                BuildOutcome::Opened(mut trade) => {
                    let legs = [trade.short_strike(), trade.long_strike()];
                    if reservation.any_reserved(trade.spread_type, &legs) {
                        diagnostics.push(format!(
                            "{now}: {} hedge skipped, strikes reserved",
                            config.name
                        ));
                        continue;
                    }
                    reservation.reserve(trade.spread_type, &legs);
                    trade.strategy = config.name.clone();
                    book.open(trade, sid);
                }
                BuildOutcome::NoData => {
                    diagnostics.push(format!(
                        "{now}: {} hedge skipped, no quote overlap",
                        config.name
                    ));
                }
                BuildOutcome::InvalidEntry { entry_price, width } => {
                    diagnostics.push(format!(
                        "{now}: {} hedge entry credit {entry_price} below -{width}, rejected",
                        config.name
                    ));
                }
                BuildOutcome::Failed(context) => {
                    diagnostics.push(format!(
                        "{now}: {} hedge build failed: {context}",
                        config.name
                    ));
                }
            }
        }
    }
}
