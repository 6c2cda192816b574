//! Run orchestration — config to summary.
//!
//! Two entry points: `run` walks the date range serially, `run_parallel`
//! fans independent session days out across rayon workers. Both produce
//! identical results; days share no state and the merge re-sorts trades by
//! entry time.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use spreadlab_core::data::{FeedError, PriceFeed};
use spreadlab_core::session::business_days;
use spreadlab_core::sim::{SimulationResult, Simulator};

use crate::analyzer::{summarize, RunSummary};
use crate::config::{ConfigError, RunFile, RunId};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Complete result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub summary: RunSummary,
    pub result: SimulationResult,
}

/// Run the configured simulation serially.
pub fn run(config: &RunFile, feed: &dyn PriceFeed) -> Result<RunOutcome, RunError> {
    let simulator = build_simulator(config, feed)?;
    let result = simulator.run()?;
    finish(config, result)
}

/// Run with one rayon task per session day.
pub fn run_parallel(config: &RunFile, feed: &dyn PriceFeed) -> Result<RunOutcome, RunError> {
    let simulator = build_simulator(config, feed)?;
    let runtimes = simulator.prepare()?;
    let days = business_days(
        config.simulation_config.start_date,
        config.simulation_config.end_date,
    );

    let day_results = days
        .par_iter()
        .map(|&day| simulator.run_day(&runtimes, day))
        .collect::<Result<Vec<_>, FeedError>>()?;

    // Days come back in calendar order; within a day trades are already in
    // entry order, so the merged ledger matches the serial run.
    let mut result = SimulationResult {
        trades: Vec::new(),
        diagnostics: Vec::new(),
        days_processed: 0,
    };
    for mut day_result in day_results {
        result.trades.append(&mut day_result.trades);
        result.diagnostics.append(&mut day_result.diagnostics);
        if day_result.had_data {
            result.days_processed += 1;
        }
    }
    result.trades.sort_by_key(|trade| trade.entry_time);

    finish(config, result)
}

fn build_simulator<'a>(
    config: &RunFile,
    feed: &'a dyn PriceFeed,
) -> Result<Simulator<'a>, RunError> {
    config.validate()?;
    Ok(Simulator::new(
        feed,
        config.to_settings(),
        config.to_strategies()?,
    ))
}

fn finish(config: &RunFile, result: SimulationResult) -> Result<RunOutcome, RunError> {
    let summary = summarize(&result.trades, config.simulation_config.starting_balance);
    Ok(RunOutcome {
        run_id: config.run_id()?,
        summary,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, StrategySpec};
    use chrono::{NaiveDate, NaiveTime};
    use spreadlab_core::data::{MemoryFeed, OptionQuote, OptionRight};
    use spreadlab_core::domain::{SpreadType, StopLossPolicy};
    use spreadlab_core::pricing::QuoteInvalidationPolicy;
    use spreadlab_core::session::session_minutes;

    /// Three business days of flat data for the 5915/5905 put pair.
    fn fixture() -> MemoryFeed {
        let mut feed = MemoryFeed::new();
        for day in 12..15 {
            let date = NaiveDate::from_ymd_opt(2025, 5, day).unwrap();
            for minute in session_minutes(date) {
                feed.push_underlying(minute, 5914.0);
                for (strike, bid, ask) in [(5915.0, 5.40, 5.50), (5905.0, 0.10, 0.20)] {
                    feed.push_quote(
                        date,
                        OptionRight::Put,
                        strike,
                        OptionQuote {
                            time: minute.time(),
                            bid,
                            ask,
                            underlying: 5914.0,
                        },
                    );
                }
            }
        }
        feed
    }

    fn run_file() -> RunFile {
        RunFile {
            simulation_config: SimulationConfig {
                start_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 5, 14).unwrap(),
                starting_balance: 10_000.0,
                slippage: 0.05,
                commission: 1.5,
                invalid_quote_policy: QuoteInvalidationPolicy::Keep,
            },
            strategies: vec![StrategySpec {
                name: None,
                spread_type: SpreadType::PutSpread,
                conditions: String::new(),
                start_time_window: "20:00".into(),
                end_time_window: "21:00".into(),
                width: 10.0,
                offset: 0.0,
                stop_loss_type: StopLossPolicy::Expire,
                take_profit_level: 0.1,
                max_active_positions: 1,
                hedge: Default::default(),
            }],
        }
    }

    #[test]
    fn serial_run_covers_every_day() {
        let feed = fixture();
        let outcome = run(&run_file(), &feed).unwrap();
        assert_eq!(outcome.result.days_processed, 3);
        assert_eq!(outcome.result.trades.len(), 3);
        assert_eq!(outcome.summary.overall.total_trades, 3);
        assert_eq!(outcome.summary.daily_pnl.len(), 3);
    }

    #[test]
    fn parallel_run_matches_serial() {
        let feed = fixture();
        let config = run_file();
        let serial = run(&config, &feed).unwrap();
        let parallel = run_parallel(&config, &feed).unwrap();

        assert_eq!(serial.run_id, parallel.run_id);
        assert_eq!(serial.result.trades, parallel.result.trades);
        assert_eq!(serial.result.days_processed, parallel.result.days_processed);
        assert_eq!(
            serial.summary.overall.total_profit,
            parallel.summary.overall.total_profit
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_simulation() {
        let feed = fixture();
        let mut config = run_file();
        config.strategies[0].start_time_window = "21:30".into();
        config.strategies[0].end_time_window = "20:00".into();
        assert!(matches!(
            run(&config, &feed),
            Err(RunError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn strategy_without_name_uses_spread_type_label() {
        let feed = fixture();
        let outcome = run(&run_file(), &feed).unwrap();
        assert!(outcome
            .result
            .trades
            .iter()
            .all(|t| t.strategy == "put_spread"));
    }

    #[test]
    fn window_parsing_applies_to_entries() {
        let feed = fixture();
        let outcome = run(&run_file(), &feed).unwrap();
        let window_start = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
        let window_end = NaiveTime::from_hms_opt(21, 0, 0).unwrap();
        assert!(outcome.result.trades.iter().all(|t| {
            t.entry_time.time() >= window_start && t.entry_time.time() <= window_end
        }));
    }
}
