//! End-to-end simulation tests over an in-memory feed, covering the hedge
//! policies and the interaction between capacity, reservations, and the
//! close sweep.

use chrono::{NaiveDate, NaiveTime};
use spreadlab_core::config::{HedgePolicy, SimulationSettings, StrategyConfig};
use spreadlab_core::data::{MemoryFeed, OptionQuote, OptionRight};
use spreadlab_core::domain::{Outcome, SpreadType, StopLossPolicy, TradeStatus};
use spreadlab_core::session::session_minutes;
use spreadlab_core::sim::Simulator;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 12).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Underlying sits at 5914 until 20:30, then gaps down to 5900.
fn underlying_at(time: NaiveTime) -> f64 {
    if time < t(20, 30) {
        5914.0
    } else {
        5900.0
    }
}

fn push_leg(
    feed: &mut MemoryFeed,
    right: OptionRight,
    strike: f64,
    from: NaiveTime,
    bid: f64,
    ask: f64,
) {
    for minute in session_minutes(date()) {
        let time = minute.time();
        if time < from {
            continue;
        }
        feed.push_quote(
            date(),
            right,
            strike,
            OptionQuote {
                time,
                bid,
                ask,
                underlying: underlying_at(time),
            },
        );
    }
}

/// Full-session fixture: underlying path plus flat quotes for the put pair
/// 5915/5905 and, from 20:30, the mirrored call pair 5905/5915.
fn fixture() -> MemoryFeed {
    let mut feed = MemoryFeed::new();
    for minute in session_minutes(date()) {
        feed.push_underlying(minute, underlying_at(minute.time()));
    }
    // Put legs: entry credit -5.25, break-even 5909.75.
    push_leg(&mut feed, OptionRight::Put, 5915.0, t(15, 30), 5.40, 5.50);
    push_leg(&mut feed, OptionRight::Put, 5905.0, t(15, 30), 0.10, 0.20);
    // Call legs for the box hedge (short 5905, long 5915).
    push_leg(&mut feed, OptionRight::Call, 5905.0, t(20, 0), 7.40, 7.50);
    push_leg(&mut feed, OptionRight::Call, 5915.0, t(20, 0), 1.10, 1.20);
    feed
}

fn strategy(hedge_policy: HedgePolicy, max_active: usize) -> StrategyConfig {
    StrategyConfig {
        name: "put_spread".into(),
        spread_type: SpreadType::PutSpread,
        conditions: String::new(),
        window_start: t(20, 0),
        window_end: t(21, 0),
        width: 10.0,
        offset: 0.0,
        stop_loss_policy: StopLossPolicy::Expire,
        take_profit_level: 0.1,
        max_active_positions: max_active,
        hedge_policy,
    }
}

fn settings() -> SimulationSettings {
    SimulationSettings::new(date(), date(), 10_000.0)
}

#[test]
fn break_even_box_opens_mirrored_call_spread() {
    let feed = fixture();
    let sim = Simulator::new(&feed, settings(), vec![strategy(HedgePolicy::BreakEvenBox, 2)]);
    let result = sim.run().unwrap();

    assert_eq!(result.trades.len(), 2);
    let primary = &result.trades[0];
    let hedge = &result.trades[1];

    assert_eq!(primary.spread_type, SpreadType::PutSpread);
    assert_eq!(primary.strikes, (5915.0, 5905.0));
    assert_eq!(
        primary.break_even_time,
        Some(date().and_hms_opt(20, 30, 0).unwrap())
    );

    // Hedge: opposite side, primary's strikes swapped, opened at the
    // breach minute, carrying the spawning strategy's label.
    assert_eq!(hedge.spread_type, SpreadType::CallSpread);
    assert_eq!(hedge.strikes, (5905.0, 5915.0));
    assert_eq!(hedge.entry_time, date().and_hms_opt(20, 30, 0).unwrap());
    assert_eq!(hedge.strategy, "put_spread");
    assert!(hedge.strikes_valid());
}

#[test]
fn break_even_box_respects_capacity() {
    // With a single slot, the primary still holds it at the breach minute.
    let feed = fixture();
    let sim = Simulator::new(&feed, settings(), vec![strategy(HedgePolicy::BreakEvenBox, 1)]);
    let result = sim.run().unwrap();

    assert_eq!(result.trades.len(), 1);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.contains("hedge skipped, no capacity")));
}

#[test]
fn time_box_opens_at_window_end() {
    let feed = fixture();
    let sim = Simulator::new(&feed, settings(), vec![strategy(HedgePolicy::TimeBox, 2)]);
    let result = sim.run().unwrap();

    assert_eq!(result.trades.len(), 2);
    let hedge = &result.trades[1];
    assert_eq!(hedge.spread_type, SpreadType::CallSpread);
    // Window ends 21:00; the primary holds to expiry, so the box opens.
    assert_eq!(hedge.entry_time, date().and_hms_opt(21, 0, 0).unwrap());
}

#[test]
fn no_hedge_policy_leaves_a_single_trade() {
    let feed = fixture();
    let sim = Simulator::new(&feed, settings(), vec![strategy(HedgePolicy::None, 2)]);
    let result = sim.run().unwrap();
    assert_eq!(result.trades.len(), 1);
}

#[test]
fn all_trades_closed_at_session_end() {
    let feed = fixture();
    let sim = Simulator::new(&feed, settings(), vec![strategy(HedgePolicy::BreakEvenBox, 2)]);
    let result = sim.run().unwrap();

    assert!(result
        .trades
        .iter()
        .all(|trade| trade.status == TradeStatus::Closed));
    assert!(result
        .trades
        .iter()
        .all(|trade| trade.exit_time >= trade.entry_time));
}

#[test]
fn two_strategies_run_independently() {
    // A second strategy on the call side shares the day but not the
    // put-side reservations.
    let feed = fixture();
    let call_strategy = StrategyConfig {
        name: "call_spread".into(),
        spread_type: SpreadType::CallSpread,
        conditions: String::new(),
        window_start: t(20, 30),
        window_end: t(21, 0),
        width: 10.0,
        offset: 10.0,
        stop_loss_policy: StopLossPolicy::Expire,
        take_profit_level: 0.1,
        max_active_positions: 1,
        hedge_policy: HedgePolicy::None,
    };
    // offset 10 at price 5900: short = 5900 - 10 = 5890, long = 5900.
    // No quotes exist for those strikes, so the build yields NoData and
    // the put strategy is unaffected.
    let sim = Simulator::new(
        &feed,
        settings(),
        vec![strategy(HedgePolicy::None, 1), call_strategy],
    );
    let result = sim.run().unwrap();
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].strategy, "put_spread");
}

#[test]
fn close_sweep_frees_strikes_within_the_same_minute() {
    // Put quotes collapse at 20:05, so the 20:00 entry takes profit at
    // 20:05. The sweep runs inside each strategy's turn, so the call
    // strategy's turn (declared first) closes the put and frees its slot
    // and strikes before the put strategy re-checks that same minute.
    let mut feed = MemoryFeed::new();
    for minute in session_minutes(date()) {
        feed.push_underlying(minute, 5914.0);
        let time = minute.time();
        let (bid, ask) = if time < t(20, 5) {
            (5.40, 5.50)
        } else {
            (0.50, 0.60)
        };
        feed.push_quote(
            date(),
            OptionRight::Put,
            5915.0,
            OptionQuote {
                time,
                bid,
                ask,
                underlying: 5914.0,
            },
        );
        feed.push_quote(
            date(),
            OptionRight::Put,
            5905.0,
            OptionQuote {
                time,
                bid: 0.10,
                ask: 0.20,
                underlying: 5914.0,
            },
        );
    }

    // No call quotes exist; this strategy never trades, but its turn
    // precedes the put strategy's each minute.
    let call_strategy = StrategyConfig {
        name: "call_spread".into(),
        spread_type: SpreadType::CallSpread,
        conditions: String::new(),
        window_start: t(20, 0),
        window_end: t(21, 0),
        width: 10.0,
        offset: 0.0,
        stop_loss_policy: StopLossPolicy::Expire,
        take_profit_level: 0.1,
        max_active_positions: 1,
        hedge_policy: HedgePolicy::None,
    };
    let sim = Simulator::new(
        &feed,
        settings(),
        vec![call_strategy, strategy(HedgePolicy::None, 1)],
    );
    let result = sim.run().unwrap();

    assert_eq!(result.trades.len(), 2);
    let first = &result.trades[0];
    let second = &result.trades[1];
    assert_eq!(first.outcome, Outcome::TakeProfit);
    assert_eq!(first.exit_time, date().and_hms_opt(20, 5, 0).unwrap());
    // The re-entry lands on the exit minute, not one minute later.
    assert_eq!(second.entry_time, date().and_hms_opt(20, 5, 0).unwrap());
    assert_eq!(second.strikes, (5915.0, 5905.0));
}

#[test]
fn losing_day_pnl_is_bounded() {
    let feed = fixture();
    let mut config = strategy(HedgePolicy::None, 1);
    config.stop_loss_policy = StopLossPolicy::BreakEven;
    let sim = Simulator::new(&feed, settings(), vec![config]);
    let result = sim.run().unwrap();

    // Break-even policy: the 20:30 breach stops the trade out.
    let trade = &result.trades[0];
    assert_eq!(trade.outcome, Outcome::StopLoss);
    assert_eq!(trade.exit_time, date().and_hms_opt(20, 30, 0).unwrap());
    assert!(trade.pnl >= trade.max_loss - 1.5);
    assert!(trade.pnl <= trade.max_profit - 1.5);
}
