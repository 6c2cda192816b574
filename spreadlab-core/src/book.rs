//! TradeBook — the append-only trade ledger for one simulation run.
//!
//! Trades arrive fully resolved (the builder knows the exit up front), so
//! the book's job is lifecycle bookkeeping: O(1) per-strategy active counts
//! and an exit-time min-heap so each minute's close check pops due trades
//! instead of scanning the whole ledger.

use crate::domain::{StrategyId, Trade, TradeId, TradeStatus};
use chrono::NaiveDateTime;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Default)]
pub struct TradeBook {
    trades: Vec<Trade>,
    strategy_of: Vec<StrategyId>,
    active_counts: Vec<usize>,
    /// Min-heap keyed by exit time; each entry is pushed exactly once, so a
    /// trade can transition active→closed exactly once.
    exit_queue: BinaryHeap<Reverse<(NaiveDateTime, TradeId)>>,
}

impl TradeBook {
    pub fn new(strategy_count: usize) -> Self {
        Self {
            trades: Vec::new(),
            strategy_of: Vec::new(),
            active_counts: vec![0; strategy_count],
            exit_queue: BinaryHeap::new(),
        }
    }

    /// Append a trade and schedule its close. The trade enters as Active.
    pub fn open(&mut self, mut trade: Trade, strategy: StrategyId) -> TradeId {
        trade.status = TradeStatus::Active;
        let id = TradeId(self.trades.len());
        self.exit_queue.push(Reverse((trade.exit_time, id)));
        self.trades.push(trade);
        self.strategy_of.push(strategy);
        self.active_counts[strategy.0] += 1;
        id
    }

    /// Close every active trade with `exit_time <= now`, in exit-time order.
    /// Returns the closed ids so the caller can release reserved strikes.
    pub fn close_due(&mut self, now: NaiveDateTime) -> Vec<TradeId> {
        let mut closed = Vec::new();
        while let Some(&Reverse((exit_time, id))) = self.exit_queue.peek() {
            if exit_time > now {
                break;
            }
            self.exit_queue.pop();
            let trade = &mut self.trades[id.0];
            debug_assert_eq!(trade.status, TradeStatus::Active);
            trade.status = TradeStatus::Closed;
            self.active_counts[self.strategy_of[id.0].0] -= 1;
            closed.push(id);
        }
        closed
    }

    pub fn active_count(&self, strategy: StrategyId) -> usize {
        self.active_counts[strategy.0]
    }

    pub fn trade(&self, id: TradeId) -> &Trade {
        &self.trades[id.0]
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Consume the book, yielding trades in open order (= entry-time order
    /// for a serial run).
    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
