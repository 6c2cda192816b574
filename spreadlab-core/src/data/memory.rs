//! In-memory price feed, used as the test fixture and as the backing store
//! for dataset files loaded by the runner.

use super::feed::{FeedError, OptionQuote, OptionRight, PriceFeed, UnderlyingTick};
use crate::reservation::strike_key;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashMap};

/// A feed backed by plain maps. Series are kept sorted on insertion.
#[derive(Debug, Default, Clone)]
pub struct MemoryFeed {
    underlying: BTreeMap<NaiveDateTime, f64>,
    quotes: HashMap<(NaiveDate, OptionRight, i64), Vec<OptionQuote>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_underlying(&mut self, timestamp: NaiveDateTime, price: f64) {
        self.underlying.insert(timestamp, price);
    }

    pub fn push_quote(
        &mut self,
        date: NaiveDate,
        right: OptionRight,
        strike: f64,
        quote: OptionQuote,
    ) {
        let series = self
            .quotes
            .entry((date, right, strike_key(strike)))
            .or_default();
        series.push(quote);
        series.sort_by_key(|q| q.time);
    }

    pub fn is_empty(&self) -> bool {
        self.underlying.is_empty() && self.quotes.is_empty()
    }
}

impl PriceFeed for MemoryFeed {
    fn underlying_series(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        filter: &str,
    ) -> Result<Vec<UnderlyingTick>, FeedError> {
        // Condition expressions are a store-side concept; the in-memory
        // fixture carries no auxiliary metrics to filter on.
        if !filter.trim().is_empty() {
            return Err(FeedError::UnsupportedFilter(filter.to_string()));
        }

        let ticks = self
            .underlying
            .iter()
            .filter(|(ts, _)| {
                let date = ts.date();
                let time = ts.time();
                date >= start_date && date <= end_date && time >= start_time && time <= end_time
            })
            .map(|(&timestamp, &price)| UnderlyingTick { timestamp, price })
            .collect();
        Ok(ticks)
    }

    fn option_quotes(
        &self,
        date: NaiveDate,
        from_time: NaiveTime,
        right: OptionRight,
        strike: f64,
    ) -> Result<Vec<OptionQuote>, FeedError> {
        let series = match self.quotes.get(&(date, right, strike_key(strike))) {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };
        Ok(series
            .iter()
            .filter(|q| q.time >= from_time)
            .copied()
            .collect())
    }
}
