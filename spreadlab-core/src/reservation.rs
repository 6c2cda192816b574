//! StrikeReservation — per-session bookkeeping of strikes held by open
//! positions.
//!
//! No two simultaneously active trades on the same side may share a strike.
//! The simulator clears the reservation at each day boundary.

use crate::domain::SpreadType;
use std::collections::BTreeSet;

/// Strikes are f64 in the ledger format; the reservation keys them as whole
/// cents so set membership never depends on float equality.
pub fn strike_key(strike: f64) -> i64 {
    (strike * 100.0).round() as i64
}

#[derive(Debug, Default, Clone)]
pub struct StrikeReservation {
    puts: BTreeSet<i64>,
    calls: BTreeSet<i64>,
}

impl StrikeReservation {
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, spread_type: SpreadType) -> &BTreeSet<i64> {
        match spread_type {
            SpreadType::PutSpread => &self.puts,
            SpreadType::CallSpread => &self.calls,
        }
    }

    fn side_mut(&mut self, spread_type: SpreadType) -> &mut BTreeSet<i64> {
        match spread_type {
            SpreadType::PutSpread => &mut self.puts,
            SpreadType::CallSpread => &mut self.calls,
        }
    }

    pub fn is_reserved(&self, spread_type: SpreadType, strike: f64) -> bool {
        self.side(spread_type).contains(&strike_key(strike))
    }

    /// True if any of the given strikes is already held on this side.
    pub fn any_reserved(&self, spread_type: SpreadType, strikes: &[f64]) -> bool {
        strikes.iter().any(|&s| self.is_reserved(spread_type, s))
    }

    pub fn reserve(&mut self, spread_type: SpreadType, strikes: &[f64]) {
        let side = self.side_mut(spread_type);
        for &s in strikes {
            side.insert(strike_key(s));
        }
    }

    pub fn release(&mut self, spread_type: SpreadType, strikes: &[f64]) {
        let side = self.side_mut(spread_type);
        for &s in strikes {
            side.remove(&strike_key(s));
        }
    }

    /// Day-boundary reset.
    pub fn clear(&mut self) {
        self.puts.clear();
        self.calls.clear();
    }

    pub fn reserved_count(&self, spread_type: SpreadType) -> usize {
        self.side(spread_type).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_and_release() {
        let mut res = StrikeReservation::new();
        res.reserve(SpreadType::PutSpread, &[5915.0, 5905.0]);
        assert!(res.is_reserved(SpreadType::PutSpread, 5915.0));
        assert!(res.any_reserved(SpreadType::PutSpread, &[5905.0, 5895.0]));
        assert!(!res.any_reserved(SpreadType::PutSpread, &[5895.0, 5885.0]));

        res.release(SpreadType::PutSpread, &[5915.0, 5905.0]);
        assert_eq!(res.reserved_count(SpreadType::PutSpread), 0);
    }

    #[test]
    fn sides_are_independent() {
        let mut res = StrikeReservation::new();
        res.reserve(SpreadType::PutSpread, &[5915.0]);
        assert!(!res.is_reserved(SpreadType::CallSpread, 5915.0));
    }

    #[test]
    fn float_noise_does_not_split_strikes() {
        let mut res = StrikeReservation::new();
        res.reserve(SpreadType::CallSpread, &[5915.0]);
        assert!(res.is_reserved(SpreadType::CallSpread, 5914.999999999999));
    }

    #[test]
    fn clear_resets_both_sides() {
        let mut res = StrikeReservation::new();
        res.reserve(SpreadType::PutSpread, &[5915.0]);
        res.reserve(SpreadType::CallSpread, &[5920.0]);
        res.clear();
        assert_eq!(res.reserved_count(SpreadType::PutSpread), 0);
        assert_eq!(res.reserved_count(SpreadType::CallSpread), 0);
    }
}
