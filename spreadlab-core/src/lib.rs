//! SpreadLab Core — the credit-spread lifecycle engine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (trades, strategies, spread sides, outcomes)
//! - `PriceFeed` trait over the historical price/quote store
//! - Spread pricing: per-minute reconstruction from raw leg quotes
//! - `SpreadBuilder`: strike selection, exit resolution, PnL
//! - Box-hedge planning anchored to break-even breaches or time-of-day
//! - `StrikeReservation` and the append-only `TradeBook`
//! - The minute-by-minute `Simulator` loop

pub mod book;
pub mod config;
pub mod data;
pub mod domain;
pub mod hedge;
pub mod pricing;
pub mod reservation;
pub mod session;
pub mod sim;
pub mod spread;
