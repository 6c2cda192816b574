//! Serializable run configuration.
//!
//! A run file is a JSON document with two sections: `simulation_config`
//! (date range, balance, frictions) and `strategies` (one entry per
//! strategy slot). Field names follow the historical config format, so
//! existing run files keep working.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use spreadlab_core::config::{HedgePolicy, SimulationSettings, StrategyConfig};
use spreadlab_core::domain::{SpreadType, StopLossPolicy};
use spreadlab_core::pricing::QuoteInvalidationPolicy;
use spreadlab_core::session::{session_end, session_start};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid time '{value}' in strategy '{strategy}': expected HH:MM")]
    InvalidTime { strategy: String, value: String },
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Top-level run file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub simulation_config: SimulationConfig,
    pub strategies: Vec<StrategySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_balance: f64,
    #[serde(default = "default_slippage")]
    pub slippage: f64,
    #[serde(default = "default_commission")]
    pub commission: f64,
    #[serde(default)]
    pub invalid_quote_policy: QuoteInvalidationPolicy,
}

fn default_slippage() -> f64 {
    0.05
}

fn default_commission() -> f64 {
    1.5
}

/// One strategy slot, in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    /// Ledger label; defaults to the spread type's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub spread_type: SpreadType,
    pub conditions: String,
    /// "HH:MM" time-of-day strings.
    pub start_time_window: String,
    pub end_time_window: String,
    pub width: f64,
    pub offset: f64,
    pub stop_loss_type: StopLossPolicy,
    pub take_profit_level: f64,
    pub max_active_positions: usize,
    #[serde(default)]
    pub hedge: HedgePolicy,
}

impl StrategySpec {
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.spread_type.as_str().to_string())
    }
}

fn parse_window_time(strategy: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ConfigError::InvalidTime {
            strategy: strategy.to_string(),
            value: value.to_string(),
        })
}

impl RunFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let run: RunFile = serde_json::from_str(text)?;
        run.validate()?;
        Ok(run)
    }

    /// Deterministic hash of the full config, for artifact naming and
    /// result reproduction.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation_config;
        if sim.start_date > sim.end_date {
            return Err(ConfigError::Validation(format!(
                "start_date {} is after end_date {}",
                sim.start_date, sim.end_date
            )));
        }
        if sim.starting_balance <= 0.0 {
            return Err(ConfigError::Validation(
                "starting_balance must be positive".into(),
            ));
        }
        if sim.slippage < 0.0 || sim.commission < 0.0 {
            return Err(ConfigError::Validation(
                "slippage and commission must be non-negative".into(),
            ));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::Validation(
                "at least one strategy is required".into(),
            ));
        }

        for spec in &self.strategies {
            let label = spec.label();
            if spec.width <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "strategy '{label}': width must be positive"
                )));
            }
            // Offset is unrestricted: a negative offset shifts the short
            // strike toward the money.
            if spec.take_profit_level <= 0.0 || spec.take_profit_level > 1.0 {
                return Err(ConfigError::Validation(format!(
                    "strategy '{label}': take_profit_level must be in (0, 1]"
                )));
            }
            if spec.max_active_positions == 0 {
                return Err(ConfigError::Validation(format!(
                    "strategy '{label}': max_active_positions must be at least 1"
                )));
            }
            let start = parse_window_time(&label, &spec.start_time_window)?;
            let end = parse_window_time(&label, &spec.end_time_window)?;
            if start >= end {
                return Err(ConfigError::Validation(format!(
                    "strategy '{label}': window start {start} is not before end {end}"
                )));
            }
            if start < session_start() || end > session_end() {
                return Err(ConfigError::Validation(format!(
                    "strategy '{label}': window {start}-{end} outside session {}-{}",
                    session_start(),
                    session_end()
                )));
            }
        }
        Ok(())
    }

    pub fn to_settings(&self) -> SimulationSettings {
        let sim = &self.simulation_config;
        SimulationSettings {
            start_date: sim.start_date,
            end_date: sim.end_date,
            starting_balance: sim.starting_balance,
            slippage: sim.slippage,
            commission: sim.commission,
            invalid_quote_policy: sim.invalid_quote_policy,
        }
    }

    pub fn to_strategies(&self) -> Result<Vec<StrategyConfig>, ConfigError> {
        self.strategies
            .iter()
            .map(|spec| {
                let label = spec.label();
                Ok(StrategyConfig {
                    name: label.clone(),
                    spread_type: spec.spread_type,
                    conditions: spec.conditions.clone(),
                    window_start: parse_window_time(&label, &spec.start_time_window)?,
                    window_end: parse_window_time(&label, &spec.end_time_window)?,
                    width: spec.width,
                    offset: spec.offset,
                    stop_loss_policy: spec.stop_loss_type,
                    take_profit_level: spec.take_profit_level,
                    max_active_positions: spec.max_active_positions,
                    hedge_policy: spec.hedge,
                })
            })
            .collect()
    }
}
