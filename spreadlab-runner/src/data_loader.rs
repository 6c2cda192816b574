//! Dataset loading for file-backed runs.
//!
//! Production runs read from the historical quote store; for portable
//! runs and tests the CLI accepts a JSON dataset file that is loaded into
//! a `MemoryFeed`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use spreadlab_core::data::{MemoryFeed, OptionQuote, OptionRight};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk dataset: one underlying series plus flat quote rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub underlying: Vec<UnderlyingRow>,
    pub quotes: Vec<QuoteRow>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnderlyingRow {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuoteRow {
    pub date: NaiveDate,
    pub right: OptionRight,
    pub strike: f64,
    pub time: NaiveTime,
    pub bid: f64,
    pub ask: f64,
    pub underlying: f64,
}

/// Load a JSON dataset file into an in-memory feed.
pub fn load_dataset(path: &Path) -> Result<MemoryFeed, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let dataset: DatasetFile = serde_json::from_str(&text)?;
    Ok(build_feed(&dataset))
}

pub fn build_feed(dataset: &DatasetFile) -> MemoryFeed {
    let mut feed = MemoryFeed::new();
    for row in &dataset.underlying {
        feed.push_underlying(row.timestamp, row.price);
    }
    for row in &dataset.quotes {
        feed.push_quote(
            row.date,
            row.right,
            row.strike,
            OptionQuote {
                time: row.time,
                bid: row.bid,
                ask: row.ask,
                underlying: row.underlying,
            },
        );
    }
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use spreadlab_core::data::PriceFeed;
    use std::io::Write;

    #[test]
    fn loads_dataset_from_file() {
        let json = r#"{
            "underlying": [
                { "timestamp": "2025-05-12T15:30:00", "price": 5914.0 },
                { "timestamp": "2025-05-12T15:31:00", "price": 5915.2 }
            ],
            "quotes": [
                { "date": "2025-05-12", "right": "P", "strike": 5915.0,
                  "time": "15:30:00", "bid": 5.4, "ask": 5.5, "underlying": 5914.0 }
            ]
        }"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let feed = load_dataset(file.path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 5, 12).unwrap();
        let series = feed
            .underlying_series(
                date,
                date,
                NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                "",
            )
            .unwrap();
        assert_eq!(series.len(), 2);

        let quotes = feed
            .option_quotes(
                date,
                NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                OptionRight::Put,
                5915.0,
            )
            .unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].bid, 5.4);
    }

    #[test]
    fn malformed_dataset_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            load_dataset(file.path()),
            Err(LoadError::Parse(_))
        ));
    }
}
