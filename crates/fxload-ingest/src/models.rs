//! Row models for tick data

use fxload_common::{ImportError, Result};
use serde::Deserialize;
use sqlx::types::BigDecimal;

use crate::timestamp::parse_tick_timestamp;

/// One raw CSV row as it appears in an archive payload
///
/// Payloads are headerless with a fixed column order; fields deserialize by
/// position. The pair column repeats the archive's own pair symbol and is
/// dropped before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTickRow {
    pub pair: String,
    pub timestamp: String,
    pub bid: String,
    pub ask: String,
}

/// A parsed tick quote in its stored form
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub timestamp: chrono::NaiveDateTime,
    pub bid: BigDecimal,
    pub ask: BigDecimal,
}

impl Tick {
    /// Convert a raw row, normalizing the timestamp and parsing the quotes
    ///
    /// A non-numeric bid or ask is a hard failure; there is no skip path.
    pub fn from_raw(raw: &RawTickRow) -> Result<Self> {
        let timestamp = parse_tick_timestamp(&raw.timestamp)?;

        let bid: BigDecimal = raw
            .bid
            .parse()
            .map_err(|_| ImportError::MalformedRow(format!("invalid bid value '{}'", raw.bid)))?;
        let ask: BigDecimal = raw
            .ask
            .parse()
            .map_err(|_| ImportError::MalformedRow(format!("invalid ask value '{}'", raw.ask)))?;

        Ok(Self { timestamp, bid, ask })
    }
}
