//! Tick timestamp normalization
//!
//! Source files carry timestamps as `YYYYMMDD HH:MM:SS` with an optional
//! fractional-second suffix of arbitrary length (e.g.,
//! `20240801 00:00:00.1105`).

use chrono::NaiveDateTime;
use fxload_common::{ImportError, Result};

const FRACTIONAL_FORMAT: &str = "%Y%m%d %H:%M:%S%.f";
const WHOLE_SECOND_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Storage literal format, truncated to milliseconds
const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Parse a tick timestamp, fractional-seconds form first
///
/// Falls back to the whole-second form when no fraction is present.
pub fn parse_tick_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, FRACTIONAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, WHOLE_SECOND_FORMAT))
        .map_err(|_| ImportError::UnparseableTimestamp(raw.to_string()))
}

/// Render a timestamp as the store's accepted literal
///
/// The fraction is truncated (not rounded) to exactly three digits. This is
/// deliberately lossy: the parser accepts finer-than-millisecond input, but
/// storage keeps millisecond precision only, so `00:00:00.1105` is stored as
/// `00:00:00.110`.
pub fn format_store_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(STORE_FORMAT).to_string()
}
