//! Target table name resolution
//!
//! Archive filenames encode the pair and period as `PAIR-YYYY-MM.zip`
//! (e.g., `GBPUSD-2024-08.zip`), which maps to the table `GBPUSD_2024_08`.

use fxload_common::{ImportError, Result};

/// Derive the target table identifier from an archive filename
///
/// The stem must contain exactly three dash-separated tokens; each token
/// must be non-empty ASCII-alphanumeric and the year/month tokens all
/// digits. The identifier is later interpolated into SQL statements
/// (identifiers cannot be bound parameters), so this check is also what
/// keeps table names safe to splice. No case or padding normalization is
/// performed.
pub fn resolve_table_name(file_name: &str) -> Result<String> {
    let malformed = || ImportError::MalformedFilename(file_name.to_string());

    let stem = file_name.split('.').next().unwrap_or(file_name);
    let parts: Vec<&str> = stem.split('-').collect();

    let [pair, year, month] = parts.as_slice() else {
        return Err(malformed());
    };

    if !pair.chars().all(|c| c.is_ascii_alphanumeric()) || pair.is_empty() {
        return Err(malformed());
    }
    for token in [year, month] {
        if !token.chars().all(|c| c.is_ascii_digit()) || token.is_empty() {
            return Err(malformed());
        }
    }

    Ok(format!("{}_{}_{}", pair, year, month))
}
