//! MySQL store writer
//!
//! Owns the connection pool and the two write operations the pipeline
//! needs: idempotent table creation and batched `INSERT IGNORE`. Rows with a
//! timestamp already present in the table are silently skipped, never
//! overwritten, which is what makes whole-job reruns safe.

use std::time::Duration;

use fxload_common::{ImportError, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, QueryBuilder};
use tracing::{debug, info};

use crate::config::ImportConfig;
use crate::models::Tick;
use crate::timestamp::format_store_timestamp;

/// MySQL caps prepared-statement parameters at 65,535 (ER_PS_MANY_PARAM)
const MYSQL_MAX_PLACEHOLDERS: usize = 65_535;

/// Columns bound per tick row: timestamp, bid, ask
const COLUMNS_PER_ROW: usize = 3;

/// Most rows one INSERT statement can carry without tripping the
/// placeholder cap
const MAX_ROWS_PER_STATEMENT: usize = MYSQL_MAX_PLACEHOLDERS / COLUMNS_PER_ROW;

/// Writer for per-pair-month tick tables
#[derive(Debug, Clone)]
pub struct TickStore {
    pool: MySqlPool,
}

impl TickStore {
    /// Connect to the server, create the database if absent, and return a
    /// store bound to it
    pub async fn connect(config: &ImportConfig) -> Result<Self> {
        if !is_safe_identifier(&config.database) {
            return Err(ImportError::connection(format!(
                "invalid database name '{}'",
                config.database
            )));
        }

        // Bootstrap connection with no database selected, so the target
        // database can be created on first run.
        let bootstrap = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.server_url())
            .await
            .map_err(ImportError::connection)?;

        sqlx::query(&format!("CREATE DATABASE IF NOT EXISTS {}", config.database))
            .execute(&bootstrap)
            .await
            .map_err(|e| ImportError::write(&config.database, e))?;
        bootstrap.close().await;

        // One connection would do for the strictly sequential writer; a
        // spare keeps pool acquisition off the critical path.
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url())
            .await
            .map_err(ImportError::connection)?;

        info!(database = %config.database, host = %config.host, "Connected to MySQL");
        Ok(Self { pool })
    }

    /// Access the underlying pool (used by integration tests)
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Idempotently create the target table with its schema and indexes
    pub async fn ensure_table(&self, table: &str) -> Result<()> {
        sqlx::query(&create_table_sql(table))
            .execute(&self.pool)
            .await
            .map_err(|e| ImportError::write(table, e))?;
        debug!(table = %table, "Ensured target table");
        Ok(())
    }

    /// Insert a batch of ticks with `INSERT IGNORE` semantics
    ///
    /// A batch can be larger than one prepared statement may carry (the
    /// placeholder cap allows 21,845 rows per statement), so the batch is
    /// split into bounded sub-inserts wrapped in one transaction: the whole
    /// batch commits or none of it does. Duplicate timestamps are no-ops.
    /// Returns the number of rows actually inserted.
    pub async fn insert_batch(&self, table: &str, ticks: &[Tick]) -> Result<u64> {
        if ticks.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ImportError::write(table, e))?;

        let mut inserted = 0u64;
        for chunk in ticks.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder = insert_statement(table, chunk);
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| ImportError::write(table, e))?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| ImportError::write(table, e))?;
        Ok(inserted)
    }
}

/// Build one multi-row `INSERT IGNORE` statement
///
/// Callers must keep `ticks` within `MAX_ROWS_PER_STATEMENT`.
fn insert_statement<'a>(table: &str, ticks: &'a [Tick]) -> QueryBuilder<'a, MySql> {
    let mut builder = QueryBuilder::<MySql>::new(format!(
        "INSERT IGNORE INTO {} (timestamp, bid, ask) ",
        table
    ));
    builder.push_values(ticks, |mut row, tick| {
        row.push_bind(format_store_timestamp(&tick.timestamp))
            .push_bind(&tick.bid)
            .push_bind(&tick.ask);
    });
    builder
}

/// DDL for a pair-month tick table
///
/// `DATETIME(6)` matches the historical layout even though stored literals
/// carry three fractional digits; the timestamp index duplicates the primary
/// key but stays explicit for compatibility with existing tables.
fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {} (
    timestamp DATETIME(6) NOT NULL,
    bid DECIMAL(10, 5) NOT NULL,
    ask DECIMAL(10, 5) NOT NULL,
    PRIMARY KEY (timestamp),
    INDEX idx_bid (bid),
    INDEX idx_ask (ask),
    INDEX idx_timestamp (timestamp)
)"#,
        table
    )
}

/// Whether a name is safe to splice into SQL as an identifier
fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql_shape() {
        let sql = create_table_sql("EURUSD_2024_08");
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS EURUSD_2024_08"));
        assert!(sql.contains("timestamp DATETIME(6) NOT NULL"));
        assert!(sql.contains("bid DECIMAL(10, 5) NOT NULL"));
        assert!(sql.contains("ask DECIMAL(10, 5) NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (timestamp)"));
        assert!(sql.contains("INDEX idx_bid (bid)"));
        assert!(sql.contains("INDEX idx_ask (ask)"));
        assert!(sql.contains("INDEX idx_timestamp (timestamp)"));
    }

    #[test]
    fn test_default_batch_splits_within_placeholder_limit() {
        use crate::config::DEFAULT_BATCH_SIZE;
        use crate::timestamp::parse_tick_timestamp;

        // Every sub-statement of a default-sized batch must stay under the
        // prepared-statement parameter cap
        assert!(MAX_ROWS_PER_STATEMENT * COLUMNS_PER_ROW <= MYSQL_MAX_PLACEHOLDERS);
        assert!(DEFAULT_BATCH_SIZE > MAX_ROWS_PER_STATEMENT);

        let tick = Tick {
            timestamp: parse_tick_timestamp("20240801 00:00:00.110").unwrap(),
            bid: "1.08423".parse().unwrap(),
            ask: "1.08431".parse().unwrap(),
        };
        let batch = vec![tick; DEFAULT_BATCH_SIZE];

        for chunk in batch.chunks(MAX_ROWS_PER_STATEMENT) {
            assert!(chunk.len() * COLUMNS_PER_ROW <= MYSQL_MAX_PLACEHOLDERS);
        }

        // The largest chunk renders exactly at the cap, never over it
        let largest = &batch[..MAX_ROWS_PER_STATEMENT];
        let mut builder = insert_statement("EURUSD_2024_08", largest);
        let placeholders = builder.sql().matches('?').count();
        assert_eq!(placeholders, MAX_ROWS_PER_STATEMENT * COLUMNS_PER_ROW);
        assert!(placeholders <= MYSQL_MAX_PLACEHOLDERS);
    }

    #[test]
    fn test_insert_statement_shape() {
        use crate::timestamp::parse_tick_timestamp;

        let tick = Tick {
            timestamp: parse_tick_timestamp("20240801 00:00:00.110").unwrap(),
            bid: "1.08423".parse().unwrap(),
            ask: "1.08431".parse().unwrap(),
        };
        let ticks = vec![tick.clone(), tick];

        let mut builder = insert_statement("EURUSD_2024_08", &ticks);
        let sql = builder.sql();
        assert!(sql.starts_with("INSERT IGNORE INTO EURUSD_2024_08 (timestamp, bid, ask) VALUES"));
        assert_eq!(sql.matches('?').count(), 6);
    }

    #[test]
    fn test_safe_identifiers() {
        assert!(is_safe_identifier("forex_data"));
        assert!(is_safe_identifier("EURUSD_2024_08"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("forex-data"));
        assert!(!is_safe_identifier("x; DROP TABLE y"));
    }
}
