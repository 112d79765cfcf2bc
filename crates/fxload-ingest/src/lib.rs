//! fxload Ingest Library
//!
//! Bulk-loads historical forex tick archives (`PAIR-YYYY-MM.zip`, each
//! containing headerless CSV quote files) into MySQL, one table per
//! pair-month, using batched `INSERT IGNORE` writes.
//!
//! # Pipeline
//!
//! 1. Walk the data root and admit files that look like tick archives
//! 2. Resolve the target table name from the archive filename
//! 3. Ensure the target table exists (schema + indexes)
//! 4. Stream the archive's CSV payloads in bounded batches
//! 5. Insert each batch; duplicate timestamps are silently ignored
//!
//! # Example
//!
//! ```no_run
//! use fxload_ingest::config::ImportConfig;
//! use fxload_ingest::pipeline::ImportPipeline;
//! use fxload_ingest::store::TickStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ImportConfig::default().with_data_dir("./data");
//!     let store = TickStore::connect(&config).await?;
//!     let tables = ImportPipeline::new(config, store).run().await?;
//!     println!("processed {} tables", tables.len());
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod store;
pub mod table_name;
pub mod timestamp;
