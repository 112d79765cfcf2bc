//! Import pipeline: archive discovery and per-archive orchestration
//!
//! Walks the data root, admits files that look like tick archives, and runs
//! the full load for each one sequentially: resolve table name, ensure the
//! table, then read and insert batches. Any failure aborts the whole run;
//! batches committed before the failure stay committed.

use std::path::{Path, PathBuf};

use fxload_common::{ImportError, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::ImportConfig;
use crate::reader::ArchiveReader;
use crate::store::TickStore;
use crate::table_name::resolve_table_name;

/// Currency codes used by the admission filter
pub const CURRENCY_CODES: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "NZD"];

/// File extension of tick archives
const ARCHIVE_EXTENSION: &str = ".zip";

/// Whether a filename is admitted as a tick archive
///
/// Heuristic, not a validated pair registry: the name must end in `.zip`
/// and contain at least one known currency code as a substring. A stray
/// token containing "USD" passes this gate and is only caught by table name
/// resolution one step later.
pub fn is_eligible(file_name: &str) -> bool {
    file_name.ends_with(ARCHIVE_EXTENSION)
        && CURRENCY_CODES.iter().any(|code| file_name.contains(code))
}

/// Recursively collect eligible archives under the data root
///
/// Entries are visited in filename order so runs are deterministic.
pub fn discover_archives(root: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ImportError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_eligible(&entry.file_name().to_string_lossy()) {
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}

/// Forex tick import pipeline
pub struct ImportPipeline {
    config: ImportConfig,
    store: TickStore,
    reader: ArchiveReader,
}

impl ImportPipeline {
    /// Create a pipeline over a connected store
    pub fn new(config: ImportConfig, store: TickStore) -> Self {
        let reader = ArchiveReader::new(config.batch_size);
        Self {
            config,
            store,
            reader,
        }
    }

    /// Run the full import
    ///
    /// Processes every eligible archive sequentially and returns the table
    /// identifiers that were loaded, in processing order.
    pub async fn run(&self) -> Result<Vec<String>> {
        info!(data_dir = %self.config.data_dir.display(), "Starting forex tick import");

        let archives = discover_archives(&self.config.data_dir)?;
        info!(archives = archives.len(), "Discovered tick archives");

        let mut processed = Vec::with_capacity(archives.len());
        for archive in &archives {
            let table = self.process_archive(archive).await?;
            processed.push(table);
        }

        info!(tables = processed.len(), "Import complete");
        Ok(processed)
    }

    /// Load a single archive into its target table
    async fn process_archive(&self, archive_path: &Path) -> Result<String> {
        let file_name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = resolve_table_name(&file_name)?;

        info!(archive = %archive_path.display(), table = %table, "Processing archive");
        self.store.ensure_table(&table).await?;

        let mut total_inserted = 0u64;
        for (entry_name, payload) in self.reader.csv_payloads(archive_path)? {
            debug!(entry = %entry_name, "Reading quote payload");
            for batch in self.reader.batches(payload) {
                let batch = batch?;
                let inserted = self.store.insert_batch(&table, &batch).await?;
                total_inserted += inserted;
                info!(
                    table = %table,
                    rows = batch.len(),
                    inserted,
                    "Inserted batch"
                );
            }
        }

        info!(table = %table, inserted = total_inserted, "Finished processing archive");
        Ok(table)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_filter() {
        assert!(is_eligible("EURJPY-2024-08.zip"));
        assert!(is_eligible("AUDNZD-2024-09.zip"));
        // False positive by design: "USD" substring is enough
        assert!(is_eligible("notes-about-USD.zip"));

        assert!(!is_eligible("readme.zip"));
        assert!(!is_eligible("EURJPY-2024-08.csv"));
        assert!(!is_eligible("EURJPY-2024-08"));
        // Case-sensitive, like the corpus naming convention
        assert!(!is_eligible("eurjpy-2024-08.zip"));
    }

    #[test]
    fn test_discover_archives_walks_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        let month_dir = root.path().join("Aug2024");
        std::fs::create_dir_all(&month_dir).unwrap();

        std::fs::write(month_dir.join("EURUSD-2024-08.zip"), b"").unwrap();
        std::fs::write(month_dir.join("AUDJPY-2024-08.zip"), b"").unwrap();
        std::fs::write(month_dir.join("readme.zip"), b"").unwrap();
        std::fs::write(root.path().join("notes.txt"), b"").unwrap();

        let archives = discover_archives(root.path()).unwrap();
        let names: Vec<_> = archives
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["AUDJPY-2024-08.zip", "EURUSD-2024-08.zip"]);
    }

    #[test]
    fn test_discover_archives_missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert!(matches!(
            discover_archives(&missing),
            Err(ImportError::Io(_))
        ));
    }
}
