//! Row batch reader for tick archives
//!
//! Each archive is a zip container holding one or more headerless CSV
//! payloads with a fixed four-column order: pair, timestamp, bid, ask.
//! Payloads are decompressed fully in memory and then streamed out as
//! bounded-size batches of parsed ticks.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use fxload_common::{ImportError, Result};
use tracing::debug;

use crate::config::DEFAULT_BATCH_SIZE;
use crate::models::{RawTickRow, Tick};

/// File extension of quote payloads inside an archive
const QUOTE_EXTENSION: &str = ".csv";

/// Reads tick archives in bounded batches
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    batch_size: usize,
}

impl Default for ArchiveReader {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl ArchiveReader {
    /// Create a reader with the given rows-per-batch bound
    pub fn new(batch_size: usize) -> Self {
        // A zero bound would make the batch iterator spin forever
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Decompress every `.csv` entry of the archive into memory
    ///
    /// Returns (entry name, payload bytes) pairs; entries with any other
    /// extension are skipped.
    pub fn csv_payloads(&self, archive_path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
        let file = File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ImportError::archive(archive_path.display(), e))?;

        let mut payloads = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| ImportError::archive(archive_path.display(), e))?;

            if !entry.is_file() || !entry.name().ends_with(QUOTE_EXTENSION) {
                continue;
            }

            let name = entry.name().to_string();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            debug!(entry = %name, bytes = contents.len(), "Decompressed archive entry");
            payloads.push((name, contents));
        }

        Ok(payloads)
    }

    /// Stream a payload as a lazy, single-pass sequence of tick batches
    pub fn batches(&self, payload: Vec<u8>) -> TickBatches {
        let rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(Cursor::new(payload))
            .into_deserialize();

        TickBatches {
            rows,
            batch_size: self.batch_size,
            poisoned: false,
        }
    }
}

/// Iterator over bounded batches of parsed ticks
///
/// The first row-level failure surfaces as an `Err` item and ends iteration;
/// there is no partial-batch recovery.
pub struct TickBatches {
    rows: csv::DeserializeRecordsIntoIter<Cursor<Vec<u8>>, RawTickRow>,
    batch_size: usize,
    poisoned: bool,
}

impl Iterator for TickBatches {
    type Item = Result<Vec<Tick>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size.min(1024));
        while batch.len() < self.batch_size {
            match self.rows.next() {
                None => break,
                Some(Ok(raw)) => match Tick::from_raw(&raw) {
                    Ok(tick) => batch.push(tick),
                    Err(e) => {
                        self.poisoned = true;
                        return Some(Err(e));
                    },
                },
                Some(Err(e)) => {
                    self.poisoned = true;
                    return Some(Err(ImportError::MalformedRow(e.to_string())));
                },
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_ROWS: &str = "EURUSD,20240801 00:00:00.110,1.08423,1.08431\n\
                            EURUSD,20240801 00:00:00.500,1.08420,1.08429\n";

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_csv_payloads_skips_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EURUSD-2024-08.zip");
        std::fs::write(
            &path,
            zip_bytes(&[("EURUSD-2024-08.csv", TWO_ROWS), ("README.txt", "notes")]),
        )
        .unwrap();

        let payloads = ArchiveReader::default().csv_payloads(&path).unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].0, "EURUSD-2024-08.csv");
        assert_eq!(payloads[0].1, TWO_ROWS.as_bytes());
    }

    #[test]
    fn test_csv_payloads_rejects_non_zip_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EURUSD-2024-08.zip");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        let err = ArchiveReader::default().csv_payloads(&path).unwrap_err();
        assert!(matches!(err, ImportError::Archive(_)));
    }

    #[test]
    fn test_single_batch_drops_pair_column() {
        let reader = ArchiveReader::default();
        let mut batches = reader.batches(TWO_ROWS.as_bytes().to_vec());

        let batch = batches.next().unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch[0].bid,
            "1.08423".parse::<sqlx::types::BigDecimal>().unwrap()
        );
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_batches_are_bounded() {
        let reader = ArchiveReader::new(1);
        let batches: Vec<_> = reader
            .batches(TWO_ROWS.as_bytes().to_vec())
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn test_row_failure_poisons_the_iterator() {
        let payload = "EURUSD,20240801 00:00:00.110,1.08423,1.08431\n\
                       EURUSD,20240801 00:00:00.500,bogus,1.08429\n\
                       EURUSD,20240801 00:00:01.000,1.08418,1.08427\n";

        let reader = ArchiveReader::new(1);
        let mut batches = reader.batches(payload.as_bytes().to_vec());

        assert!(batches.next().unwrap().is_ok());
        assert!(matches!(
            batches.next().unwrap().unwrap_err(),
            ImportError::MalformedRow(_)
        ));
        // Later rows are never reached
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_wrong_column_count_is_malformed() {
        let reader = ArchiveReader::default();
        let mut batches = reader.batches(b"EURUSD,20240801 00:00:00.110,1.08423\n".to_vec());

        assert!(matches!(
            batches.next().unwrap().unwrap_err(),
            ImportError::MalformedRow(_)
        ));
    }

    #[test]
    fn test_empty_payload_yields_no_batches() {
        let reader = ArchiveReader::default();
        assert!(reader.batches(Vec::new()).next().is_none());
    }
}
