//! Dated audit file for a scrape run.

use std::path::{Path, PathBuf};

use time::{Date, OffsetDateTime};

use crate::error::{Result, ScrapeError};
use crate::record::{BookRecord, RECORD_COLUMNS};

/// Today's calendar date, local when the offset can be determined.
///
/// On Unix the local offset is only readable while the process has a single
/// thread, so binaries call this before starting the async runtime. Later
/// calls fall back to UTC.
pub fn run_date() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// `books_YYYY-MM-DD.csv`
pub fn output_file_name(date: Date) -> String {
    format!(
        "books_{:04}-{:02}-{:02}.csv",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Write every record to `dir/books_{date}.csv`, creating `dir` if needed.
/// An existing file for the same date is replaced.
pub fn write_records(dir: &Path, date: Date, records: &[BookRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| ScrapeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(output_file_name(date));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;

    // Written explicitly so an empty run still produces the header row.
    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| ScrapeError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = records.len(), "wrote scrape output");
    Ok(path)
}
