//! Append-only CSV storage for contact records
//!
//! The file carries a fixed header row followed by one record per line.
//! All file access runs on the blocking pool; callers stay async.

use super::record::{ContactRecord, CSV_HEADER};
use crate::error::{ContactError, Result};
use crate::logger;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handle to the contacts file
///
/// Cheap to clone. Appends are not synchronized here; route them through
/// [`super::writer`] so only one task ever writes.
#[derive(Debug, Clone)]
pub struct ContactStore {
    path: Arc<PathBuf>,
}

impl ContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the file exists and starts with the header row
    ///
    /// Idempotent. Returns `true` when the header had to be written.
    pub async fn init(&self) -> Result<bool> {
        let path = Arc::clone(&self.path);
        let created = run_blocking(move || ensure_header(&path)).await?;
        if created {
            logger::log_storage_created(&self.path);
        }
        Ok(created)
    }

    /// Append one record as a single CSV row
    pub async fn append(&self, record: ContactRecord) -> Result<()> {
        let path = Arc::clone(&self.path);
        run_blocking(move || append_record(&path, &record)).await
    }

    /// Read every record after the header, in file order
    ///
    /// Never writes; a missing file reads as empty.
    pub async fn list(&self) -> Result<Vec<ContactRecord>> {
        let path = Arc::clone(&self.path);
        run_blocking(move || read_records(&path)).await
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ContactError::Storage(io::Error::other(e)))?
}

/// Create the file with a header, or add the header to an empty file
fn ensure_header(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }
        Err(e) => return Err(e.into()),
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv_writer(file);
    writer.write_record(CSV_HEADER)?;
    writer.flush()?;
    Ok(true)
}

fn append_record(path: &Path, record: &ContactRecord) -> Result<()> {
    // recreate the header if the file vanished while running
    ensure_header(path)?;

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv_writer(file);
    writer.write_record(record.as_row())?;
    writer.flush()?;
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<ContactRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        records.push(ContactRecord::from_fields(row.iter()));
    }
    Ok(records)
}

fn csv_writer(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(file)
}
