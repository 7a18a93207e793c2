//! CSV persistence for the odds ledger.
//!
//! Ledger files are UTF-8 with a BOM and a header row, and are rewritten in
//! full on every save (write to a temp file, then rename). A spreadsheet
//! viewer holding the file open surfaces as `PermissionDenied`; reads and
//! writes retry a bounded number of times before giving up.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{OddsRecord, ODDS_FIELDS};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Errors from the ledger store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ledger file does not exist. Callers distinguish this from other
    /// I/O failures: a missing odds ledger aborts a reconciliation run,
    /// while a missing results ledger just means "first run".
    #[error("ledger file not found: {path}")]
    NotFound { path: PathBuf },

    /// The file stayed locked through every retry attempt.
    #[error("ledger file still locked after {attempts} attempts: {path}")]
    Locked { path: PathBuf, attempts: u32 },

    /// Another run holds the advisory lock for this ledger.
    #[error("another run holds the ledger lock: {path}")]
    LockHeld { path: PathBuf },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded ledger: on-disk column order plus typed rows.
#[derive(Debug, Clone, Default)]
pub struct LedgerFile {
    /// Header columns in their on-disk order.
    pub fields: Vec<String>,
    pub rows: Vec<OddsRecord>,
}

impl LedgerFile {
    /// An empty ledger with the standard odds column order.
    #[must_use]
    pub fn empty_odds() -> Self {
        Self {
            fields: ODDS_FIELDS.iter().map(|s| (*s).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends the `match_result` column if it is not present yet.
    ///
    /// Returns true when the column was added.
    pub fn ensure_result_column(&mut self) -> bool {
        if self.fields.iter().any(|f| f == "match_result") {
            return false;
        }
        self.fields.push("match_result".to_string());
        info!("added match_result column to ledger");
        true
    }
}

/// The CSV-backed ledger store with bounded retry on locked files.
#[derive(Debug, Clone)]
pub struct CsvStore {
    max_attempts: u32,
    retry_backoff: Duration,
}

impl Default for CsvStore {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

impl CsvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the retry policy (used by tests to avoid real backoff).
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_backoff = backoff;
        self
    }

    /// Loads a ledger file, preserving its header order.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when the file does not exist; `Locked` when it
    /// stayed locked through all attempts; `Csv`/`Io` otherwise.
    pub fn load(&self, path: &Path) -> Result<LedgerFile, StoreError> {
        let bytes = self.io_with_retry(path, || fs::read(path))?;
        let content = if bytes.starts_with(UTF8_BOM) {
            &bytes[UTF8_BOM.len()..]
        } else {
            &bytes[..]
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content);
        let fields: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut unknown_warned = false;
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = OddsRecord::default();
            for (i, field) in fields.iter().enumerate() {
                let Some(value) = record.get(i) else { continue };
                if !row.set(field, value.to_string()) && !unknown_warned {
                    warn!(column = %field, path = %path.display(), "ignoring unknown ledger column");
                    unknown_warned = true;
                }
            }
            rows.push(row);
        }

        debug!(path = %path.display(), rows = rows.len(), "loaded ledger");
        Ok(LedgerFile { fields, rows })
    }

    /// Rewrites the whole ledger file (BOM + header + rows).
    ///
    /// The content is assembled in memory and swapped into place with a
    /// rename, so readers never observe a half-written file.
    ///
    /// # Errors
    ///
    /// `StoreError::Locked` when the target stayed locked through all
    /// attempts; `Csv`/`Io` otherwise.
    pub fn save(&self, path: &Path, file: &LedgerFile) -> Result<(), StoreError> {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        buf.extend_from_slice(UTF8_BOM);
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            writer.write_record(&file.fields)?;
            for row in &file.rows {
                let values: Vec<&str> = file
                    .fields
                    .iter()
                    .map(|field| row.get(field).unwrap_or(""))
                    .collect();
                writer.write_record(&values)?;
            }
            writer.flush()?;
        }

        let tmp = path.with_extension("csv.tmp");
        self.io_with_retry(path, || {
            fs::write(&tmp, &buf)?;
            fs::rename(&tmp, path)
        })?;

        debug!(path = %path.display(), rows = file.rows.len(), "saved ledger");
        Ok(())
    }

    /// Number of data rows in a ledger file (header excluded); 0 when the
    /// file is missing or unreadable.
    #[must_use]
    pub fn count_records(&self, path: &Path) -> usize {
        match fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count()
                .saturating_sub(1),
            Err(_) => 0,
        }
    }

    /// Runs an I/O operation, retrying on `PermissionDenied` (a concurrently
    /// locked file) with the configured backoff.
    fn io_with_retry<T>(
        &self,
        path: &Path,
        mut op: impl FnMut() -> std::io::Result<T>,
    ) -> Result<T, StoreError> {
        for attempt in 1..=self.max_attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(StoreError::NotFound {
                        path: path.to_path_buf(),
                    })
                }
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    warn!(
                        path = %path.display(),
                        attempt,
                        max_attempts = self.max_attempts,
                        "ledger file locked, backing off"
                    );
                    if attempt < self.max_attempts {
                        std::thread::sleep(self.retry_backoff);
                    }
                }
                Err(e) => return Err(StoreError::Io(e)),
            }
        }
        Err(StoreError::Locked {
            path: path.to_path_buf(),
            attempts: self.max_attempts,
        })
    }
}

/// Advisory lock guarding a ledger path against concurrent runs.
///
/// Two reconciliation runs rewriting the same file would corrupt it; the
/// lock file makes the second run fail fast instead. Released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    lock_path: PathBuf,
}

impl LedgerLock {
    /// Acquires the lock for a ledger path.
    ///
    /// # Errors
    ///
    /// `StoreError::LockHeld` when another run owns the lock.
    pub fn acquire(ledger_path: &Path) -> Result<Self, StoreError> {
        let mut name = ledger_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(".lock");
        let lock_path = ledger_path.with_file_name(name);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let _ = write!(file, "{}", std::process::id());
                debug!(path = %lock_path.display(), "acquired ledger lock");
                Ok(Self { lock_path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::LockHeld {
                path: ledger_path.to_path_buf(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
