use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use promoter_core::Ledger;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Header written once, when the ledger file is created.
pub const LEDGER_HEADER: [&str; 2] = ["Promotion", "URL"];

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// One persisted promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub promotion: String,
    pub url: String,
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Every data row of the ledger file. A missing file has no rows.
/// Rows with fewer than two fields are skipped.
pub fn read_rows(path: &Path) -> Result<Vec<LedgerRow>, PersistError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    // Sanitized fields never contain quotes, so the writer never emits an
    // escape; reading without one keeps literal backslashes in URLs.
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .double_quote(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let (Some(promotion), Some(url)) = (record.get(0), record.get(1)) {
            rows.push(LedgerRow {
                promotion: promotion.to_string(),
                url: url.to_string(),
            });
        }
    }
    Ok(rows)
}

/// Rebuild the ledger from the URL column of the file at `path`.
pub fn load_ledger(path: &Path) -> Result<Ledger, PersistError> {
    let rows = read_rows(path)?;
    Ok(Ledger::from_urls(rows.iter().map(|row| row.url.as_str())))
}

/// Where promotion rows go. [`LedgerWriter`] is the file-backed one.
pub trait RowSink {
    /// Persist one row. An error means the row may not be stored.
    fn append(&mut self, promotion: &str, url: &str) -> Result<(), PersistError>;
}

/// Append-only writer for the ledger file. Each row is flushed and synced
/// before [`LedgerWriter::append`] returns.
pub struct LedgerWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl LedgerWriter {
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_output_dir(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .double_quote(false)
            .escape(b'\\')
            .from_writer(file);
        if is_new {
            writer.write_record(LEDGER_HEADER)?;
            writer.flush()?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, promotion: &str, url: &str) -> Result<(), PersistError> {
        self.writer.write_record([promotion, url])?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}

impl RowSink for LedgerWriter {
    fn append(&mut self, promotion: &str, url: &str) -> Result<(), PersistError> {
        LedgerWriter::append(self, promotion, url)
    }
}
