//! Export Module
//!
//! Builds account statements from the loaded analysis with user corrections
//! applied.
//!
//! - `export csv` → statement CSV written locally
//! - `export pdf` / `export server-csv` → rendered by the backend, saved here
//! - Files land in the configured export dir, else the platform data dir

mod csv_export;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

pub use csv_export::write_statement;

use crate::domain::{BalanceSnapshot, Chain, DateRange, Statistics, Transaction};
use crate::error::ExportError;
use crate::infrastructure::gateway::{statement_filename, ExportKind, ExportRequest, ExportedFile};
use crate::store::TransactionStore;

/// Export view of one analysis with the overlay applied
#[derive(Debug, Clone)]
pub struct Statement {
    pub chain: Chain,
    pub address: String,
    pub range: DateRange,
    pub generated_at: DateTime<Local>,
    pub statistics: Statistics,
    pub opening_balance: Option<BalanceSnapshot>,
    pub current_balance: Option<BalanceSnapshot>,
    /// Effective transactions in the table's sort order
    pub transactions: Vec<Transaction>,
}

impl Statement {
    pub fn from_store(store: &TransactionStore) -> Result<Self, ExportError> {
        let analysis = store.analysis().ok_or(ExportError::NothingToExport)?;
        Ok(Self {
            chain: analysis.chain,
            address: analysis.address.clone(),
            range: analysis.range,
            generated_at: Local::now(),
            statistics: store.effective_statistics(),
            opening_balance: store.effective_opening_balance(),
            current_balance: store.effective_balance(),
            transactions: store.sorted_transactions(),
        })
    }

    pub fn filename(&self) -> String {
        statement_filename(self.chain, &self.address, self.range, ExportKind::Csv)
    }

    /// Payload for server-side rendering
    pub fn into_request(self) -> ExportRequest {
        ExportRequest {
            chain: self.chain,
            address: self.address,
            range: self.range,
            transactions: self.transactions,
            opening_balance: self.opening_balance,
            current_balance: self.current_balance,
            statistics: self.statistics,
        }
    }
}

/// Resolve the export directory, creating it if needed
pub fn export_dir(configured: Option<&Path>) -> std::io::Result<PathBuf> {
    let dir = match configured {
        Some(dir) => dir.to_path_buf(),
        None => crate::config::data_dir()
            .map(|dir| dir.join("exports"))
            .unwrap_or_else(|| PathBuf::from(".screener").join("exports")),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write `filename` under `dir` via a temp file; nothing is left behind on failure
fn write_atomic<F>(dir: &Path, filename: &str, write: F) -> Result<PathBuf, ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let target = dir.join(filename);
    let temp = dir.join(format!(".{}.part", filename));

    let outcome = File::create(&temp)
        .map_err(ExportError::from)
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush()?;
            out.get_ref().sync_all()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&temp, &target).map_err(ExportError::from));

    match outcome {
        Ok(()) => Ok(target),
        Err(err) => {
            let _ = fs::remove_file(&temp);
            warn!(file = filename, error = %err, "export write failed");
            Err(err)
        }
    }
}

/// Write the statement CSV locally
pub fn save_local_csv(store: &TransactionStore, dir: &Path) -> Result<PathBuf, ExportError> {
    let statement = Statement::from_store(store)?;
    let filename = statement.filename();
    let path = write_atomic(dir, &filename, |out| {
        write_statement(out, &statement).map(|_| ())
    })?;
    info!(path = %path.display(), rows = statement.transactions.len(), "statement exported");
    Ok(path)
}

/// Save a backend-rendered file
pub fn save_download(dir: &Path, file: &ExportedFile) -> Result<PathBuf, ExportError> {
    let path = write_atomic(dir, &file.filename, |out| {
        out.write_all(&file.bytes)?;
        Ok(())
    })?;
    info!(path = %path.display(), bytes = file.bytes.len(), "download saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("screener-export-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_nothing_to_export() {
        let store = TransactionStore::new();
        let dir = temp_dir("empty");
        assert!(matches!(
            save_local_csv(&store, &dir),
            Err(ExportError::NothingToExport)
        ));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = temp_dir("fail");
        let result = write_atomic(&dir, "out.csv", |out| {
            out.write_all(b"partial")?;
            Err(ExportError::NothingToExport)
        });
        assert!(result.is_err());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_save_download() {
        let dir = temp_dir("download");
        let file = ExportedFile {
            kind: ExportKind::Pdf,
            filename: "statement.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let path = save_download(&dir, &file).unwrap();
        assert_eq!(path, dir.join("statement.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
    }
}
