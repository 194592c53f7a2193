//! kakeibo-storage-json
//!
//! Filesystem-backed monthly worksheets (one JSON file per month) and the
//! append-only request log.

mod request_log;

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use kakeibo_core::{CoreError, LedgerStore};
use kakeibo_domain::{Worksheet, YearMonth, MAX_CELL_TOTAL};
use tracing::{debug, info};

pub use request_log::{RequestLog, RequestRecord};

const SHEET_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;
const SHEETS_DIR: &str = "sheets";
const BACKUPS_DIR: &str = "backups";
const REQUEST_LOG_FILE: &str = "requests.jsonl";

/// Directory layout under a ledger root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub sheets_root: PathBuf,
    pub backup_root: PathBuf,
    pub request_log: PathBuf,
}

impl StoragePaths {
    pub fn under(root: &Path) -> Self {
        Self {
            sheets_root: root.join(SHEETS_DIR),
            backup_root: root.join(BACKUPS_DIR),
            request_log: root.join(REQUEST_LOG_FILE),
        }
    }
}

/// Monthly worksheets persisted as pretty JSON, with a rolling set of
/// backups taken before every overwrite.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.sheets_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn request_log(&self) -> RequestLog {
        RequestLog::new(self.paths.request_log.clone())
    }

    pub fn sheet_path(&self, month: YearMonth) -> PathBuf {
        self.paths
            .sheets_root
            .join(format!("{}.{}", month, SHEET_EXTENSION))
    }

    fn backup_dir(&self, month: YearMonth) -> PathBuf {
        self.paths.backup_root.join(month.to_string())
    }

    /// Creates the grid for `month`. Existing months are never overwritten.
    pub fn provision_month(&self, month: YearMonth, budget: i64) -> Result<Worksheet, CoreError> {
        if !(-MAX_CELL_TOTAL..=MAX_CELL_TOTAL).contains(&budget) {
            return Err(CoreError::InvalidAmount(budget.to_string()));
        }
        let path = self.sheet_path(month);
        if path.exists() {
            return Err(CoreError::Storage(format!("sheet {month} already exists")));
        }
        let sheet = Worksheet::provisioned(month, budget);
        save_sheet_to_path(&sheet, &path)?;
        info!(%month, budget, "provisioned month");
        Ok(sheet)
    }

    /// Months with a grid on disk, oldest first.
    pub fn list_months(&self) -> Result<Vec<YearMonth>, CoreError> {
        let mut months = Vec::new();
        for entry in fs::read_dir(&self.paths.sheets_root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(SHEET_EXTENSION) {
                continue;
            }
            if let Some(month) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<YearMonth>().ok())
            {
                months.push(month);
            }
        }
        months.sort();
        Ok(months)
    }

    /// Backup file names for `month`, newest first.
    pub fn list_backups(&self, month: YearMonth) -> Result<Vec<PathBuf>, CoreError> {
        let dir = self.backup_dir(month);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(SHEET_EXTENSION) {
                entries.push(path);
            }
        }
        // Names embed a fixed-width timestamp, so lexical order is age order.
        entries.sort_by_key(|path| Reverse(path.file_name().map(|name| name.to_os_string())));
        Ok(entries)
    }

    fn backup_existing_file(&self, month: YearMonth, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(month);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_path = dir.join(format!("{}_{}.{}", month, timestamp, SHEET_EXTENSION));
        fs::copy(path, &backup_path)?;
        debug!(%month, backup = %backup_path.display(), "backed up sheet");
        self.prune_backups(month)
    }

    fn prune_backups(&self, month: YearMonth) -> Result<(), CoreError> {
        for stale in self.list_backups(month)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }
}

impl LedgerStore for JsonLedgerStorage {
    fn open_month(&self, month: YearMonth) -> Result<Option<Worksheet>, CoreError> {
        let path = self.sheet_path(month);
        if !path.exists() {
            return Ok(None);
        }
        load_sheet_from_path(&path).map(Some)
    }

    fn save_month(&self, month: YearMonth, sheet: &Worksheet) -> Result<(), CoreError> {
        let path = self.sheet_path(month);
        self.backup_existing_file(month, &path)?;
        save_sheet_to_path(sheet, &path)
    }
}

/// Saves a worksheet to an arbitrary path on disk.
pub fn save_sheet_to_path(sheet: &Worksheet, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json =
        serde_json::to_string_pretty(sheet).map_err(|err| CoreError::Storage(err.to_string()))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a worksheet from the provided filesystem path.
pub fn load_sheet_from_path(path: &Path) -> Result<Worksheet, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|err| CoreError::Storage(format!("{}: {}", path.display(), err)))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
