use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use kakeibo_core::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One received request, kept verbatim for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub payload: String,
}

/// Append-only JSON-lines log of incoming requests.
#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(
        &self,
        received_at: DateTime<Utc>,
        user_id: Option<&str>,
        payload: &str,
    ) -> Result<RequestRecord, CoreError> {
        let record = RequestRecord {
            id: Uuid::new_v4(),
            received_at,
            user_id: user_id.map(str::to_string),
            payload: payload.to_string(),
        };
        let line =
            serde_json::to_string(&record).map_err(|err| CoreError::Storage(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(record)
    }

    /// Every record in arrival order; an absent log reads as empty.
    pub fn records(&self) -> Result<Vec<RequestRecord>, CoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        fs::read_to_string(&self.path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|err| CoreError::Storage(err.to_string()))
            })
            .collect()
    }
}
