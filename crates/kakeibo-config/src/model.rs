use serde::{
    de::{self, Deserializer},
    Deserialize, Serialize,
};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::ConfigError;

const APP_DIR: &str = "kakeibo";

/// Settings for the ledger bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding monthly sheets, backups and the request log.
    /// Defaults to `<data dir>/kakeibo`.
    pub ledger_root: Option<PathBuf>,

    /// Chat user ids allowed to post. Everyone else is answered `unauthorized`.
    #[serde(default)]
    pub authorized_users: Vec<String>,

    #[serde(default)]
    pub batch_mode: BatchMode,

    /// Offset of the bot's local time from UTC, used for "today".
    #[serde(default = "Config::default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Budget written into newly provisioned months.
    #[serde(default)]
    pub monthly_budget: i64,

    #[serde(default = "Config::default_request_log")]
    pub request_log: bool,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_root: None,
            authorized_users: Vec::new(),
            batch_mode: BatchMode::default(),
            utc_offset_hours: Self::default_utc_offset_hours(),
            monthly_budget: 0,
            request_log: Self::default_request_log(),
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    pub fn default_utc_offset_hours() -> i32 {
        9
    }

    pub fn default_request_log() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_ledger_root(&self) -> PathBuf {
        if let Some(path) = &self.ledger_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(APP_DIR)
    }

    pub fn is_authorized(&self, user_id: &str) -> bool {
        self.authorized_users.iter().any(|allowed| allowed == user_id)
    }

    /// Rejects values that cannot be used as-is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(ConfigError::Invalid {
                field: "utc_offset_hours",
                message: format!("{} is not between -23 and 23", self.utc_offset_hours),
            });
        }
        if self.backup_retention == 0 {
            return Err(ConfigError::Invalid {
                field: "backup_retention",
                message: "must keep at least one backup".into(),
            });
        }
        Ok(())
    }
}

/// How a multi-line message reacts to an invalid line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// Reject the whole message when any line is invalid.
    #[default]
    ValidateFirst,
    /// Apply lines until the first invalid one.
    Eager,
}

impl FromStr for BatchMode {
    type Err = ConfigError;

    /// Case-insensitive; anything but the two mode names is rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "validate-first" => Ok(BatchMode::ValidateFirst),
            "eager" => Ok(BatchMode::Eager),
            other => Err(ConfigError::Invalid {
                field: "batch_mode",
                message: format!("unknown mode `{other}`, expected `validate-first` or `eager`"),
            }),
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchMode::ValidateFirst => "validate-first",
            BatchMode::Eager => "eager",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for BatchMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) => value.parse().map_err(de::Error::custom),
            None => Ok(BatchMode::default()),
        }
    }
}
