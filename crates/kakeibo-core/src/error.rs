use chrono::NaiveDate;
use kakeibo_domain::{Category, YearMonth};
use thiserror::Error;

/// Every way a message can fail. The `Display` text is the reply sent back.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown category: [{token}]{}", suggestion_hint(.suggestion))]
    UnknownCategory {
        token: String,
        suggestion: Option<&'static str>,
    },
    #[error("Invalid amount: [{0}]")]
    InvalidAmount(String),
    #[error("Total out of range: [{0}]")]
    TotalOutOfRange(Category),
    #[error("Invalid date: [{0}]")]
    InvalidDate(String),
    #[error("Cannot find the row for {}", slash_date(.0))]
    RowNotFound(NaiveDate),
    #[error("Sheet not found: [{0}]")]
    SheetNotFound(YearMonth),
    #[error("{}", join_lines(.0))]
    Rejected(Vec<CoreError>),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn unknown_category(token: impl Into<String>) -> Self {
        let token = token.into();
        let suggestion = Category::suggest(&token);
        CoreError::UnknownCategory { token, suggestion }
    }
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|label| format!(" (did you mean {label}?)"))
        .unwrap_or_default()
}

fn slash_date(date: &NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

fn join_lines(errors: &[CoreError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
