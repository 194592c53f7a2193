//! Parsed forms of an incoming chat message.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{category::Category, common::YearMonth};

/// A validated instruction: add `amount` (negative to reduce) to `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLine {
    pub category: Category,
    pub amount: i64,
}

impl ItemLine {
    pub fn new(category: Category, amount: i64) -> Self {
        Self { category, amount }
    }
}

impl fmt::Display for ItemLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.amount)
    }
}

/// A message split into its target date and the raw item lines still pending
/// validation. Lives only for the duration of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub date: NaiveDate,
    pub explicit_date: bool,
    pub lines: Vec<String>,
}

impl Command {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
