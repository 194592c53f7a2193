use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use kakeibo_domain::{CellRef, Worksheet, YearMonth};

use crate::CoreError;

/// Cell-level access to one monthly grid.
pub trait Sheet {
    /// Raw formula or literal stored in the cell; empty cells read as `""`.
    fn cell(&self, at: CellRef) -> String;
    fn set_cell(&mut self, at: CellRef, content: String);
    /// The value a reader of the grid would see.
    fn display_value(&self, at: CellRef) -> String;
}

impl Sheet for Worksheet {
    fn cell(&self, at: CellRef) -> String {
        Worksheet::cell(self, at).to_string()
    }

    fn set_cell(&mut self, at: CellRef, content: String) {
        Worksheet::set_cell(self, at, content)
    }

    fn display_value(&self, at: CellRef) -> String {
        Worksheet::display_value(self, at)
    }
}

/// Abstraction over persistence backends holding one grid per month.
///
/// Stores never create grids implicitly: `open_month` returns `None` for a
/// month nobody provisioned.
pub trait LedgerStore: Send + Sync {
    fn open_month(&self, month: YearMonth) -> Result<Option<Worksheet>, CoreError>;
    fn save_month(&self, month: YearMonth, sheet: &Worksheet) -> Result<(), CoreError>;
}

/// Volatile store, handy for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    months: Mutex<HashMap<YearMonth, Worksheet>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a freshly provisioned grid for `month`.
    pub fn provision(&self, month: YearMonth, budget: i64) {
        self.months
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(month, Worksheet::provisioned(month, budget));
    }

    pub fn snapshot(&self, month: YearMonth) -> Option<Worksheet> {
        self.months
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&month)
            .cloned()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn open_month(&self, month: YearMonth) -> Result<Option<Worksheet>, CoreError> {
        Ok(self.snapshot(month))
    }

    fn save_month(&self, month: YearMonth, sheet: &Worksheet) -> Result<(), CoreError> {
        self.months
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(month, sheet.clone());
        Ok(())
    }
}
