//! Monthly worksheet layout and the in-memory worksheet model.

use std::{cell::RefCell, collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    category::Category,
    common::{CellRef, YearMonth},
    formula::{evaluate, FormulaError},
};

/// Column B carries the `MM月DD日` label of each day row.
pub const DAY_LABEL_COLUMN: u32 = 2;
pub const FIRST_DAY_ROW: u32 = 3;
/// Rows reserved for calendar days; wide enough for a 31-day month.
pub const DAY_ROW_WINDOW: u32 = 31;
pub const LAST_DAY_ROW: u32 = FIRST_DAY_ROW + DAY_ROW_WINDOW - 1;
pub const FIRST_CATEGORY_COLUMN: u32 = 3;
/// Per-day and grand total column (L).
pub const TOTAL_COLUMN: u32 = FIRST_CATEGORY_COLUMN + Category::COUNT as u32;
/// Monthly totals per category.
pub const TOTALS_ROW: u32 = 34;
pub const HEADER_ROW: u32 = 2;
pub const BUDGET_CELL: CellRef = CellRef::new(21, 16);
pub const REMAINING_CELL: CellRef = CellRef::new(22, 16);
/// Value of a category cell nothing has been posted to yet.
pub const ZERO_SENTINEL: &str = "=0";
/// Largest magnitude a single posted amount may have.
pub const MAX_ITEM_AMOUNT: i64 = 999_999_999_999;
/// Largest magnitude a category cell, or the budget, may reach. Every total
/// the grid derives from such cells stays within `i64`.
pub const MAX_CELL_TOTAL: i64 = 999_999_999_999_999;

const ERROR_DISPLAY: &str = "#ERROR!";
const REF_DISPLAY: &str = "#REF!";

/// Text shown in the day label column for `date`.
pub fn day_label(date: NaiveDate) -> String {
    format!("{:02}月{:02}日", date.month(), date.day())
}

pub fn monthly_total_cell(category: Category) -> CellRef {
    CellRef::new(TOTALS_ROW, category.column())
}

pub fn grand_total_cell() -> CellRef {
    CellRef::new(TOTALS_ROW, TOTAL_COLUMN)
}

/// A sparse grid of cells; each cell holds a formula (`=...`) or literal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    pub name: String,
    #[serde(default)]
    cells: BTreeMap<CellRef, String>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Builds the empty grid for `month`: day labels, zeroed category cells,
    /// per-day and per-category totals, and the remaining balance against
    /// `budget`.
    pub fn provisioned(month: YearMonth, budget: i64) -> Self {
        let mut sheet = Self::new(month.to_string());
        sheet.set_cell(CellRef::new(1, DAY_LABEL_COLUMN), month.slash_label());
        sheet.set_cell(CellRef::new(HEADER_ROW, DAY_LABEL_COLUMN), "日付".to_string());
        for category in Category::ALL {
            sheet.set_cell(
                CellRef::new(HEADER_ROW, category.column()),
                category.label().to_string(),
            );
        }
        sheet.set_cell(CellRef::new(HEADER_ROW, TOTAL_COLUMN), "合計".to_string());

        let first = column_name(FIRST_CATEGORY_COLUMN);
        let last = column_name(TOTAL_COLUMN - 1);
        for (offset, date) in month.dates().enumerate() {
            let row = FIRST_DAY_ROW + offset as u32;
            sheet.set_cell(CellRef::new(row, DAY_LABEL_COLUMN), day_label(date));
            for category in Category::ALL {
                sheet.set_cell(CellRef::new(row, category.column()), ZERO_SENTINEL.to_string());
            }
            sheet.set_cell(
                CellRef::new(row, TOTAL_COLUMN),
                format!("=SUM({first}{row}:{last}{row})"),
            );
        }

        sheet.set_cell(CellRef::new(TOTALS_ROW, DAY_LABEL_COLUMN), "合計".to_string());
        for col in FIRST_CATEGORY_COLUMN..=TOTAL_COLUMN {
            let name = column_name(col);
            let formula = if col == TOTAL_COLUMN {
                format!("=SUM({first}{TOTALS_ROW}:{last}{TOTALS_ROW})")
            } else {
                format!("=SUM({name}{FIRST_DAY_ROW}:{name}{LAST_DAY_ROW})")
            };
            sheet.set_cell(CellRef::new(TOTALS_ROW, col), formula);
        }

        let label_col = BUDGET_CELL.col - 1;
        sheet.set_cell(CellRef::new(BUDGET_CELL.row, label_col), "予算".to_string());
        sheet.set_cell(BUDGET_CELL, format!("={budget}"));
        sheet.set_cell(CellRef::new(REMAINING_CELL.row, label_col), "今月の残金".to_string());
        sheet.set_cell(
            REMAINING_CELL,
            format!("={}-{}", BUDGET_CELL, grand_total_cell()),
        );
        sheet
    }

    /// Raw content of a cell; empty cells read as `""`.
    pub fn cell(&self, at: CellRef) -> &str {
        self.cells.get(&at).map(String::as_str).unwrap_or("")
    }

    /// Replaces a cell's content. Writing an empty string clears the cell.
    pub fn set_cell(&mut self, at: CellRef, content: String) {
        if content.is_empty() {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, content);
        }
    }

    /// What a spreadsheet would show: evaluated formulas, literal text as-is.
    pub fn display_value(&self, at: CellRef) -> String {
        let content = self.cell(at);
        if !content.starts_with('=') {
            return content.to_string();
        }
        let visiting = RefCell::new(Vec::new());
        match self.numeric_value(at, &visiting) {
            Ok(Some(value)) => value.to_string(),
            Ok(None) => content.to_string(),
            Err(FormulaError::Circular(_)) => REF_DISPLAY.to_string(),
            Err(_) => ERROR_DISPLAY.to_string(),
        }
    }

    fn numeric_value(
        &self,
        at: CellRef,
        visiting: &RefCell<Vec<CellRef>>,
    ) -> Result<Option<i64>, FormulaError> {
        let content = self.cell(at).trim();
        if content.is_empty() {
            return Ok(Some(0));
        }
        if !content.starts_with('=') {
            return Ok(content.parse().ok());
        }
        if visiting.borrow().contains(&at) {
            return Err(FormulaError::Circular(at));
        }
        visiting.borrow_mut().push(at);
        let lookup = |cell: CellRef| self.numeric_value(cell, visiting);
        let result = evaluate(content, &lookup);
        visiting.borrow_mut().pop();
        result.map(Some)
    }
}

impl fmt::Display for Worksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.name)?;
        for (cell, content) in &self.cells {
            writeln!(f, "{cell}\t{content}")?;
        }
        Ok(())
    }
}

fn column_name(col: u32) -> String {
    CellRef::new(1, col).column_letters()
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CellRef::parse_a1(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid cell reference `{raw}`")))
    }
}
