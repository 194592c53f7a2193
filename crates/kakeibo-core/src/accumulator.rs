//! Posts validated item lines into a day row as running-sum formulas.
//!
//! Every contribution stays visible in the cell: posting `4000` then `-1500`
//! leaves `=4000-1500`, not `=2500`. A posting that would push a cell past
//! [`MAX_CELL_TOTAL`] is refused before anything is written.

use std::collections::HashMap;

use kakeibo_domain::{CellRef, ItemLine, MAX_CELL_TOTAL, ZERO_SENTINEL};
use tracing::{info, warn};

use crate::{validate_line, CoreError, Sheet};

/// How a message with several item lines reacts to an invalid line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Validate every line before writing anything. Any invalid line rejects
    /// the whole message and the grid is left untouched.
    #[default]
    ValidateFirst,
    /// Apply lines in order and stop at the first invalid one. Lines before it
    /// stay applied.
    Eager,
}

/// One cell write performed for an item line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub item: ItemLine,
    pub cell: CellRef,
    pub formula: String,
}

/// Result of running a batch: the writes that happened and, when the batch
/// stopped early or was rejected, why.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub postings: Vec<Posting>,
    pub error: Option<CoreError>,
}

impl BatchOutcome {
    pub fn is_mutated(&self) -> bool {
        !self.postings.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<Posting>, CoreError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.postings),
        }
    }
}

/// Running totals of the cells a batch posts to.
#[derive(Debug, Default)]
struct CellTotals {
    totals: HashMap<CellRef, i64>,
}

impl CellTotals {
    /// Records `item` against its cell in `row`, or refuses it when the cell
    /// total would leave the representable range.
    fn admit<S: Sheet + ?Sized>(
        &mut self,
        sheet: &S,
        row: u32,
        item: ItemLine,
    ) -> Result<(), CoreError> {
        let cell = CellRef::new(row, item.category.column());
        let out_of_range = || CoreError::TotalOutOfRange(item.category);
        let current = match self.totals.get(&cell) {
            Some(total) => *total,
            None => cell_total(sheet, cell).ok_or_else(out_of_range)?,
        };
        let next = current
            .checked_add(item.amount)
            .filter(|total| (-MAX_CELL_TOTAL..=MAX_CELL_TOTAL).contains(total))
            .ok_or_else(out_of_range)?;
        self.totals.insert(cell, next);
        Ok(())
    }
}

/// Current numeric value of a category cell; `None` when it does not evaluate.
fn cell_total<S: Sheet + ?Sized>(sheet: &S, cell: CellRef) -> Option<i64> {
    let shown = sheet.display_value(cell);
    if shown.is_empty() {
        return Some(0);
    }
    shown.parse().ok()
}

/// Validates one line and checks it against the totals seen so far.
fn admit_line<S: Sheet + ?Sized>(
    sheet: &S,
    row: u32,
    line: &str,
    totals: &mut CellTotals,
) -> Result<ItemLine, CoreError> {
    let item = validate_line(line)?;
    totals.admit(sheet, row, item)?;
    Ok(item)
}

/// Formula a cell holds after adding `amount` to its `current` content.
pub fn next_formula(current: &str, amount: i64) -> String {
    let current = current.trim();
    if current.is_empty() || current == ZERO_SENTINEL {
        format!("={amount}")
    } else if amount < 0 {
        format!("{current}{amount}")
    } else {
        format!("{current}+{amount}")
    }
}

/// Adds one validated item to its category cell in `row`.
pub fn post<S: Sheet + ?Sized>(sheet: &mut S, row: u32, item: ItemLine) -> Posting {
    let cell = CellRef::new(row, item.category.column());
    let formula = next_formula(&sheet.cell(cell), item.amount);
    sheet.set_cell(cell, formula.clone());
    info!(category = %item.category, amount = item.amount, %cell, %formula, "posted item");
    Posting {
        item,
        cell,
        formula,
    }
}

/// Validates and posts `lines` into `row`, in order, under `policy`.
pub fn accumulate<S: Sheet + ?Sized>(
    sheet: &mut S,
    row: u32,
    lines: &[String],
    policy: BatchPolicy,
) -> BatchOutcome {
    match policy {
        BatchPolicy::ValidateFirst => accumulate_validated(sheet, row, lines),
        BatchPolicy::Eager => accumulate_eager(sheet, row, lines),
    }
}

fn accumulate_validated<S: Sheet + ?Sized>(sheet: &mut S, row: u32, lines: &[String]) -> BatchOutcome {
    let mut items = Vec::with_capacity(lines.len());
    let mut errors = Vec::new();
    let mut totals = CellTotals::default();
    for line in lines {
        match admit_line(sheet, row, line, &mut totals) {
            Ok(item) => items.push(item),
            Err(err) => {
                warn!(%line, error = %err, "rejected item line");
                errors.push(err);
            }
        }
    }

    if !errors.is_empty() {
        let error = if errors.len() == 1 {
            errors.remove(0)
        } else {
            CoreError::Rejected(errors)
        };
        return BatchOutcome {
            postings: Vec::new(),
            error: Some(error),
        };
    }

    let postings = items.into_iter().map(|item| post(sheet, row, item)).collect();
    BatchOutcome {
        postings,
        error: None,
    }
}

fn accumulate_eager<S: Sheet + ?Sized>(sheet: &mut S, row: u32, lines: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let mut totals = CellTotals::default();
    for line in lines {
        match admit_line(sheet, row, line, &mut totals) {
            Ok(item) => outcome.postings.push(post(sheet, row, item)),
            Err(err) => {
                warn!(
                    %line,
                    error = %err,
                    applied = outcome.postings.len(),
                    "stopping batch at invalid line"
                );
                outcome.error = Some(err);
                break;
            }
        }
    }
    outcome
}
