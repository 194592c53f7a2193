use kakeibo_domain::{grand_total_cell, monthly_total_cell, Category, YearMonth, REMAINING_CELL};

use crate::Sheet;

pub const SEPARATOR: &str = "--------------------";
const TOTAL_LABEL: &str = "合計   ";
const REMAINING_LABEL: &str = "今月の残金";

/// Renders the month report from the grid's own totals.
pub fn render_summary<S: Sheet + ?Sized>(sheet: &S, month: YearMonth) -> String {
    let mut lines = Vec::with_capacity(Category::COUNT + 5);
    lines.push(month.slash_label());
    lines.push(SEPARATOR.to_string());
    for category in Category::ALL {
        lines.push(format!(
            "{}: {}",
            category.summary_label(),
            sheet.display_value(monthly_total_cell(category))
        ));
    }
    lines.push(SEPARATOR.to_string());
    lines.push(format!(
        "{TOTAL_LABEL}: {}",
        sheet.display_value(grand_total_cell())
    ));
    lines.push(format!(
        "{REMAINING_LABEL}: {}",
        sheet.display_value(REMAINING_CELL)
    ));
    lines.join("\n")
}
