use chrono::NaiveDate;
use kakeibo_domain::{day_label, CellRef, DAY_LABEL_COLUMN, FIRST_DAY_ROW, LAST_DAY_ROW};
use tracing::debug;

use crate::{CoreError, Sheet};

/// Finds the day row whose label column shows `date` as `MM月DD日`.
///
/// Only the rows reserved for calendar days are scanned; a miss means the
/// grid is malformed or the date belongs to another month.
pub fn locate_row<S: Sheet + ?Sized>(sheet: &S, date: NaiveDate) -> Result<u32, CoreError> {
    let wanted = day_label(date);
    let row = (FIRST_DAY_ROW..=LAST_DAY_ROW)
        .find(|row| sheet.display_value(CellRef::new(*row, DAY_LABEL_COLUMN)) == wanted)
        .ok_or(CoreError::RowNotFound(date))?;
    debug!(%date, row, "located day row");
    Ok(row)
}

#[cfg(test)]
mod tests {
    use kakeibo_domain::{Worksheet, YearMonth};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn finds_first_and_last_day_rows() {
        let sheet = Worksheet::provisioned(YearMonth::new(2023, 1).unwrap(), 0);
        assert_eq!(locate_row(&sheet, date(2023, 1, 1)).unwrap(), 3);
        assert_eq!(locate_row(&sheet, date(2023, 1, 30)).unwrap(), 32);
        assert_eq!(locate_row(&sheet, date(2023, 1, 31)).unwrap(), 33);
    }

    #[test]
    fn missing_label_is_an_error() {
        let sheet = Worksheet::provisioned(YearMonth::new(2023, 2).unwrap(), 0);
        let err = locate_row(&sheet, date(2023, 3, 1)).unwrap_err();
        assert!(matches!(err, CoreError::RowNotFound(d) if d == date(2023, 3, 1)));

        let blank = Worksheet::new("202301");
        assert!(locate_row(&blank, date(2023, 1, 5)).is_err());
    }

    #[test]
    fn labels_outside_the_day_window_are_ignored() {
        let mut sheet = Worksheet::new("202301");
        sheet.set_cell(CellRef::new(40, DAY_LABEL_COLUMN), "01月05日".to_string());
        assert!(locate_row(&sheet, date(2023, 1, 5)).is_err());

        sheet.set_cell(CellRef::new(7, DAY_LABEL_COLUMN), "01月05日".to_string());
        assert_eq!(locate_row(&sheet, date(2023, 1, 5)).unwrap(), 7);
    }
}
