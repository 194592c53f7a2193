//! Splits a raw message into its target date and item lines.

use chrono::NaiveDate;
use kakeibo_domain::Command;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::CoreError;

static DATE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}/[0-9]{2}/[0-9]{2}$").expect("valid date header regex"));

const DATE_FORMAT: &str = "%Y/%m/%d";

/// Parses `text` into a [`Command`].
///
/// A first line of exactly `YYYY/MM/DD` sets the target date and is removed;
/// otherwise the command targets `today`. Blank lines are dropped. Item lines
/// are not validated here.
pub fn parse_command(text: &str, today: NaiveDate) -> Result<Command, CoreError> {
    let mut lines = text.lines().peekable();

    let header = lines
        .peek()
        .map(|line| line.trim())
        .filter(|line| DATE_HEADER.is_match(line))
        .map(str::to_string);

    let (date, explicit_date) = match header {
        Some(token) => {
            lines.next();
            let date = NaiveDate::parse_from_str(&token, DATE_FORMAT)
                .map_err(|_| CoreError::InvalidDate(token.clone()))?;
            (date, true)
        }
        None => (today, false),
    };

    let lines: Vec<String> = lines
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    debug!(%date, explicit_date, lines = lines.len(), "parsed command");
    Ok(Command {
        date,
        explicit_date,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn date_header_sets_target_and_is_removed() {
        let command = parse_command("2023/01/01\n食材費 4000\n日用品 1500", today()).unwrap();
        assert_eq!(command.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert!(command.explicit_date);
        assert_eq!(command.lines, vec!["食材費 4000", "日用品 1500"]);
    }

    #[test]
    fn missing_header_defaults_to_today() {
        let command = parse_command("食材費 4000", today()).unwrap();
        assert_eq!(command.date, today());
        assert!(!command.explicit_date);
        assert_eq!(command.lines, vec!["食材費 4000"]);
    }

    #[test]
    fn crlf_and_trailing_newlines_are_tolerated() {
        let command = parse_command("2023/01/02\r\n外食費 1200\r\n\r\n", today()).unwrap();
        assert_eq!(command.date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!(command.lines, vec!["外食費 1200"]);
    }

    #[test]
    fn header_must_match_strictly() {
        let command = parse_command("2023/1/1\n食材費 1", today()).unwrap();
        assert_eq!(command.date, today());
        assert_eq!(command.lines, vec!["2023/1/1", "食材費 1"]);

        let command = parse_command("on 2023/01/01\n食材費 1", today()).unwrap();
        assert_eq!(command.date, today());
        assert_eq!(command.lines.len(), 2);
    }

    #[test]
    fn impossible_calendar_dates_are_rejected() {
        let err = parse_command("2023/02/30\n食材費 1", today()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDate(ref token) if token == "2023/02/30"));
    }

    #[test]
    fn empty_message_has_no_lines() {
        let command = parse_command("", today()).unwrap();
        assert_eq!(command.date, today());
        assert!(command.is_empty());

        let command = parse_command("2023/03/04", today()).unwrap();
        assert!(command.explicit_date);
        assert!(command.is_empty());
    }
}
