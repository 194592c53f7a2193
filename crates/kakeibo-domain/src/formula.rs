//! Evaluator for the small formula language stored in worksheet cells.
//!
//! Supported: integer literals, unary and binary `+`/`-`, parentheses, A1 cell
//! references and `SUM(A1:B2)`. That covers the running-sum expressions the
//! accumulator writes (`=4000+1500-200`) and the derived totals of a
//! provisioned month.

use std::{iter::Peekable, str::Chars};

use thiserror::Error;

use crate::common::CellRef;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("formula must start with `=`: {0}")]
    MissingEquals(String),
    #[error("unexpected `{found}` in formula {formula}")]
    Unexpected { formula: String, found: String },
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("cell {0} does not hold a number")]
    NotANumber(CellRef),
    #[error("circular reference through {0}")]
    Circular(CellRef),
    #[error("arithmetic overflow")]
    Overflow,
}

/// Resolves a referenced cell to its numeric value. `Ok(None)` marks text,
/// which `SUM` skips and a direct reference rejects.
pub type Lookup<'a> = dyn Fn(CellRef) -> Result<Option<i64>, FormulaError> + 'a;

/// Evaluates `formula` (including its leading `=`).
pub fn evaluate(formula: &str, lookup: &Lookup<'_>) -> Result<i64, FormulaError> {
    let body = formula
        .trim()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::MissingEquals(formula.to_string()))?;
    let mut parser = Parser {
        formula,
        chars: body.chars().peekable(),
        lookup,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    match parser.chars.next() {
        None => Ok(value),
        Some(ch) => Err(parser.unexpected(ch.to_string())),
    }
}

struct Parser<'f, 'l> {
    formula: &'f str,
    chars: Peekable<Chars<'f>>,
    lookup: &'l Lookup<'l>,
}

impl<'f, 'l> Parser<'f, 'l> {
    fn expr(&mut self) -> Result<i64, FormulaError> {
        let mut total = self.term()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    let rhs = self.term()?;
                    total = total.checked_add(rhs).ok_or(FormulaError::Overflow)?;
                }
                Some('-') => {
                    self.chars.next();
                    let rhs = self.term()?;
                    total = total.checked_sub(rhs).ok_or(FormulaError::Overflow)?;
                }
                _ => return Ok(total),
            }
        }
    }

    fn term(&mut self) -> Result<i64, FormulaError> {
        self.skip_ws();
        match self.chars.peek() {
            Some('-') => {
                self.chars.next();
                let value = self.term()?;
                value.checked_neg().ok_or(FormulaError::Overflow)
            }
            Some('+') => {
                self.chars.next();
                self.term()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<i64, FormulaError> {
        self.skip_ws();
        match self.chars.peek().copied() {
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                self.expect(')')?;
                Ok(value)
            }
            Some(ch) if ch.is_ascii_digit() => self.number(),
            Some(ch) if ch.is_ascii_alphabetic() => self.reference_or_call(),
            Some(ch) => Err(self.unexpected(ch.to_string())),
            None => Err(self.unexpected("end of input".to_string())),
        }
    }

    fn number(&mut self) -> Result<i64, FormulaError> {
        let digits = self.take_while(|c| c.is_ascii_digit());
        digits.parse().map_err(|_| FormulaError::Overflow)
    }

    fn reference_or_call(&mut self) -> Result<i64, FormulaError> {
        let word = self.take_while(|c| c.is_ascii_alphanumeric());
        self.skip_ws();
        if self.chars.peek() == Some(&'(') {
            self.chars.next();
            if !word.eq_ignore_ascii_case("SUM") {
                return Err(FormulaError::UnknownFunction(word));
            }
            let total = self.sum_args()?;
            self.expect(')')?;
            return Ok(total);
        }
        let cell = CellRef::parse_a1(&word).ok_or_else(|| self.unexpected(word.clone()))?;
        (self.lookup)(cell)?.ok_or(FormulaError::NotANumber(cell))
    }

    fn sum_args(&mut self) -> Result<i64, FormulaError> {
        let mut total: i64 = 0;
        loop {
            self.skip_ws();
            let start_word = self.take_while(|c| c.is_ascii_alphanumeric());
            let start =
                CellRef::parse_a1(&start_word).ok_or_else(|| self.unexpected(start_word.clone()))?;
            self.skip_ws();
            let end = if self.chars.peek() == Some(&':') {
                self.chars.next();
                self.skip_ws();
                let end_word = self.take_while(|c| c.is_ascii_alphanumeric());
                CellRef::parse_a1(&end_word).ok_or_else(|| self.unexpected(end_word.clone()))?
            } else {
                start
            };
            for row in start.row.min(end.row)..=start.row.max(end.row) {
                for col in start.col.min(end.col)..=start.col.max(end.col) {
                    if let Some(value) = (self.lookup)(CellRef::new(row, col))? {
                        total = total.checked_add(value).ok_or(FormulaError::Overflow)?;
                    }
                }
            }
            self.skip_ws();
            if self.chars.peek() == Some(&',') {
                self.chars.next();
                continue;
            }
            return Ok(total);
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), FormulaError> {
        self.skip_ws();
        match self.chars.next() {
            Some(ch) if ch == wanted => Ok(()),
            Some(ch) => Err(self.unexpected(ch.to_string())),
            None => Err(self.unexpected("end of input".to_string())),
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !keep(ch) {
                break;
            }
            out.push(ch);
            self.chars.next();
        }
        out
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(ch) if ch.is_whitespace()) {
            self.chars.next();
        }
    }

    fn unexpected(&self, found: String) -> FormulaError {
        FormulaError::Unexpected {
            formula: self.formula.to_string(),
            found,
        }
    }
}
