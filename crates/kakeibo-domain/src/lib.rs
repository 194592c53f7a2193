//! kakeibo-domain
//!
//! Pure domain models (categories, item lines, monthly worksheets, formulas).
//! No I/O, no CLI, no storage. Only data types and the rules that belong to them.

pub mod category;
pub mod command;
pub mod common;
pub mod formula;
pub mod grid;

pub use category::*;
pub use command::*;
pub use common::*;
pub use formula::{evaluate, FormulaError};
pub use grid::*;
