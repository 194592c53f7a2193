//! kakeibo-core
//!
//! Message parsing, validation, row location, accumulation and summaries.
//! Depends on kakeibo-domain. No CLI, no terminal I/O, no direct file access:
//! ledgers and time come in through the `LedgerStore` and `Clock` traits.

pub mod accumulator;
pub mod error;
pub mod help;
pub mod parser;
pub mod processor;
pub mod row_locator;
pub mod storage;
pub mod summary;
pub mod time;
pub mod validator;


pub use accumulator::*;
pub use error::CoreError;
pub use help::*;
pub use parser::*;
pub use processor::*;
pub use row_locator::*;
pub use storage::*;
pub use summary::*;
pub use time::*;
pub use validator::*;
