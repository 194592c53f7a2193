//! kakeibo-config
//!
//! Bot configuration model: who may post, where ledgers live, how batches
//! are applied. Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{BatchMode, Config};
