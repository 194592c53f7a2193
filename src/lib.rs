#![doc(test(attr(deny(warnings))))]

//! Kakeibo turns short chat messages into postings on a shared monthly
//! household ledger and answers with the month's running totals.
//!
//! The parsing and accumulation rules live in `kakeibo-core`; this crate wires
//! them to configuration, file storage, user authentication and the chat
//! webhook format.

pub mod auth;
pub mod cli;
pub mod errors;
pub mod event;
pub mod handler;
pub mod system_clock;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kakeibo tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
