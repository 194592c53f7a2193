//! Entry point wiring help detection, parsing, accumulation and the summary.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use kakeibo_domain::YearMonth;
use tracing::{debug, info};

use crate::{
    accumulate, is_help_request, locate_row, parse_command, render_summary, BatchPolicy, Clock,
    CoreError, LedgerStore, HELP_TEXT,
};

/// What a successfully handled message answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Help(&'static str),
    Summary(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Help(text) => text,
            Reply::Summary(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Help(text) => text.to_string(),
            Reply::Summary(text) => text,
        }
    }
}

/// Serialises read-modify-write cycles on the same month.
#[derive(Debug, Default)]
struct MonthLocks {
    locks: Mutex<HashMap<YearMonth, Arc<Mutex<()>>>>,
}

impl MonthLocks {
    fn for_month(&self, month: YearMonth) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(month).or_default())
    }
}

/// Handles one message at a time against a ledger store.
///
/// Messages for the same month are serialised inside one `Processor`; writers
/// in other processes sharing the same store are not coordinated.
pub struct Processor {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    policy: BatchPolicy,
    locks: MonthLocks,
}

impl Processor {
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: BatchPolicy::default(),
            locks: MonthLocks::default(),
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the whole pipeline for one raw message.
    ///
    /// Help requests return the usage text without touching the store. Any
    /// error aborts the message and nothing is summarised; under
    /// [`BatchPolicy::Eager`] lines applied before the failure are saved first.
    pub fn process(&self, text: &str) -> Result<Reply, CoreError> {
        if is_help_request(text) {
            debug!("help requested");
            return Ok(Reply::Help(HELP_TEXT));
        }

        let command = parse_command(text, self.clock.today())?;
        let month = command.month();

        let lock = self.locks.for_month(month);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut sheet = self
            .store
            .open_month(month)?
            .ok_or(CoreError::SheetNotFound(month))?;

        if !command.is_empty() {
            let row = locate_row(&sheet, command.date)?;
            let outcome = accumulate(&mut sheet, row, &command.lines, self.policy);
            if outcome.is_mutated() {
                self.store.save_month(month, &sheet)?;
                info!(%month, row, postings = outcome.postings.len(), "saved month");
            }
            outcome.into_result()?;
        }

        Ok(Reply::Summary(render_summary(&sheet, month)))
    }
}
