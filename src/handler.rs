//! Per-request flow: log, authenticate, process, reply.

use std::sync::Arc;

use kakeibo_config::{BatchMode, Config};
use kakeibo_core::{BatchPolicy, Clock, LedgerStore, Processor};
use kakeibo_storage_json::{JsonLedgerStorage, RequestLog, StoragePaths};
use tracing::{info, warn};

use crate::{
    auth::authenticate,
    errors::Result,
    event::{ReplyPayload, WebhookBody},
    system_clock::SystemClock,
};

/// Answers chat messages for the users allowed by the configuration.
pub struct MessageHandler {
    config: Config,
    processor: Processor,
    clock: Arc<dyn Clock>,
    request_log: Option<RequestLog>,
}

impl MessageHandler {
    pub fn new(
        config: Config,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        request_log: Option<RequestLog>,
    ) -> Self {
        let processor =
            Processor::new(store, Arc::clone(&clock)).with_policy(batch_policy(config.batch_mode));
        Self {
            config,
            processor,
            clock,
            request_log,
        }
    }

    /// Wires file storage under `ledger_root` and the system clock.
    pub fn from_config(config: Config, ledger_root: &std::path::Path) -> Result<Self> {
        let storage =
            JsonLedgerStorage::with_retention(StoragePaths::under(ledger_root), config.backup_retention)?;
        let request_log = config.request_log.then(|| storage.request_log());
        let clock = Arc::new(SystemClock::with_offset_hours(config.utc_offset_hours));
        Ok(Self::new(config, Arc::new(storage), clock, request_log))
    }

    /// Reply text for a message from `user_id`. Failures become the reply.
    pub fn handle_text(&self, user_id: &str, text: &str) -> String {
        self.record(Some(user_id), text);
        self.respond(user_id, text)
    }

    /// Handles a raw webhook body. Events without a text message or reply
    /// token need no reply and yield `None`.
    pub fn handle_webhook(&self, body: &str) -> Result<Option<ReplyPayload>> {
        let webhook: WebhookBody = serde_json::from_str(body)?;
        let Some(event) = webhook.events.first() else {
            self.record(None, body);
            return Ok(None);
        };
        self.record(event.user_id(), body);

        let (Some(text), Some(token)) = (event.text(), event.reply_token.as_deref()) else {
            info!(kind = %event.kind, "ignoring event without a text message");
            return Ok(None);
        };
        let user_id = event.user_id().unwrap_or_default();
        Ok(Some(ReplyPayload::text(token, self.respond(user_id, text))))
    }

    fn respond(&self, user_id: &str, text: &str) -> String {
        let outcome = authenticate(&self.config, user_id)
            .and_then(|()| self.processor.process(text).map_err(Into::into));
        match outcome {
            Ok(reply) => reply.into_text(),
            Err(err) => {
                warn!(user_id, error = %err, "message failed");
                err.to_string()
            }
        }
    }

    fn record(&self, user_id: Option<&str>, payload: &str) {
        let Some(log) = &self.request_log else {
            return;
        };
        if let Err(err) = log.append(self.clock.now(), user_id, payload) {
            warn!(error = %err, path = %log.path().display(), "failed to append request log");
        }
    }
}

pub fn batch_policy(mode: BatchMode) -> BatchPolicy {
    match mode {
        BatchMode::ValidateFirst => BatchPolicy::ValidateFirst,
        BatchMode::Eager => BatchPolicy::Eager,
    }
}
