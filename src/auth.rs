use kakeibo_config::Config;
use tracing::warn;

use crate::errors::{AppError, Result};

/// Lets through only user ids on the configured allow-list.
pub fn authenticate(config: &Config, user_id: &str) -> Result<()> {
    if config.is_authorized(user_id) {
        return Ok(());
    }
    warn!(user_id, "rejected message from unknown user");
    Err(AppError::Unauthorized(user_id.to_string()))
}
