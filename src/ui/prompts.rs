//! Confirmation prompt with non-interactive fallback

use super::context::UiContext;
use crate::error::{BoardError, BoardResult};

/// Ask for confirmation.
///
/// Returns `true` under `--yes`, and `default` when there is no terminal
/// to ask on.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> BoardResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    let answer = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(default).interact()
    })
    .await
    .map_err(|e| BoardError::User(format!("Prompt task failed: {}", e)))?;

    answer.map_err(|e| BoardError::User(format!("Prompt failed: {}", e)))
}
