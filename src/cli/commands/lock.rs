//! Lock command

use crate::audit::AuditLog;
use crate::cli::args::LockArgs;
use crate::config::Config;
use crate::control::{ControlAction, ControlClient, ControlResponse};
use crate::error::BoardResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the lock command
pub async fn execute(args: LockArgs, config: &Config) -> BoardResult<()> {
    let ctx = UiContext::detect();
    let client = ControlClient::new(&config.control)?;
    let audit = AuditLog::new(config);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Locking {}...", args.name));

    let result = client.lock(&args.name).await;
    audit
        .control_call(ControlAction::Lock, &args.name, result.as_ref())
        .await;

    match result {
        Ok(response) => {
            spinner.stop(&format!("Locked {}", args.name));
            if let Some(user) = &response.user {
                ui::key_value(&ctx, "User", user);
            }
            report_affected(&ctx, &response);
            Ok(())
        }
        Err(e) => {
            spinner.stop_error(&format!("Could not lock {}", args.name));
            Err(e)
        }
    }
}

/// List resources the server says changed, sub-resources included
pub(crate) fn report_affected(ctx: &UiContext, response: &ControlResponse) {
    if response.effected_resources.is_empty() {
        return;
    }
    ui::key_value(ctx, "Affected", &response.effected_resources.join(", "));
}
