//! Release command

use super::lock::report_affected;
use crate::audit::AuditLog;
use crate::cli::args::ReleaseArgs;
use crate::config::Config;
use crate::control::{ControlAction, ControlClient};
use crate::error::BoardResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the release command
pub async fn execute(args: ReleaseArgs, config: &Config) -> BoardResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let client = ControlClient::new(&config.control)?;
    let audit = AuditLog::new(config);

    let (owner, reserved) = args.targets();
    let actions: Vec<ControlAction> = [
        (owner, ControlAction::ReleaseOwner),
        (reserved, ControlAction::ReleaseReserved),
    ]
    .into_iter()
    .filter_map(|(wanted, action)| wanted.then_some(action))
    .collect();

    let what = match (owner, reserved) {
        (true, true) => "ownership and reservation",
        (true, false) => "ownership",
        _ => "reservation",
    };
    if !ui::confirm(&ctx, &format!("Release {} of {}?", what, args.name), false).await? {
        ui::step_warn_hint(&ctx, "Release cancelled", "Pass --yes to skip the prompt");
        return Ok(());
    }

    for action in actions {
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("{} {}...", action, args.name));

        let result = client.send(action, &args.name).await;
        audit.control_call(action, &args.name, result.as_ref()).await;

        match result {
            Ok(response) => {
                spinner.stop(&format!("{} {}: done", action, args.name));
                report_affected(&ctx, &response);
            }
            Err(e) => {
                spinner.stop_error(&format!("{} {} failed", action, args.name));
                return Err(e);
            }
        }
    }

    Ok(())
}
