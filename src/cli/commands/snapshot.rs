//! Snapshot command - print the board once and exit

use crate::cli::args::{OutputFormat, SnapshotArgs};
use crate::config::Config;
use crate::error::BoardResult;
use crate::session::Session;
use crate::ui::{TaskSpinner, UiContext};
use crate::view::{cards, render_board, render_json, render_plain, CardSpec};
use std::time::Duration;

/// Execute the snapshot command
pub async fn execute(args: SnapshotArgs, config: &Config) -> BoardResult<()> {
    let ctx = UiContext::detect();
    let spec = CardSpec::from_config(&config.view);
    let mut session = Session::start(config)?;

    let mut spinner = TaskSpinner::new(&ctx);
    if args.format == OutputFormat::Table {
        spinner.start(&format!("Waiting for {}...", config.feed.url()?));
    }

    let waited = session
        .wait_for_cache(Duration::from_secs(args.timeout_secs))
        .await;
    let closed = session.shutdown().await;

    let state = match waited {
        Ok(state) => {
            spinner.clear();
            state
        }
        Err(e) => {
            if args.format == OutputFormat::Table {
                spinner.stop_error("No snapshot received");
            }
            return Err(e);
        }
    };
    closed?;

    let type_name = args.r#type.as_deref().unwrap_or(&config.view.type_name);
    match args.format {
        OutputFormat::Table => print!("{}", render_board(&state, type_name, &spec, None)),
        OutputFormat::Json => println!("{}", render_json(&state, args.r#type.as_deref())?),
        OutputFormat::Plain => print!("{}", render_plain(&cards(&state, type_name, &spec))),
    }

    Ok(())
}
