//! Watch command - live dashboard

use crate::cli::args::WatchArgs;
use crate::config::Config;
use crate::error::{BoardError, BoardResult};
use crate::feed::ConnectionStatus;
use crate::session::Session;
use crate::store::BoardState;
use crate::ui::UiContext;
use crate::view::{render_board, CardSpec};
use console::Term;
use tracing::{debug, info};

enum Event {
    Redraw,
    Interrupted,
    FeedStopped(BoardResult<()>),
    /// The feed client dropped its status sender on the way out
    StatusClosed,
}

/// Execute the watch command
pub async fn execute(args: WatchArgs, config: &Config) -> BoardResult<()> {
    let ctx = UiContext::detect();
    let spec = CardSpec::from_config(&config.view);
    let type_name = args
        .r#type
        .clone()
        .unwrap_or_else(|| config.view.type_name.clone());

    let mut session = Session::start(config)?;
    let mut states = session.store().subscribe();
    let mut status = session.status();
    let term = Term::stdout();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        let state = states.borrow_and_update().clone();
        let connection = *status.borrow_and_update();
        draw(&ctx, &term, &args, &type_name, &spec, &state, connection)?;

        let event = tokio::select! {
            _ = &mut ctrl_c => Event::Interrupted,
            changed = states.changed() => match changed {
                Ok(()) => Event::Redraw,
                Err(_) => Event::Interrupted,
            },
            changed = status.changed() => match changed {
                Ok(()) => Event::Redraw,
                Err(_) => Event::StatusClosed,
            },
            result = session.feed_stopped() => Event::FeedStopped(result),
        };

        match event {
            Event::Redraw => continue,
            Event::Interrupted => {
                info!("Interrupted, closing session");
                break Ok(());
            }
            Event::FeedStopped(result) => break result,
            Event::StatusClosed => break session.feed_stopped().await,
        }
    };

    let applied = session.shutdown().await?;
    debug!("Watched {} update(s)", applied);
    outcome
}

fn draw(
    ctx: &UiContext,
    term: &Term,
    args: &WatchArgs,
    type_name: &str,
    spec: &CardSpec,
    state: &BoardState,
    connection: ConnectionStatus,
) -> BoardResult<()> {
    let type_names: Vec<String> = if args.all_types {
        state.cache().type_names().map(str::to_string).collect()
    } else {
        vec![type_name.to_string()]
    };

    let mut screen = String::new();
    for (i, name) in type_names.iter().enumerate() {
        // Only the first header carries the connection indicator
        let shown = (i == 0).then_some(connection);
        screen.push_str(&render_board(state, name, spec, shown));
    }
    if type_names.is_empty() {
        screen.push_str(&format!("No records yet ({})\n", connection));
    }

    if ctx.use_fancy_output() {
        term.clear_screen()
            .map_err(|e| BoardError::io("clearing the terminal", e))?;
    }
    term.write_str(&screen)
        .map_err(|e| BoardError::io("writing to the terminal", e))
}
