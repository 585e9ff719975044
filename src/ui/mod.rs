//! Terminal UI helpers
//!
//! Uses `cliclack` for prompts and spinners when attached to a terminal,
//! with plain line output in CI and when piped.
//!
//! ```rust,ignore
//! use rotest_board::ui::{self, TaskSpinner, UiContext};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Locking m1...");
//! spinner.stop("Locked m1");
//!
//! if ui::confirm(&ctx, "Release m1?", false).await? {
//!     // ...
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{key_value, remark, step_error_detail, step_ok, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
pub use prompts::confirm;
pub use theme::{init_theme, BoardTheme};
