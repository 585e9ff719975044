//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{CardKind, Config, ConfigManager};
use crate::error::{BoardError, BoardResult};
use crate::ui::{self, UiContext};

/// Keys accepted by `config set`
const KEYS: [&str; 14] = [
    "general.log_format",
    "general.audit_log",
    "feed.host",
    "feed.port",
    "feed.channel_capacity",
    "feed.reconnect.initial_delay_ms",
    "feed.reconnect.max_delay_ms",
    "feed.reconnect.multiplier",
    "feed.reconnect.max_attempts",
    "control.base_url",
    "control.timeout_secs",
    "view.type_name",
    "view.field_filter",
    "view.card",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> BoardResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> BoardResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> BoardResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> BoardResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply(&mut config, key, value) {
        ui::step_error_detail(&ctx, "Cannot set config value", &e.to_string());
        ui::remark(&ctx, "Valid keys:");
        for key in KEYS {
            ui::remark(&ctx, key);
        }
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Set one dot-separated key on `config`
pub(crate) fn apply(config: &mut Config, key: &str, value: &str) -> BoardResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => {
            config.general.log_format = match value {
                "text" | "json" => value.to_string(),
                _ => {
                    return Err(BoardError::User(format!(
                        "Invalid log format: {}. Use text/json",
                        value
                    )))
                }
            }
        }
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["feed", "host"] => config.feed.host = value.to_string(),
        ["feed", "port"] => config.feed.port = parse_number(value)?,
        ["feed", "channel_capacity"] => config.feed.channel_capacity = parse_number(value)?,
        ["feed", "reconnect", "initial_delay_ms"] => {
            config.feed.reconnect.initial_delay_ms = parse_number(value)?
        }
        ["feed", "reconnect", "max_delay_ms"] => {
            config.feed.reconnect.max_delay_ms = parse_number(value)?
        }
        ["feed", "reconnect", "multiplier"] => {
            config.feed.reconnect.multiplier = parse_number(value)?
        }
        ["feed", "reconnect", "max_attempts"] => {
            config.feed.reconnect.max_attempts = match value {
                "" | "none" | "unlimited" => None,
                _ => Some(parse_number(value)?),
            }
        }

        ["control", "base_url"] => config.control.base_url = value.to_string(),
        ["control", "timeout_secs"] => config.control.timeout_secs = parse_number(value)?,

        ["view", "type_name"] => config.view.type_name = value.to_string(),
        ["view", "field_filter"] => {
            config.view.field_filter = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        ["view", "card"] => {
            config.view.card = match value {
                "data" => CardKind::Data,
                "resource" => CardKind::Resource,
                _ => {
                    return Err(BoardError::User(format!(
                        "Invalid card kind: {}. Use data/resource",
                        value
                    )))
                }
            }
        }

        _ => return Err(BoardError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_bool(value: &str) -> BoardResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(BoardError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> BoardResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BoardError::User(format!("Invalid number: {}", value)))
}
