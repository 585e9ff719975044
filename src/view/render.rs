//! Terminal rendering of cards

use super::{cards, Card, CardSpec};
use crate::error::BoardResult;
use crate::feed::ConnectionStatus;
use crate::store::BoardState;
use console::{style, Style};
use serde_json::json;

/// One card as a block of lines
pub fn render_card(card: &Card) -> String {
    let title = Style::new()
        .color256(card.title_color.to_ansi256())
        .bold()
        .apply_to(&card.title);

    let id = style(format!("#{}", card.id)).dim();
    let mut out = match card.locked {
        Some(true) => format!("{} {} {}\n", title, id, style("[locked]").red()),
        Some(false) => format!("{} {} {}\n", title, id, style("[free]").green()),
        None => format!("{} {}\n", title, id),
    };

    let width = card.fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in &card.fields {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            style(name).dim(),
            value,
            width = width
        ));
    }
    out
}

/// Header plus every card of `type_name`
pub fn render_board(
    state: &BoardState,
    type_name: &str,
    spec: &CardSpec,
    status: Option<ConnectionStatus>,
) -> String {
    let cards = cards(state, type_name, spec);

    let mut out = format!(
        "{} {}",
        style(type_name).cyan().bold(),
        style(format!("({} record(s), revision {})", cards.len(), state.revision())).dim()
    );
    if let Some(status) = status {
        let status_style = match status {
            ConnectionStatus::Connected => Style::new().green(),
            ConnectionStatus::Connecting | ConnectionStatus::Reconnecting { .. } => {
                Style::new().yellow()
            }
            ConnectionStatus::Disconnected => Style::new().red(),
        };
        out.push_str(&format!("  {}", status_style.apply_to(status)));
    }
    out.push_str("\n\n");

    if cards.is_empty() {
        out.push_str(&format!("{}\n", style("No records").dim()));
    }
    for card in &cards {
        out.push_str(&render_card(card));
        out.push('\n');
    }
    out
}

/// Tab-separated lines: id, title, then `name=value` fields
pub fn render_plain(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            let mut line = format!("{}\t{}", card.id, card.title);
            if let Some(locked) = card.locked {
                line.push_str(if locked { "\tlocked" } else { "\tfree" });
            }
            for (name, value) in &card.fields {
                line.push_str(&format!("\t{}={}", name, value));
            }
            line.push('\n');
            line
        })
        .collect()
}

/// Raw state as JSON, either one type or the whole board
pub fn render_json(state: &BoardState, type_name: Option<&str>) -> BoardResult<String> {
    let value = match type_name {
        Some(type_name) => json!({
            "type": type_name,
            "fields": state.field_names(type_name),
            "records": state.cache().table(type_name),
        }),
        None => json!({
            "revision": state.revision(),
            "display_list": state.display_list(),
            "cache": state.cache(),
        }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::UpdatePayload;
    use crate::display::DisplayList;
    use crate::store::{reduce, Action};
    use crate::view::Color;

    fn state() -> BoardState {
        let state = reduce(
            &BoardState::new(),
            Action::DisplayListReplaced(DisplayList::new().with_type("TestClassData", &["ip"])),
        );
        reduce(
            &state,
            Action::ResourcesUpdated(
                UpdatePayload::from_value(
                    "initialize-cache",
                    json!({"TestClassData": {
                        "2": {"name": "m2", "owner": "alice", "ip": "10.0.0.2"},
                        "1": {"name": "m1", "ip": "10.0.0.1"}
                    }}),
                )
                .unwrap(),
            ),
        )
    }

    #[test]
    fn card_lists_fields_in_order() {
        let card = Card {
            id: "7".to_string(),
            title: "m7".to_string(),
            title_color: Color::AVAILABLE,
            fields: vec![
                ("User".to_string(), "bob".to_string()),
                ("ip".to_string(), "10.0.0.7".to_string()),
            ],
            locked: Some(true),
        };

        let text = console::strip_ansi_codes(&render_card(&card)).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "m7 #7 [locked]");
        assert_eq!(lines[1].trim_end(), "  User  bob");
        assert_eq!(lines[2].trim_end(), "  ip    10.0.0.7");
    }

    #[test]
    fn board_shows_header_and_cards() {
        let text = render_board(
            &state(),
            "TestClassData",
            &CardSpec::resource(),
            Some(ConnectionStatus::Connected),
        );
        let text = console::strip_ansi_codes(&text).to_string();

        assert!(text.starts_with("TestClassData (2 record(s), revision 2)  connected"));
        assert!(text.find("m1 #1").unwrap() < text.find("m2 #2").unwrap());
    }

    #[test]
    fn empty_board_says_so() {
        let text = render_board(&BoardState::new(), "TestClassData", &CardSpec::data(), None);
        assert!(console::strip_ansi_codes(&text).contains("No records"));
    }

    #[test]
    fn plain_output_is_tab_separated() {
        let state = state();
        let text = render_plain(&cards(&state, "TestClassData", &CardSpec::resource()));
        assert_eq!(
            text,
            "1\tm1\tfree\tUser=\tip=10.0.0.1\n2\tm2\tlocked\tUser=alice\tip=10.0.0.2\n"
        );
    }

    #[test]
    fn json_output_for_one_type() {
        let text = render_json(&state(), Some("TestClassData")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["fields"], json!(["ip"]));
        assert_eq!(value["records"]["2"]["owner"], "alice");

        let whole: serde_json::Value =
            serde_json::from_str(&render_json(&state(), None).unwrap()).unwrap();
        assert_eq!(whole["revision"], 2);
        assert_eq!(whole["cache"]["TestClassData"]["1"]["name"], "m1");
    }
}
