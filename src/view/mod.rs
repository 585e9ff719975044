//! Card view model
//!
//! A card shows one record: a coloured title, some computed fields, then the
//! display-list fields of its type. What a card shows is described by a
//! [`CardSpec`] value; resource cards are data cards plus a `User` field, a
//! lock indicator and an availability-dependent title colour.

pub mod render;

pub use render::{render_board, render_card, render_json, render_plain};

use crate::cache::{EntityRecord, Link};
use crate::config::{CardKind, ViewConfig};
use crate::store::BoardState;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Field hidden on every card
pub const GROUP_FIELD: &str = "group";

/// RGB title colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Default title colour
    pub const AVAILABLE: Color = Color::rgb(0x96, 0xff, 0x77);
    /// Title colour of resources reporting `is_available: false`
    pub const UNAVAILABLE: Color = Color::rgb(0xff, 0x77, 0x77);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Nearest entry of the xterm 6x6x6 colour cube
    pub fn to_ansi256(self) -> u8 {
        let level = |c: u8| -> u8 {
            match c {
                0..=47 => 0,
                48..=114 => 1,
                _ => (c - 35) / 40,
            }
        };
        16 + 36 * level(self.r) + 6 * level(self.g) + level(self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A computed field shown ahead of the display-list fields
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub value: fn(&EntityRecord) -> String,
}

/// Owner first, then reservation holder, else empty
pub const USER_FIELD: FieldSpec = FieldSpec {
    label: "User",
    value: user_text,
};

fn user_text(record: &EntityRecord) -> String {
    record.user().unwrap_or_default().to_string()
}

fn default_title_color(_: &EntityRecord) -> Color {
    Color::AVAILABLE
}

fn availability_color(record: &EntityRecord) -> Color {
    if record.is_available() {
        Color::AVAILABLE
    } else {
        Color::UNAVAILABLE
    }
}

/// What a card shows and how its title is coloured
#[derive(Debug, Clone)]
pub struct CardSpec {
    field_filter: BTreeSet<String>,
    extra_fields: Vec<FieldSpec>,
    title_color: fn(&EntityRecord) -> Color,
    lockable: bool,
}

impl CardSpec {
    /// Plain data card
    pub fn data() -> Self {
        Self {
            field_filter: BTreeSet::from([GROUP_FIELD.to_string()]),
            extra_fields: Vec::new(),
            title_color: default_title_color,
            lockable: false,
        }
    }

    /// Lockable resource card
    pub fn resource() -> Self {
        let mut spec = Self::data();
        spec.extra_fields.push(USER_FIELD);
        spec.title_color = availability_color;
        spec.lockable = true;
        spec
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        let spec = match config.card {
            CardKind::Data => Self::data(),
            CardKind::Resource => Self::resource(),
        };
        spec.hide_fields(config.field_filter.iter().cloned())
    }

    /// Hide more display-list fields
    pub fn hide_fields(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.field_filter.extend(fields);
        self
    }

    pub fn is_hidden(&self, field: &str) -> bool {
        self.field_filter.contains(field)
    }

    pub fn is_lockable(&self) -> bool {
        self.lockable
    }

    pub fn title_color(&self, record: &EntityRecord) -> Color {
        (self.title_color)(record)
    }
}

/// Rendered-ready content of one record
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub title_color: Color,
    pub fields: Vec<(String, String)>,
    /// `Some` for lockable cards
    pub locked: Option<bool>,
}

impl Card {
    /// Build the card for `type_name[id]`, or `None` if the record is not
    /// cached.
    pub fn build(state: &BoardState, type_name: &str, id: &str, spec: &CardSpec) -> Option<Self> {
        let record = state.get_entity(type_name, id)?;

        let extra = spec
            .extra_fields
            .iter()
            .map(|field| (field.label.to_string(), (field.value)(record)));

        let listed = state
            .field_names(type_name)
            .iter()
            .filter(|name| !spec.is_hidden(name))
            .map(|name| (name.clone(), field_text(state, record, name)));

        Some(Self {
            id: id.to_string(),
            title: record.name().unwrap_or(id).to_string(),
            title_color: spec.title_color(record),
            fields: extra.chain(listed).collect(),
            locked: spec.lockable.then(|| record.is_locked()),
        })
    }
}

/// Links show the name of their target when it is cached
fn field_text(state: &BoardState, record: &EntityRecord, name: &str) -> String {
    let Some(value) = record.field(name) else {
        return String::new();
    };

    if Link::parse(value).is_some() {
        if let Some(target) = state.cache().follow_link(value).and_then(EntityRecord::name) {
            return target.to_string();
        }
    }
    record.display_value(name).unwrap_or_default()
}

/// Cards for every record of `type_name`, ordered by id
pub fn cards(state: &BoardState, type_name: &str, spec: &CardSpec) -> Vec<Card> {
    let Some(table) = state.cache().table(type_name) else {
        return Vec::new();
    };

    let mut ids: Vec<&String> = table.keys().collect();
    ids.sort_by(|a, b| compare_ids(a, b));

    ids.into_iter()
        .filter_map(|id| Card::build(state, type_name, id, spec))
        .collect()
}

/// Numeric ids in numeric order, ahead of non-numeric ones
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
