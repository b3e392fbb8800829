//! Terminal output helpers: styled text for humans, structured JSON for machines.
//!
//! Uses:
//! - `console` for colors (respects NO_COLOR, auto-disables when piped)
//! - `comfy-table` for task and list tables

use std::sync::atomic::{AtomicBool, Ordering};

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use console::style;
use poqt_constant::theme;
use poqt_core::UrgencyBand;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

// ── Global format flag ─────────────────────────────────────────────

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        JSON_MODE.store(true, Ordering::Relaxed);
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ── JSON envelope ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    let msg = Msg {
        level,
        message,
        data,
    };
    let json = serde_json::to_string(&msg)
        .unwrap_or_else(|_| format!("{{\"level\":\"{level}\",\"message\":\"{message}\"}}"));
    println!("{json}");
}

// ── Public helpers ─────────────────────────────────────────────────

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        let (r, g, b) = theme::LIST_TITLE;
        println!("{}", style(text).bold().color256(rgb_to_ansi256(r, g, b)));
    }
}

/// Success line; in JSON mode `value` is attached as data.
pub fn success<T: Serialize>(text: &str, value: &T) {
    if is_json() {
        let data = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        emit_json("success", text, Some(&data));
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        let msg = Msg {
            level: "error",
            message: text,
            data: None,
        };
        let json = serde_json::to_string(&msg).unwrap_or_default();
        eprintln!("{json}");
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

pub fn warning(text: &str) {
    if is_json() {
        emit_json("warning", text, None);
    } else {
        println!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

/// Print a key-value pair with styled key.
pub fn kv(key: &str, value: &str) {
    if is_json() {
        let data = serde_json::json!({ key: value });
        emit_json("info", key, Some(&data));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

/// Notification line for a fired reminder.
pub fn notify(title: &str, body: &str, data: &JsonValue) {
    if is_json() {
        emit_json("reminder", title, Some(data));
    } else {
        println!(
            "{} {} {}",
            style("⏰").yellow(),
            style(title).bold(),
            style(body).dim()
        );
    }
}

// ── Tables ─────────────────────────────────────────────────────────

pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn table_header(table: &mut Table, columns: &[&str]) {
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
}

/// Print a table, or in JSON mode the given items instead.
pub fn table_print<T: Serialize>(table: &Table, label: &str, items: &[T]) {
    if is_json() {
        let data = serde_json::json!({ "items": items });
        emit_json("list", label, Some(&data));
    } else {
        println!("{table}");
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Cell colored by urgency band; `colored = false` leaves it plain.
pub fn band_cell(text: &str, band: UrgencyBand, colored: bool) -> Cell {
    let cell = Cell::new(text);
    if !colored {
        return cell;
    }
    let (bg, fg) = match band {
        UrgencyBand::None => (theme::background::NONE, theme::text::NONE),
        UrgencyBand::Low => (theme::background::LOW, theme::text::LOW),
        UrgencyBand::Mid => (theme::background::MID, theme::text::MID),
        UrgencyBand::High => (theme::background::HIGH, theme::text::HIGH),
        UrgencyBand::Due => (theme::background::DUE, theme::text::DUE),
        UrgencyBand::Overdue => (theme::background::OVERDUE, theme::text::OVERDUE),
    };
    cell.bg(rgb(bg)).fg(rgb(fg))
}

/// Nearest xterm-256 color cube entry.
fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}
