//! Report rendering shared by the commands

use clap::ValueEnum;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;
use std::io::{self, IsTerminal};

use crate::error::Result;

/// How a report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Pretty-printed JSON on stdout
    Json,
}

impl OutputFormat {
    /// Explicit choice, else table for a terminal and JSON for a pipe
    pub fn resolve(choice: Option<OutputFormat>) -> OutputFormat {
        choice.unwrap_or_else(|| {
            if io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Json
            }
        })
    }
}

/// Print a serializable report as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build a table with the workspace's usual style
pub fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

/// Render an optional value, `-` when absent
pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Render a year span such as `1995–2003` or `2017–`
pub fn years(start: Option<i32>, end: Option<i32>) -> String {
    match (start, end) {
        (None, None) => "-".to_string(),
        (start, end) => format!(
            "{}–{}",
            start.map(|y| y.to_string()).unwrap_or_default(),
            end.map(|y| y.to_string()).unwrap_or_default()
        ),
    }
}
