//! Final command output and its human/JSON rendering.
//!
//! Outputs are collected by the dispatcher after every task finished and are
//! written to stdout once, after the live log has stopped drawing.

use crate::config::OutputFormat;
use crate::error::CommandError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Write};

/// One labelled field of a [`Details`] block.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub key: String,
    pub title: String,
    pub value: String,
}

/// Key/value view of one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details {
    pub title: String,
    pub rows: Vec<DetailRow>,
}

impl Details {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Append a field; `key` is the JSON name, `title` the human label.
    pub fn row(mut self, key: &str, title: &str, value: impl ToString) -> Self {
        self.rows.push(DetailRow {
            key: key.to_string(),
            title: title.to_string(),
            value: value.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub key: String,
    pub header: String,
}

/// Column-aligned listing of many resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from `(json key, header)` pairs.
    pub fn new(columns: &[(&str, &str)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(key, header)| TableColumn {
                    key: key.to_string(),
                    header: header.to_string(),
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Result value of one command action.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    None,
    Details(Details),
    Table(Table),
    /// Structured value shown only in machine-readable output.
    Marshaled(Value),
    Error {
        original: String,
        resolved: String,
        message: String,
    },
}

impl Output {
    /// Serialize `value` for JSON-only output.
    pub fn marshal<T: Serialize>(value: &T) -> Result<Self, CommandError> {
        serde_json::to_value(value)
            .map(Self::Marshaled)
            .map_err(|e| CommandError::Action(format!("cannot encode output: {e}")))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    fn to_json(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Details(details) => Some(Value::Object(
                details
                    .rows
                    .iter()
                    .map(|row| (row.key.clone(), Value::String(row.value.clone())))
                    .collect(),
            )),
            Self::Table(table) => Some(Value::Array(
                table
                    .rows
                    .iter()
                    .map(|row| {
                        let object: Map<String, Value> = table
                            .columns
                            .iter()
                            .zip(row)
                            .map(|(col, cell)| (col.key.clone(), Value::String(cell.clone())))
                            .collect();
                        Value::Object(object)
                    })
                    .collect(),
            )),
            Self::Marshaled(value) => Some(value.clone()),
            Self::Error {
                original,
                resolved,
                message,
            } => Some(serde_json::json!({
                "argument": original,
                "resolved": resolved,
                "error": message,
            })),
        }
    }
}

/// Write every output in the requested format.
pub fn render_outputs<W: Write + ?Sized>(
    outputs: &[Output],
    format: OutputFormat,
    out: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Human => render_human(outputs, out),
        OutputFormat::Json => render_json(outputs, out),
    }
}

fn render_json<W: Write + ?Sized>(outputs: &[Output], out: &mut W) -> io::Result<()> {
    let mut values: Vec<Value> = outputs.iter().filter_map(Output::to_json).collect();
    let value = match values.len() {
        0 => return Ok(()),
        1 => values.remove(0),
        _ => Value::Array(values),
    };
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)
}

// Errors and marshaled values are skipped here: failures were already shown
// on the live log, and marshaled values have no human form.
fn render_human<W: Write + ?Sized>(outputs: &[Output], out: &mut W) -> io::Result<()> {
    let mut first = true;
    for output in outputs {
        let block = match output {
            Output::Details(details) => human_details(details),
            Output::Table(table) => human_table(table),
            Output::None | Output::Marshaled(_) | Output::Error { .. } => continue,
        };
        if !first {
            writeln!(out)?;
        }
        first = false;
        for line in block {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn human_details(details: &Details) -> Vec<String> {
    let label_width = details
        .rows
        .iter()
        .map(|row| row.title.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = Vec::with_capacity(details.rows.len() + 1);
    if !details.title.is_empty() {
        lines.push(format!("  {}", details.title));
    }
    for row in &details.rows {
        let label = format!("{}:", row.title);
        lines.push(format!("    {label:<width$} {}", row.value, width = label_width + 1));
    }
    lines
}

fn human_table(table: &Table) -> Vec<String> {
    let mut widths: Vec<usize> = table
        .columns
        .iter()
        .map(|col| col.header.chars().count())
        .collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        format!(" {}", line.trim_end())
    };

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(format_row(
        table.columns.iter().map(|col| col.header.as_str()).collect(),
    ));
    for row in &table.rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(outputs: &[Output], format: OutputFormat) -> String {
        let mut buf = Vec::new();
        render_outputs(outputs, format, &mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    fn servers() -> Table {
        let mut table = Table::new(&[("uuid", "UUID"), ("title", "Title")]);
        table.push_row(vec!["0001".into(), "web".into()]);
        table.push_row(vec!["0002".into(), "database".into()]);
        table
    }

    #[test]
    fn human_table_aligns_columns() {
        let text = render(&[Output::Table(servers())], OutputFormat::Human);
        assert_eq!(text, " UUID  Title\n 0001  web\n 0002  database\n");
    }

    #[test]
    fn human_details_align_labels() {
        let details = Details::new("Server")
            .row("uuid", "UUID", "0001")
            .row("hostname", "Hostname", "web.example.com");
        let text = render(&[Output::Details(details)], OutputFormat::Human);
        assert_eq!(
            text,
            "  Server\n    UUID:     0001\n    Hostname: web.example.com\n"
        );
    }

    #[test]
    fn human_skips_errors_and_marshaled_values() {
        let outputs = vec![
            Output::Marshaled(serde_json::json!({"uuid": "1"})),
            Output::Error {
                original: "x".into(),
                resolved: String::new(),
                message: "nope".into(),
            },
        ];
        assert_eq!(render(&outputs, OutputFormat::Human), "");
    }

    #[test]
    fn json_keeps_argument_context_for_errors() {
        let outputs = vec![
            Output::Table(servers()),
            Output::None,
            Output::Error {
                original: "web*".into(),
                resolved: String::new(),
                message: "ambiguous".into(),
            },
        ];
        let value: Value =
            serde_json::from_str(&render(&outputs, OutputFormat::Json)).expect("json");
        assert_eq!(value[0][1]["title"], "database");
        assert_eq!(value[1]["argument"], "web*");
        assert_eq!(value[1]["error"], "ambiguous");
    }

    #[test]
    fn json_single_output_is_not_wrapped() {
        let text = render(
            &[Output::Marshaled(serde_json::json!({"state": "started"}))],
            OutputFormat::Json,
        );
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["state"], "started");
    }
}
