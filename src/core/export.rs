//! Export encoding - CSV and HTML table rendering with the canonical column sets.
//!
//! A selected row set serializes into one of three formats sharing the same
//! column semantics: plain CSV, an HTML table dressed as an Excel sheet, or an
//! HTML document dressed as a Word file. The encoder never fails on missing
//! data: absent dates and fields render as empty strings.

use crate::{
    entities::{ledger_entry, stock_entry},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::HashMap;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values, every field quoted, CRLF rows
    Csv,
    /// HTML table served as `application/vnd.ms-excel`
    Excel,
    /// HTML document served as `application/msword`
    Word,
}

impl ExportFormat {
    /// Parses the `format` query parameter; anything unrecognized falls back
    /// to CSV.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "excel" | "xls" => ExportFormat::Excel,
            "word" | "doc" => ExportFormat::Word,
            _ => ExportFormat::Csv,
        }
    }

    /// Content type declared on the response.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Excel => "application/vnd.ms-excel; charset=utf-8",
            ExportFormat::Word => "application/msword; charset=utf-8",
        }
    }

    /// File extension used in the download filename.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
            ExportFormat::Word => "doc",
        }
    }
}

/// Header of the ledger (income/expense) export.
pub const LEDGER_EXPORT_HEADER: [&str; 9] = [
    "Date",
    "Event",
    "Category",
    "Description",
    "Amount",
    "Currency",
    "Payment",
    "Counterparty",
    "ID",
];

/// Header of the stock export.
pub const STOCK_EXPORT_HEADER: [&str; 9] = [
    "Date",
    "Purchased by",
    "Payment",
    "Price (EUR/unit)",
    "Quantity",
    "Unit",
    "Total (EUR)",
    "Description",
    "ID",
];

/// Renders a date as `YYYY-MM-DD`; an absent date renders as an empty string.
#[must_use]
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Renders an amount the shortest way that round-trips (`40` not `40.00`,
/// `40.5` as-is), matching how list rows display raw amounts.
fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

/// Measurement unit of a stock purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUnit {
    /// Kilograms - quantities render with 3 decimals
    Kg,
    /// Discrete pieces - quantities render with 0 decimals
    Pcs,
}

impl StockUnit {
    /// Display label of the unit.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StockUnit::Kg => "kg",
            StockUnit::Pcs => "pcs",
        }
    }

    fn format_quantity(self, quantity: f64) -> String {
        match self {
            StockUnit::Kg => format!("{quantity:.3}"),
            StockUnit::Pcs => format!("{quantity:.0}"),
        }
    }
}

/// Case-insensitive search for an ASCII needle; safe on multi-byte input
/// since the needle starts and ends with ASCII bytes.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Extracts the unit marker from a stock description.
///
/// Returns the unit (kilograms when no marker is present) and the
/// description with the marker stripped for display.
#[must_use]
pub fn parse_unit_marker(description: Option<&str>) -> (StockUnit, String) {
    let text = description.unwrap_or_default();

    for (marker, unit) in [("[unit:pcs]", StockUnit::Pcs), ("[unit:kg]", StockUnit::Kg)] {
        if let Some(pos) = find_ascii_ci(text, marker) {
            let before = text[..pos].trim_end();
            let after = text[pos + marker.len()..].trim_start();
            let stripped = if before.is_empty() || after.is_empty() {
                format!("{before}{after}")
            } else {
                format!("{before} {after}")
            };
            return (unit, stripped.trim().to_string());
        }
    }
    (StockUnit::Kg, text.trim().to_string())
}

/// Builds the cell matrix of a ledger export, one row per entry in input
/// order. Event names come from the hydration map; an unresolvable event
/// renders as an empty cell rather than failing the export.
#[must_use]
pub fn ledger_export_cells(
    entries: &[ledger_entry::Model],
    event_names: &HashMap<i64, String>,
) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            vec![
                format_date(Some(entry.entry_date)),
                event_names.get(&entry.event_id).cloned().unwrap_or_default(),
                entry.category.clone().unwrap_or_default(),
                entry.description.clone().unwrap_or_default(),
                format_amount(entry.amount),
                entry.currency.clone(),
                entry.payment_method.clone().unwrap_or_default(),
                entry.counterparty.clone().unwrap_or_default(),
                entry.id.to_string(),
            ]
        })
        .collect()
}

/// Builds the cell matrix of a stock export, applying the unit-aware
/// precision rules: quantity 3 decimals for kg and 0 for pcs, price and
/// total always 2 decimals.
#[must_use]
pub fn stock_export_cells(entries: &[stock_entry::Model]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            let (unit, description) = parse_unit_marker(entry.description.as_deref());
            vec![
                format_date(Some(entry.purchase_date)),
                entry.purchased_by.clone(),
                entry.payment_method.clone(),
                format!("{:.2}", entry.price_per_kg),
                unit.format_quantity(entry.weight_kg),
                unit.as_str().to_string(),
                format!("{:.2}", entry.price_per_kg * entry.weight_kg),
                description,
                entry.id.to_string(),
            ]
        })
        .collect()
}

/// Encodes a header and cell matrix as CSV: every field quoted, embedded
/// quotes doubled, rows joined by CRLF, header first.
pub fn encode_csv(header: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|e| Error::Config {
            message: format!("CSV encoding failed: {e}"),
        })?;
    for row in rows {
        writer.write_record(row).map_err(|e| Error::Config {
            message: format!("CSV encoding failed: {e}"),
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Config {
        message: format!("CSV encoding failed: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::Config {
        message: format!("CSV encoding produced invalid UTF-8: {e}"),
    })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn html_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = String::from("<table border=\"1\">");
    table.push_str("<tr>");
    for cell in header {
        table.push_str(&format!("<th>{}</th>", escape_html(cell)));
    }
    table.push_str("</tr>");
    for row in rows {
        table.push_str("<tr>");
        for cell in row {
            table.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        table.push_str("</tr>");
    }
    table.push_str("</table>");
    table
}

/// Encodes a header and cell matrix as a minimal HTML document consumable by
/// Excel.
#[must_use]
pub fn encode_excel_html(title: &str, header: &[&str], rows: &[Vec<String>]) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape_html(title),
        html_table(header, rows)
    )
}

/// Encodes a header and cell matrix as a minimal HTML document consumable by
/// Word, with a report heading and an introductory line.
#[must_use]
pub fn encode_word_html(
    title: &str,
    heading: &str,
    intro: &str,
    header: &[&str],
    rows: &[Vec<String>],
) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body><h1>{}</h1><p>{}</p>{}</body></html>",
        escape_html(title),
        escape_html(heading),
        escape_html(intro),
        html_table(header, rows)
    )
}

/// Download filename for a date-filtered ledger export:
/// `{subject}-{start|'all'}-{end|'all'}.{ext}`.
#[must_use]
pub fn export_filename(subject: &str, start: &str, end: &str, format: ExportFormat) -> String {
    let start = if start.is_empty() { "all" } else { start };
    let end = if end.is_empty() { "all" } else { end };
    format!("{subject}-{start}-{end}.{}", format.extension())
}

/// Download filename for a stock export, whose only filter is a row id:
/// `stock-{id|'all'}.{ext}`.
#[must_use]
pub fn stock_export_filename(id: Option<i64>, format: ExportFormat) -> String {
    match id {
        Some(id) => format!("stock-{id}.{}", format.extension()),
        None => format!("stock-all.{}", format.extension()),
    }
}
