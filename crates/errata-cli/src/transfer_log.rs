// SPDX-License-Identifier: Apache-2.0

use crate::report::ReportError;
use errata_model::TransferRow;
use std::fs;
use std::path::Path;

/// Reads a transfer log into one map per data row, keyed by the header row.
/// Only CSV is supported; spreadsheets must be exported first.
pub fn read_transfer_log(path: &Path) -> Result<Vec<TransferRow>, ReportError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => {}
        other => {
            return Err(ReportError(format!(
                "`{}` is not a supported transfer log type; export the spreadsheet to csv",
                other.unwrap_or("<none>")
            )));
        }
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| ReportError(format!("could not read {}: {e}", path.display())))?;
    let mut rows = parse_csv(&raw).into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    Ok(rows
        .map(|cells| {
            header
                .iter()
                .zip(cells)
                .map(|(name, cell)| (name.clone(), cell))
                .collect()
        })
        .collect())
}

/// Minimal quote-aware CSV reader: quoted cells may hold commas, doubled
/// quotes, and line breaks. Blank lines are dropped.
pub(crate) fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                if row.iter().any(|cell| !cell.is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => cell.push(c),
        }
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        if row.iter().any(|cell| !cell.is_empty()) {
            rows.push(row);
        }
    }
    rows
}
