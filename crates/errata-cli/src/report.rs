// SPDX-License-Identifier: Apache-2.0

use errata_model::{ErrorRecord, CSV_COLUMNS};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportError(pub String);

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ReportError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Infers the format from an output filename. Anything but `.csv` /
    /// `.json` is an unsupported output format, which aborts the run.
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            other => Err(ReportError(format!(
                "`{}` is not a supported report type (expected csv or json)",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

/// `<label>-<UTC stamp>.<ext>`, used when no output name was given.
#[must_use]
pub fn default_filename(label: &str, format: ReportFormat, now: OffsetDateTime) -> String {
    let stamp = now
        .format(format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "00000000-000000".to_string());
    format!("{label}-{stamp}.{}", format.extension())
}

pub fn write_report(
    path: &Path,
    format: ReportFormat,
    records: &[ErrorRecord],
) -> Result<(), ReportError> {
    let payload = match format {
        ReportFormat::Csv => to_csv_string(records),
        ReportFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|e| ReportError(format!("report encode failed: {e}")))?,
    };
    fs::write(path, payload)
        .map_err(|e| ReportError(format!("could not write {}: {e}", path.display())))
}

/// CSV rendering with the fixed column order the report consumers expect.
#[must_use]
pub fn to_csv_string(records: &[ErrorRecord]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_COLUMNS.join(","));
    out.push('\n');
    for record in records {
        let cells = [
            record.path.clone().unwrap_or_default(),
            record.url.clone().unwrap_or_default(),
            record.error.clone().unwrap_or_default(),
            record.resolved.to_string(),
            record.id.clone().unwrap_or_default(),
            record.container_type.as_str().to_string(),
        ];
        let row: Vec<String> = cells.iter().map(|cell| csv_escape(cell)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
