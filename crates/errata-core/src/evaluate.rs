// SPDX-License-Identifier: Apache-2.0

use crate::events::{fields, AuditEventKind, AuditLog};
use crate::lookup::resolve;
use crate::schema_check::schema_errors;
use errata_model::{EntryKind, ErrorLogEntry};
use serde_json::Value;

/// Decides the fate of one error-log entry against the origin file's
/// metadata. An empty result means the entry resolved; anything else is the
/// list of messages to report. Diagnostic conditions (missing schema, item
/// not found) land in the audit log, not on a global logger.
pub fn evaluate_entry(
    entry: &ErrorLogEntry,
    origin: Option<&Value>,
    origin_name: &str,
    log: &mut AuditLog,
) -> Vec<String> {
    match entry.kind() {
        EntryKind::CachedMessage {
            text,
            missing_schema,
        } => {
            if missing_schema {
                log.emit(
                    AuditEventKind::MissingSchema,
                    fields(&[("file", origin_name.to_string())]),
                );
            }
            vec![text]
        }
        EntryKind::SchemaCheck { schema, item } => {
            match origin.and_then(|root| resolve(item, root)) {
                Some(value) => schema_errors(value, schema),
                None => {
                    let item_label = item.unwrap_or("<unset>");
                    log.emit(
                        AuditEventKind::ItemNotFound,
                        fields(&[
                            ("item", item_label.to_string()),
                            ("file", origin_name.to_string()),
                        ]),
                    );
                    vec![format!(
                        "Could not find {item_label} on file: {origin_name}. \
                         Please confirm metadata are not missing."
                    )]
                }
            }
        }
    }
}
