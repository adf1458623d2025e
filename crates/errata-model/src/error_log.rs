// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reported for entries an operator marked as not revalidatable.
pub const SKIP_MESSAGE: &str = "Skipping revalidation";

/// Reported for revalidatable entries whose embedded schema is missing.
pub const MISSING_SCHEMA_MESSAGE: &str = "Error schema is missing, cannot re-validate.";

/// One record of an attached error log. Upstream writers evolve
/// independently, so unknown fields are tolerated and every field has a
/// decode default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorLogEntry {
    #[serde(default)]
    pub schema: Option<Value>,
    /// Dotted path into the origin file's metadata.
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub revalidate: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// What an entry asks of the evaluator. An entry is either reported verbatim
/// from its cached message or re-checked against its embedded schema; the
/// split is decided once here instead of probing optional fields downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind<'a> {
    CachedMessage {
        text: String,
        /// True when the cache fallback is forced by a missing schema on a
        /// revalidatable entry (a data-quality condition worth reporting).
        missing_schema: bool,
    },
    SchemaCheck {
        schema: &'a Value,
        item: Option<&'a str>,
    },
}

impl ErrorLogEntry {
    #[must_use]
    pub fn kind(&self) -> EntryKind<'_> {
        if !self.revalidate {
            return EntryKind::CachedMessage {
                text: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| SKIP_MESSAGE.to_string()),
                missing_schema: false,
            };
        }
        match self.schema.as_ref().filter(|s| !schema_is_empty(s)) {
            Some(schema) => EntryKind::SchemaCheck {
                schema,
                item: self.item.as_deref(),
            },
            None => EntryKind::CachedMessage {
                text: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| MISSING_SCHEMA_MESSAGE.to_string()),
                missing_schema: true,
            },
        }
    }
}

fn schema_is_empty(schema: &Value) -> bool {
    match schema {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_revalidatable_entry_is_cached_regardless_of_schema() {
        let entry: ErrorLogEntry = serde_json::from_value(json!({
            "schema": {"type": "string"},
            "item": "label",
            "revalidate": false,
            "error_message": "label was empty"
        }))
        .expect("decode entry");
        assert_eq!(
            entry.kind(),
            EntryKind::CachedMessage {
                text: "label was empty".to_string(),
                missing_schema: false,
            }
        );
    }

    #[test]
    fn non_revalidatable_entry_without_message_uses_skip_text() {
        let entry = ErrorLogEntry::default();
        assert_eq!(
            entry.kind(),
            EntryKind::CachedMessage {
                text: SKIP_MESSAGE.to_string(),
                missing_schema: false,
            }
        );
    }

    #[test]
    fn revalidatable_entry_with_empty_schema_is_flagged() {
        for schema in [json!(null), json!({})] {
            let entry = ErrorLogEntry {
                schema: Some(schema),
                revalidate: true,
                ..ErrorLogEntry::default()
            };
            assert_eq!(
                entry.kind(),
                EntryKind::CachedMessage {
                    text: MISSING_SCHEMA_MESSAGE.to_string(),
                    missing_schema: true,
                }
            );
        }
    }

    #[test]
    fn revalidatable_entry_with_schema_is_a_schema_check() {
        let entry: ErrorLogEntry = serde_json::from_value(json!({
            "schema": {"type": "string"},
            "item": "info.SeriesDescription",
            "revalidate": true
        }))
        .expect("decode entry");
        match entry.kind() {
            EntryKind::SchemaCheck { schema, item } => {
                assert_eq!(schema, &json!({"type": "string"}));
                assert_eq!(item, Some("info.SeriesDescription"));
            }
            other => panic!("expected schema check, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let entry: ErrorLogEntry = serde_json::from_value(json!({
            "revalidate": true,
            "schema": {"type": "number"},
            "code": "E102",
            "severity": "high"
        }))
        .expect("decode entry with extra fields");
        assert!(matches!(entry.kind(), EntryKind::SchemaCheck { .. }));
    }
}
