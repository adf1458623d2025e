// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;

/// Runs `value` against a Draft 7 schema and returns every violation as a
/// human-readable message, sorted ascending so output is stable across
/// validator-internal iteration order. An empty list means valid; an empty
/// schema accepts anything. A schema that itself fails to compile yields a
/// single diagnostic instead of a panic.
#[must_use]
pub fn schema_errors(value: &Value, schema: &Value) -> Vec<String> {
    let validator = match jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .build(schema)
    {
        Ok(validator) => validator,
        Err(err) => return vec![format!("invalid schema: {err}")],
    };
    let mut messages: Vec<String> = validator
        .iter_errors(value)
        .map(|err| err.to_string())
        .collect();
    messages.sort();
    messages
}
