// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    ReadErrorLog,
    MissingSchema,
    ItemNotFound,
    DeletedErrorLog,
    RemovedErrorTag,
    DeleteSkipped,
    ResolvedWithoutLog,
    DuplicateSessionKey,
}

impl AuditEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadErrorLog => "read_error_log",
            Self::MissingSchema => "missing_schema",
            Self::ItemNotFound => "item_not_found",
            Self::DeletedErrorLog => "deleted_error_log",
            Self::RemovedErrorTag => "removed_error_tag",
            Self::DeleteSkipped => "delete_skipped",
            Self::ResolvedWithoutLog => "resolved_without_log",
            Self::DuplicateSessionKey => "duplicate_session_key",
        }
    }

    /// Whether a renderer should surface the event as a warning.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(
            self,
            Self::MissingSchema | Self::ItemNotFound | Self::DuplicateSessionKey
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub fields: BTreeMap<String, String>,
}

/// Diagnostics and side effects collected during a run. The core never logs
/// ambiently; the caller decides how to render (or assert on) these.
#[derive(Debug, Default, Clone)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: AuditEventKind, fields: BTreeMap<String, String>) {
        self.events.push(AuditEvent { kind, fields });
    }

    #[must_use]
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    #[must_use]
    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

#[must_use]
pub fn fields(pairs: &[(&str, String)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}
