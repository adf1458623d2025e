// SPDX-License-Identifier: Apache-2.0

use crate::evaluate::evaluate_entry;
use crate::events::{fields, AuditEventKind, AuditLog};
use crate::{AuditError, AuditErrorCode};
use errata_model::{
    origin_file_name, Container, ContainerRef, ErrorLogEntry, ErrorRecord, ERROR_TAG,
};
use errata_platform::{Platform, PlatformError};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Delete the error-log file and the error tag once every record it
    /// produced resolved.
    pub delete_resolved: bool,
    /// Remove the error tag from containers with no error log at all.
    pub remove_stale_tags: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            delete_resolved: false,
            remove_stale_tags: true,
        }
    }
}

/// Folds one error log into the container's record list. Entries that
/// produce no messages yield a resolved record; every distinct message
/// yields one unresolved record. Messages repeated across entries are
/// reported once, first occurrence wins.
pub fn resolve_container_errors(
    error_log: &[ErrorLogEntry],
    origin: Option<&Value>,
    origin_name: &str,
    template: &ContainerRef,
    log: &mut AuditLog,
) -> Vec<ErrorRecord> {
    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    for entry in error_log {
        let messages = evaluate_entry(entry, origin, origin_name, log);
        if messages.is_empty() {
            records.push(ErrorRecord::resolved(template));
        } else {
            for message in messages {
                if seen.insert(message.clone()) {
                    records.push(ErrorRecord::unresolved(template, message));
                }
            }
        }
    }
    records
}

/// Audits every flagged container: reads each attached error log, re-checks
/// it against the origin file's metadata, and (when requested) deletes fully
/// resolved logs and their error tag. A flagged container with no error log
/// is treated as already fixed. Deletions happen only after the full record
/// set for a file is known, never incrementally.
pub fn collect_errors(
    platform: &dyn Platform,
    containers: &[ContainerRef],
    options: &CollectOptions,
    log: &mut AuditLog,
) -> Result<Vec<ErrorRecord>, AuditError> {
    let mut records = Vec::new();
    for reference in containers {
        let container = platform.get_container(&reference.id)?;
        let log_names = container.error_log_names();
        if log_names.is_empty() {
            if options.remove_stale_tags {
                delete_tag_best_effort(platform, &container, log)?;
            }
            log.emit(
                AuditEventKind::ResolvedWithoutLog,
                fields(&[("container", container.id.clone())]),
            );
            records.push(ErrorRecord::resolved(reference));
            continue;
        }
        for log_name in log_names {
            log.emit(
                AuditEventKind::ReadErrorLog,
                fields(&[
                    ("container", container.id.clone()),
                    ("file", log_name.clone()),
                ]),
            );
            let bytes = platform.read_file(&container.id, &log_name)?;
            let entries: Vec<ErrorLogEntry> = serde_json::from_slice(&bytes).map_err(|e| {
                AuditError::new(
                    AuditErrorCode::DecodeLog,
                    format!("error log {log_name} on {}: {e}", container.id),
                )
            })?;
            let origin_name = origin_file_name(&log_name);
            let origin_value = origin_name
                .as_deref()
                .and_then(|name| container.file(name))
                .map(|entry| entry.to_value());
            let display_name = origin_name.as_deref().unwrap_or("NA");
            let file_records = resolve_container_errors(
                &entries,
                origin_value.as_ref(),
                display_name,
                reference,
                log,
            );
            let all_resolved = file_records.iter().all(|record| record.resolved);
            if all_resolved && options.delete_resolved {
                best_effort(
                    platform.delete_file(&container.id, &log_name),
                    AuditEventKind::DeletedErrorLog,
                    &container.id,
                    &log_name,
                    log,
                )?;
                delete_tag_best_effort(platform, &container, log)?;
            }
            records.extend(file_records);
        }
    }
    Ok(records)
}

fn delete_tag_best_effort(
    platform: &dyn Platform,
    container: &Container,
    log: &mut AuditLog,
) -> Result<(), AuditError> {
    best_effort(
        platform.delete_tag(&container.id, ERROR_TAG),
        AuditEventKind::RemovedErrorTag,
        &container.id,
        ERROR_TAG,
        log,
    )
}

/// Already-deleted targets are recorded and skipped; anything else aborts.
fn best_effort(
    result: Result<(), PlatformError>,
    done: AuditEventKind,
    container_id: &str,
    target: &str,
    log: &mut AuditLog,
) -> Result<(), AuditError> {
    match result {
        Ok(()) => {
            log.emit(
                done,
                fields(&[
                    ("container", container_id.to_string()),
                    ("target", target.to_string()),
                ]),
            );
            Ok(())
        }
        Err(err) if err.is_absence() => {
            log.emit(
                AuditEventKind::DeleteSkipped,
                fields(&[
                    ("container", container_id.to_string()),
                    ("target", target.to_string()),
                    ("reason", err.to_string()),
                ]),
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errata_model::ContainerType;
    use serde_json::json;

    fn template() -> ContainerRef {
        ContainerRef::new("a1", ContainerType::Acquisition)
    }

    fn entries(value: serde_json::Value) -> Vec<ErrorLogEntry> {
        serde_json::from_value(value).expect("entries")
    }

    #[test]
    fn identical_messages_across_entries_collapse_to_one_record() {
        let log_entries = entries(json!([
            {"revalidate": true, "schema": {"type": "string"}, "item": "label"},
            {"revalidate": true, "schema": {"type": "string"}, "item": "label"}
        ]));
        let origin = json!({"label": 1});
        let mut log = AuditLog::new();
        let records =
            resolve_container_errors(&log_entries, Some(&origin), "scan", &template(), &mut log);
        assert_eq!(records.len(), 1);
        assert!(!records[0].resolved);
    }

    #[test]
    fn each_resolving_entry_contributes_a_resolved_record() {
        let log_entries = entries(json!([
            {"revalidate": true, "schema": {"type": "string"}, "item": "label"},
            {"revalidate": true, "schema": {"type": "number"}, "item": "size"}
        ]));
        let origin = json!({"label": "X", "size": 3});
        let mut log = AuditLog::new();
        let records =
            resolve_container_errors(&log_entries, Some(&origin), "scan", &template(), &mut log);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.resolved));
    }

    #[test]
    fn mixed_outcomes_keep_first_occurrence_order() {
        let log_entries = entries(json!([
            {"revalidate": false, "error_message": "operator hold"},
            {"revalidate": true, "schema": {"type": "string"}, "item": "label"},
            {"revalidate": false, "error_message": "operator hold"}
        ]));
        let origin = json!({"label": "fine"});
        let mut log = AuditLog::new();
        let records =
            resolve_container_errors(&log_entries, Some(&origin), "scan", &template(), &mut log);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].error.as_deref(), Some("operator hold"));
        assert!(records[1].resolved);
    }
}
